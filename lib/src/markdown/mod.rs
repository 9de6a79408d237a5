mod plugin;
mod extension;
mod frontmatter;
mod auto_heading;
mod toc;
mod render;

pub use plugin::*;
pub use extension::*;
pub use frontmatter::*;
pub use auto_heading::*;
pub use toc::{TableOfContents, Entry as TocEntry, MARKER as TOC_MARKER};
pub use render::*;
