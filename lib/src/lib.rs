#![doc = svgbobdoc::transform!(
//! Builds a static HTML site from a tree of Markdown notes.
//!
//! # Overview
//!
//! quire walks a source directory, renders every Markdown document into a
//! shared layout, and mirrors the tree under a destination directory. Other
//! files are copied as they are. Alongside the pages it writes a JSON search
//! index of every page's title, path, and raw text.
//!
//! A build runs in two passes, because every page's navigation depends on
//! having seen the whole tree:
//!
//! ```svgbob
//!  +---------+   documents   +-------------+    SiteModel    +----------+
//!  | Scanner +-------------->| SiteBuilder +---------------->| Pipeline |
//!  +---------+               +------+------+                 +----+-----+
//!                                   |                             |
//!                                   | markdown        +-----------+---------+
//!                                   v                 |                     |
//!                            +-------------+     +----+-----+       +-------+------+
//!                            |  Markdown   |     |  Engine  |       | OutputWriter |
//!                            |  Renderer   |     | (layout) +------>|  pages,      |
//!                            +-------------+     +----------+       |  assets,     |
//!                                                                   |  index       |
//!                                                                   +--------------+
//! ```
//!
//! 1. **Pass 1.** The [`Scanner`] yields every file under the source root in
//!    a stable, depth-first order, pruning excluded names. The
//!    [`SiteBuilder`](site::SiteBuilder) folds them into a [`SiteModel`]:
//!    each Markdown document is rendered to an HTML fragment exactly once,
//!    titled, and indexed; everything else becomes an asset. Two sources
//!    claiming one output path abort the build.
//! 2. **Pass 2.** With the model frozen, every page is laid out by an
//!    [`Engine`] and written, and every asset copied, in parallel. Failures
//!    here are collected into the [`BuildReport`] rather than aborting.
//!
//! ```rust,no_run
//! use quire::{Config, Pipeline};
//!
//! # fn main() -> quire::error::Result<()> {
//! let config = Config::from_file("folio.toml")?;
//! let report = Pipeline::new(config)?.run()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod config;
pub mod scan;
pub mod markdown;
pub mod site;
pub mod templating;
pub mod output;
pub mod report;
pub mod pipeline;

pub use config::{Config, TemplateVariant, AssetLink, PathCase};
pub use scan::{Scanner, DocumentDescriptor};
pub use site::{SiteModel, Page, Asset, Section, IndexEntry};
pub use templating::{Engine, Layout, MiniJinjaEngine};
pub use output::OutputWriter;
pub use report::{BuildReport, Failure};
pub use pipeline::Pipeline;

pub use rayon;
