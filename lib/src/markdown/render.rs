use either::Either;
use pulldown_cmark::{html, Parser, TextMergeStream};

use crate::error::Result;
use crate::markdown::{AutoHeading, Extension, Extensions, Plugin, TableOfContents};

/// Converts Markdown text to an HTML fragment.
///
/// Implementations are pure: the same text and extensions always produce the
/// same fragment. The fragment is treated as trusted HTML by the layout.
pub trait MarkdownRenderer: Send + Sync + std::fmt::Debug {
    fn render(&self, text: &str, extensions: &Extensions) -> Result<String>;
}

/// The default renderer, backed by `pulldown-cmark`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pulldown;

impl MarkdownRenderer for Pulldown {
    fn render(&self, text: &str, extensions: &Extensions) -> Result<String> {
        let mut headings = AutoHeading::default();
        let mut toc = TableOfContents::default();

        let events = TextMergeStream::new(Parser::new_ext(text, extensions.options()));
        let events = match extensions.heading_ids() {
            true => Either::Left(headings.remap(events)),
            false => Either::Right(events),
        };

        let events = match extensions.contains(Extension::Toc) {
            true => Either::Left(toc.remap(events)),
            false => Either::Right(events),
        };

        let mut fragment = String::with_capacity(text.len() + text.len() / 2);
        html::push_html(&mut fragment, events);
        Ok(fragment)
    }
}

impl<R: MarkdownRenderer + ?Sized> MarkdownRenderer for &R {
    fn render(&self, text: &str, extensions: &Extensions) -> Result<String> {
        R::render(self, text, extensions)
    }
}
