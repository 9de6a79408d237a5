use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_more::Debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::PathCase;
use crate::error::{BuildError, Chainable, Fatal, RenderError, ScanError};
use crate::markdown::{Extensions, FrontMatter, MarkdownRenderer};
use crate::scan::DocumentDescriptor;
use crate::util::{self, PathExt};

/// The section a site-relative path belongs to: its first segment, if the
/// path has more than one.
pub fn section_of(relative_path: &str) -> Option<&str> {
    relative_path.split_once('/').map(|(section, _)| section)
}

/// One rendered Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub source_path: PathBuf,
    /// Destination path relative to the site root, `/`-separated.
    pub relative_html_path: String,
    /// Number of directories between the page and the site root.
    pub depth: usize,
    pub html_fragment: String,
    /// Source text with any front matter removed.
    #[debug(ignore)]
    pub raw_text: Arc<str>,
}

/// A non-Markdown file, copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source_path: PathBuf,
    pub relative_path: String,
}

/// A top-level source directory, exposed as a navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub title: String,
    /// The page the section's nav entry links to: its `index.html`, or else
    /// its first page. `None` if the section has no pages.
    pub landing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub title: String,
    pub path: String,
    pub content: Arc<str>,
}

/// Everything known about the site after the first pass. Read-only afterward.
#[derive(Debug, Clone, Default)]
pub struct SiteModel {
    pub pages: Vec<Page>,
    pub assets: Vec<Asset>,
    /// Sorted by name.
    pub sections: Vec<Section>,
    /// One entry per page, in page order.
    pub search_index: Vec<IndexEntry>,
    /// Documents whose front matter marked them as drafts.
    pub drafts: Vec<PathBuf>,
    #[debug(ignore)]
    by_path: FxHashMap<String, usize>,
}

/// The result of the first pass: the model plus the documents left out of it.
#[derive(Debug)]
pub struct Discovered {
    pub model: SiteModel,
    pub failures: Vec<RenderError>,
}

/// Folds scanned documents into a [`SiteModel`], rendering each Markdown
/// document exactly once.
pub struct SiteBuilder<'r> {
    renderer: &'r dyn MarkdownRenderer,
    extensions: &'r Extensions,
    path_case: PathCase,
    claims: FxHashMap<String, PathBuf>,
    sections: BTreeSet<String>,
    model: SiteModel,
    failures: Vec<RenderError>,
}

impl<'r> SiteBuilder<'r> {
    pub fn new(
        renderer: &'r dyn MarkdownRenderer,
        extensions: &'r Extensions,
        path_case: PathCase,
    ) -> Self {
        SiteBuilder {
            renderer,
            extensions,
            path_case,
            claims: FxHashMap::default(),
            sections: BTreeSet::new(),
            model: SiteModel::default(),
            failures: vec![],
        }
    }

    /// Reserves an output path that no document may resolve to.
    pub fn reserve(&mut self, relative_path: &str, owner: impl Into<PathBuf>) -> Result<(), BuildError> {
        self.claim(relative_path, owner.into())
    }

    fn claim(&mut self, relative_path: &str, source: PathBuf) -> Result<(), BuildError> {
        let key = match self.path_case {
            PathCase::Sensitive => relative_path.to_string(),
            PathCase::Insensitive => relative_path.to_lowercase(),
        };

        if let Some(first) = self.claims.get(&key) {
            return Err(BuildError::DuplicatePath {
                path: relative_path.to_string(),
                first: first.clone(),
                second: source,
            });
        }

        self.claims.insert(key, source);
        Ok(())
    }

    /// Records a top-level directory as a section, whether or not it holds
    /// any files.
    pub fn section(&mut self, name: &str) {
        if !self.sections.contains(name) {
            self.sections.insert(name.to_string());
        }
    }

    /// Adds one document. Render failures are recorded and the document is
    /// skipped; invariant violations abort.
    pub fn add(&mut self, doc: DocumentDescriptor) -> Result<(), BuildError> {
        if let Some(section) = section_of(&doc.relative_path) {
            self.section(section);
        }

        let Some(raw) = doc.raw_content.as_deref().filter(|_| doc.is_markdown()) else {
            self.claim(&doc.relative_path, doc.source_path.clone())?;
            self.model.assets.push(Asset {
                source_path: doc.source_path,
                relative_path: doc.relative_path,
            });

            return Ok(());
        };

        let relative_html_path = util::html_path(&doc.relative_path);
        self.claim(&relative_html_path, doc.source_path.clone())?;

        let (front_matter, body, fragment) = match self.render(raw) {
            Ok(rendered) => rendered,
            Err(cause) => {
                tracing::warn!(path = %doc.relative_path, "document skipped: {}", cause.message());
                self.failures.push(RenderError { path: doc.source_path, cause });
                return Ok(());
            }
        };

        if front_matter.draft {
            tracing::debug!(path = %doc.relative_path, "skipping draft");
            self.model.drafts.push(doc.source_path);
            return Ok(());
        }

        let title = match front_matter.title {
            Some(title) => title.trim().to_string(),
            None => util::titleize(&Path::new(&doc.relative_path).file_stem_lossy()),
        };

        if title.is_empty() || title.chars().any(char::is_control) {
            return Err(BuildError::InvalidTitle { path: doc.source_path, title });
        }

        let depth = relative_html_path.matches('/').count();
        let raw_text: Arc<str> = body.into();
        self.model.search_index.push(IndexEntry {
            title: title.clone(),
            path: relative_html_path.clone(),
            content: raw_text.clone(),
        });

        self.model.add_page(Page {
            title,
            source_path: doc.source_path,
            relative_html_path,
            depth,
            html_fragment: fragment,
            raw_text,
        });

        Ok(())
    }

    fn render(&self, raw: &[u8]) -> crate::error::Result<(FrontMatter, String, String)> {
        let text = std::str::from_utf8(raw).chain(error!("document is not valid UTF-8"))?;
        let (front_matter, body) = FrontMatter::split(text)?;
        let fragment = self.renderer.render(body, self.extensions)
            .chain(error!("markdown rendering failed"))?;

        Ok((front_matter, body.to_string(), fragment))
    }

    /// Completes the model. Sections are the recorded top-level directories
    /// plus those that held at least one scanned file.
    pub fn finish(mut self) -> Discovered {
        let sections = self.sections.iter()
            .map(|name| Section {
                name: name.clone(),
                title: util::titleize(name),
                landing: self.model.landing_page(name),
            })
            .collect();

        self.model.sections = sections;
        Discovered { model: self.model, failures: self.failures }
    }
}

impl SiteModel {
    /// Runs the first pass over `documents`. `sections` names top-level
    /// directories to expose even if they hold no files. The first scan error
    /// or invariant violation aborts; render failures are collected.
    pub fn build<I>(
        documents: I,
        sections: &[String],
        renderer: &dyn MarkdownRenderer,
        extensions: &Extensions,
        path_case: PathCase,
        reserved: &[&str],
    ) -> Result<Discovered, Fatal>
        where I: IntoIterator<Item = Result<DocumentDescriptor, ScanError>>
    {
        let mut builder = SiteBuilder::new(renderer, extensions, path_case);
        for path in reserved {
            builder.reserve(path, format!("<reserved: {path}>"))?;
        }

        for name in sections {
            builder.section(name);
        }

        for document in documents {
            builder.add(document?)?;
        }

        Ok(builder.finish())
    }

    /// Appends a page, keeping it reachable through [`SiteModel::page`].
    pub fn add_page(&mut self, page: Page) {
        self.by_path.insert(page.relative_html_path.clone(), self.pages.len());
        self.pages.push(page);
    }

    pub fn page(&self, relative_html_path: &str) -> Option<&Page> {
        self.by_path.get(relative_html_path).and_then(|&i| self.pages.get(i))
    }

    fn landing_page(&self, section: &str) -> Option<String> {
        let index = format!("{section}/index.html");
        if self.page(&index).is_some() {
            return Some(index);
        }

        self.pages.iter()
            .find(|page| section_of(&page.relative_html_path) == Some(section))
            .map(|page| page.relative_html_path.clone())
    }
}
