use std::path::PathBuf;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::Config;
use crate::error::{Fatal, RenderError, Result, WriteError};
use crate::markdown::{MarkdownRenderer, Pulldown};
use crate::output::OutputWriter;
use crate::report::{BuildReport, Failure};
use crate::scan::Scanner;
use crate::site::{Discovered, IndexEntry, SiteModel};
use crate::templating::{Engine, Layout, MiniJinjaEngine};
use crate::util::time;

/// The two-pass build: scan and model the whole site, then render and write
/// every output.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    renderer: Box<dyn MarkdownRenderer>,
    engine: Box<dyn Engine>,
}

impl Pipeline {
    /// Validates `config` and prepares the default renderer and layout. The
    /// build timestamp, if enabled, is taken now.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let generated_at = config.build_timestamp.then(chrono::Utc::now);
        let engine = MiniJinjaEngine::new(Layout::from_config(&config, generated_at))?;
        Ok(Pipeline {
            config,
            renderer: Box::new(Pulldown),
            engine: Box::new(engine),
        })
    }

    pub fn with_renderer<R: MarkdownRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_engine<E: Engine + 'static>(mut self, engine: E) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pass 1. Nothing is written.
    pub fn discover(&self) -> Result<Discovered, Fatal> {
        let config = &self.config;
        let scanner = Scanner::new(&config.source_root, &config.excluded_names)
            .exclude_path(&config.destination_root);

        let sections = scanner.sections()?;
        let discovered = time!("pass 1", SiteModel::build(
            scanner.documents(),
            &sections,
            &*self.renderer,
            &config.markdown_extensions,
            config.path_case,
            &[config.search_index.as_str()],
        ))?;

        tracing::info!(
            pages = discovered.model.pages.len(),
            assets = discovered.model.assets.len(),
            sections = discovered.model.sections.len(),
            failures = discovered.failures.len(),
            "site discovered",
        );

        Ok(discovered)
    }

    /// Runs both passes. A scan error or model invariant violation aborts
    /// before anything is written; every other failure is collected in the
    /// returned report.
    pub fn run(&self) -> Result<BuildReport, Fatal> {
        let Discovered { model, failures } = self.discover()?;
        let mut report = BuildReport {
            drafts_skipped: model.drafts.len(),
            failures: failures.into_iter().map(Failure::from).collect(),
            ..BuildReport::default()
        };

        let writer = OutputWriter::new(&self.config.destination_root);
        let (pages, assets) = time!("pass 2", self.write_site(&model, &writer));

        let mut unwritten = FxHashSet::default();
        for (page, result) in model.pages.iter().zip(pages) {
            match result {
                Ok(path) => {
                    report.pages_rendered += 1;
                    report.written.push(path);
                }
                Err(failure) => {
                    tracing::warn!(path = %page.relative_html_path, "{failure}");
                    unwritten.insert(page.relative_html_path.as_str());
                    report.failures.push(failure);
                }
            }
        }

        for result in assets {
            match result {
                Ok(path) => {
                    report.assets_copied += 1;
                    report.written.push(path);
                }
                Err(error) => {
                    tracing::warn!("{error}");
                    report.failures.push(error.into());
                }
            }
        }

        let index: Vec<&IndexEntry> = model.search_index.iter()
            .filter(|entry| !unwritten.contains(entry.path.as_str()))
            .collect();

        match writer.write_json(&self.config.search_index, &index) {
            Ok(path) => {
                report.index_entries = index.len();
                report.written.push(path);
            }
            Err(error) => {
                tracing::warn!("{error}");
                report.failures.push(error.into());
            }
        }

        tracing::info!(
            pages = report.pages_rendered,
            assets = report.assets_copied,
            failures = report.failures.len(),
            "site written",
        );

        Ok(report)
    }

    /// Pass 2: pages and assets are written concurrently. Results come back in
    /// model order.
    fn write_site(
        &self,
        model: &SiteModel,
        writer: &OutputWriter,
    ) -> (Vec<Result<PathBuf, Failure>>, Vec<Result<PathBuf, WriteError>>) {
        rayon::join(
            || model.pages.par_iter()
                .map(|page| -> Result<PathBuf, Failure> {
                    let html = self.engine.render(page, model)
                        .map_err(|cause| RenderError { path: page.source_path.clone(), cause })?;

                    tracing::debug!(path = %page.relative_html_path, "writing page");
                    Ok(writer.write_page(&page.relative_html_path, &html)?)
                })
                .collect(),
            || model.assets.par_iter()
                .map(|asset| writer.copy_asset(&asset.relative_path, &asset.source_path))
                .collect(),
        )
    }
}
