use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{RenderError, WriteError};

/// A per-path failure that didn't stop the build.
#[derive(Debug, Clone)]
pub enum Failure {
    Render(RenderError),
    Write(WriteError),
}

impl Failure {
    pub fn path(&self) -> &Path {
        match self {
            Failure::Render(e) => &e.path,
            Failure::Write(e) => &e.path,
        }
    }
}

/// What a completed build did, and what it couldn't do.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub pages_rendered: usize,
    pub assets_copied: usize,
    pub drafts_skipped: usize,
    pub index_entries: usize,
    /// Every file written, in the order outputs were produced.
    pub written: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl BuildReport {
    /// `true` if every document was rendered and every output written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn render_failures(&self) -> impl Iterator<Item = &RenderError> {
        self.failures.iter().filter_map(|f| match f {
            Failure::Render(e) => Some(e),
            Failure::Write(_) => None,
        })
    }

    pub fn write_failures(&self) -> impl Iterator<Item = &WriteError> {
        self.failures.iter().filter_map(|f| match f {
            Failure::Write(e) => Some(e),
            Failure::Render(_) => None,
        })
    }
}

impl From<RenderError> for Failure {
    fn from(error: RenderError) -> Self {
        Failure::Render(error)
    }
}

impl From<WriteError> for Failure {
    fn from(error: WriteError) -> Self {
        Failure::Write(error)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (error, cause) = match self {
            Failure::Render(e) => (e as &dyn fmt::Display, &e.cause),
            Failure::Write(e) => (e as &dyn fmt::Display, &e.cause),
        };

        write!(f, "{error}: {}", cause.to_string().trim_end().replace('\n', "\n    "))
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pages rendered, {} assets copied", self.pages_rendered, self.assets_copied)?;
        if self.drafts_skipped > 0 {
            write!(f, ", {} drafts skipped", self.drafts_skipped)?;
        }

        write!(f, ", {} search index entries", self.index_entries)?;
        match self.failures.len() {
            0 => Ok(()),
            n => {
                writeln!(f, "\n{n} failure(s):")?;
                for (i, failure) in self.failures.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }

                    write!(f, "  - {failure}")?;
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_failures() {
        let mut report = BuildReport {
            pages_rendered: 2,
            assets_copied: 1,
            index_entries: 2,
            ..BuildReport::default()
        };

        assert!(report.is_success());
        assert_eq!(report.to_string(), "2 pages rendered, 1 assets copied, 2 search index entries");

        report.failures.push(RenderError { path: "b.md".into(), cause: error!("bad table") }.into());
        report.failures.push(WriteError { path: "out/c.html".into(), cause: error!("disk full") }.into());
        assert!(!report.is_success());
        assert_eq!(report.render_failures().count(), 1);
        assert_eq!(report.write_failures().next().unwrap().path, Path::new("out/c.html"));

        let summary = report.to_string();
        assert!(summary.contains("2 failure(s):"));
        assert!(summary.contains("  - failed to render b.md: bad table"));
        assert!(summary.contains("  - failed to write out/c.html: disk full"));
    }
}
