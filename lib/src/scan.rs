use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::fs;

use derive_more::Debug;
use jwalk::WalkDirGeneric;

use crate::error::{Chainable, Error, ScanError};
use crate::util::PathExt;

/// One file discovered under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDescriptor {
    pub source_path: PathBuf,
    /// Path relative to the source root, always `/`-separated.
    pub relative_path: String,
    /// The file's bytes, read for Markdown documents only. Assets are copied
    /// straight from `source_path` when the site is written.
    #[debug(ignore)]
    pub raw_content: Option<Vec<u8>>,
}

impl DocumentDescriptor {
    pub fn is_markdown(&self) -> bool {
        Path::new(&self.relative_path).is_markdown()
    }
}

/// Walks a source tree depth-first, in lexicographic order within each
/// directory, pruning excluded names before descending into them.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    excluded_names: Arc<BTreeSet<String>>,
    excluded_paths: Arc<Vec<PathBuf>>,
}

#[derive(Default, Debug, Clone)]
struct Pruned;

impl jwalk::ClientState for Pruned {
    type ReadDirState = ();
    type DirEntryState = ();
}

impl Scanner {
    pub fn new<P: AsRef<Path>>(root: P, excluded_names: &BTreeSet<String>) -> Self {
        let root = root.as_ref();
        Scanner {
            root: root.canonicalize().unwrap_or_else(|_| root.to_path_buf()),
            excluded_names: Arc::new(excluded_names.clone()),
            excluded_paths: Arc::new(vec![]),
        }
    }

    /// Also prunes `path` (typically the destination root) if it exists
    /// inside the source tree.
    pub fn exclude_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        if let Ok(path) = path.as_ref().canonicalize() {
            Arc::make_mut(&mut self.excluded_paths).push(path);
        }

        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A lazy sequence of every regular file under the root. The sequence
    /// yields an error for the first unreadable directory or file; callers
    /// abort on it.
    pub fn documents(&self) -> impl Iterator<Item = Result<DocumentDescriptor, ScanError>> + '_ {
        let names = self.excluded_names.clone();
        let paths = self.excluded_paths.clone();
        let walker = WalkDirGeneric::<Pruned>::new(&self.root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir(move |_, _, _, children| {
                children.retain(|child| match child {
                    Ok(entry) => {
                        let name = entry.file_name.to_string_lossy();
                        !names.contains(&*name)
                            && !paths.iter().any(|p| *p == entry.path())
                    }
                    Err(_) => true,
                });
            });

        walker.into_iter().filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(self.scan_error(e))),
            };

            if !entry.file_type.is_file() {
                return None;
            }

            Some(self.describe(entry.path()))
        })
    }

    /// The names of the root's immediate subdirectories, sorted, without
    /// pruned names or paths. Symlinks are not followed.
    pub fn sections(&self) -> Result<Vec<String>, ScanError> {
        let scan_error = |cause: Error| ScanError { path: self.root.clone(), cause };
        let entries = fs::read_dir(&self.root)
            .chain(error!("failed to read directory"))
            .map_err(scan_error)?;

        let mut sections = vec![];
        for entry in entries {
            let entry = entry.chain(error!("failed to read directory")).map_err(scan_error)?;
            let is_dir = entry.file_type()
                .chain(error!("failed to read directory"))
                .map_err(scan_error)?
                .is_dir();

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dir
                && !self.excluded_names.contains(&name)
                && !self.excluded_paths.iter().any(|p| *p == entry.path())
            {
                sections.push(name);
            }
        }

        sections.sort();
        Ok(sections)
    }

    fn describe(&self, source_path: PathBuf) -> Result<DocumentDescriptor, ScanError> {
        let relative_path = source_path.strip_prefix(&self.root)
            .map(|p| p.to_slash_string())
            .unwrap_or_else(|_| source_path.to_slash_string());

        let raw_content = match Path::new(&relative_path).is_markdown() {
            true => Some(fs::read(&source_path).chain(error!("failed to read document"))
                .map_err(|cause| ScanError { path: source_path.clone(), cause })?),
            false => None,
        };

        tracing::debug!(path = %relative_path, "discovered");
        Ok(DocumentDescriptor { source_path, relative_path, raw_content })
    }

    fn scan_error(&self, error: jwalk::Error) -> ScanError {
        let path = error.path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        ScanError {
            path,
            cause: Error::from(error).chain(error!("failed to read directory")),
        }
    }
}
