use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Chainable, Result, WriteError};

/// Mirrors site-relative paths under a destination root.
///
/// Every operation creates missing parent directories first and overwrites
/// whatever is already at the target. Failures are reported per target.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        OutputWriter { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The destination of the forward-slash `relative_path`.
    pub fn target(&self, relative_path: &str) -> PathBuf {
        relative_path.split('/').fold(self.root.clone(), |path, segment| path.join(segment))
    }

    pub fn write_page(&self, relative_path: &str, html: &str) -> Result<PathBuf, WriteError> {
        self.sink(relative_path, |file| Ok(file.write_all(html.as_bytes())?))
    }

    /// Copies `source` byte-for-byte. Permissions are carried over.
    pub fn copy_asset(&self, relative_path: &str, source: &Path) -> Result<PathBuf, WriteError> {
        let target = self.target(relative_path);
        Self::prepare(&target)
            .and_then(|_| fs::copy(source, &target).chain_with(|| error! {
                "failed to copy asset",
                "source path" => source.display(),
            }))
            .map_err(|cause| WriteError { path: target.clone(), cause })?;

        Ok(target)
    }

    /// Serializes `value` as pretty-printed JSON.
    pub fn write_json<T: Serialize>(&self, relative_path: &str, value: &T) -> Result<PathBuf, WriteError> {
        self.sink(relative_path, |file| {
            serde_json::to_writer_pretty(&mut *file, value)?;
            Ok(file.write_all(b"\n")?)
        })
    }

    fn sink<F>(&self, relative_path: &str, write: F) -> Result<PathBuf, WriteError>
        where F: FnOnce(&mut io::BufWriter<fs::File>) -> Result<()>
    {
        let target = self.target(relative_path);
        let result = Self::prepare(&target)
            .and_then(|_| fs::File::create(&target).chain(error!("failed to open/create file for writing")))
            .and_then(|file| {
                let mut file = io::BufWriter::new(file);
                write(&mut file)?;
                Ok(file.flush()?)
            });

        match result {
            Ok(()) => Ok(target),
            Err(cause) => Err(WriteError { path: target, cause }),
        }
    }

    fn prepare(target: &Path) -> Result<()> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };

        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "directory" => parent.display(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_create_directories_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path().join("out"));

        let path = writer.write_page("a/b/c.html", "first").unwrap();
        assert_eq!(path, dir.path().join("out").join("a").join("b").join("c.html"));
        writer.write_page("a/b/c.html", "second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }

    #[test]
    fn assets_are_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("img.png");
        let bytes = [0x89, b'P', b'N', b'G', 0, 0xff];
        fs::write(&source, bytes).unwrap();

        let writer = OutputWriter::new(dir.path().join("out"));
        let copied = writer.copy_asset("img/img.png", &source).unwrap();
        assert_eq!(fs::read(copied).unwrap(), bytes);

        let error = writer.copy_asset("gone.png", &dir.path().join("gone.png")).unwrap_err();
        assert_eq!(error.path, dir.path().join("out").join("gone.png"));
    }

    #[cfg(unix)]
    #[test]
    fn asset_permissions_are_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("run.sh");
        fs::write(&source, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o750)).unwrap();

        let copied = OutputWriter::new(dir.path().join("out")).copy_asset("run.sh", &source).unwrap();
        let mode = fs::metadata(copied).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn json_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());
        let path = writer.write_json("index.json", &vec![("a", 1)]).unwrap();

        let json = fs::read_to_string(path).unwrap();
        assert!(json.starts_with("[\n"));
        assert!(json.ends_with("]\n"));
    }

    #[test]
    fn blocked_directories_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sub"), "not a directory").unwrap();

        let writer = OutputWriter::new(dir.path());
        let error = writer.write_page("sub/b.html", "b").unwrap_err();
        assert_eq!(error.path, dir.path().join("sub").join("b.html"));
        assert!(error.cause.to_string().contains("failed to create output directory"));
        assert!(writer.write_page("a.html", "a").is_ok());
    }
}
