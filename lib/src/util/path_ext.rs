use std::path::{Component, Path};

pub trait PathExt: AsRef<Path> {
    /// The path's normal components joined with `/`, regardless of the host
    /// separator. Non-UTF-8 components are converted lossily.
    fn to_slash_string(&self) -> String;

    /// `true` if the final extension is `md`, compared case-insensitively.
    fn is_markdown(&self) -> bool;

    /// The file name without its final extension.
    fn file_stem_lossy(&self) -> String;
}

impl PathExt for Path {
    fn to_slash_string(&self) -> String {
        let mut string = String::new();
        for component in self.components() {
            if let Component::Normal(segment) = component {
                if !string.is_empty() {
                    string.push('/');
                }

                string.push_str(&segment.to_string_lossy());
            }
        }

        string
    }

    fn is_markdown(&self) -> bool {
        self.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("md"))
    }

    fn file_stem_lossy(&self) -> String {
        self.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Replaces the final extension of a forward-slash relative path with `html`.
pub fn html_path(relative_path: &str) -> String {
    let (dir, name) = match relative_path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, relative_path),
    };

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };

    match dir {
        Some(dir) => format!("{dir}/{stem}.html"),
        None => format!("{stem}.html"),
    }
}
