use serde::Deserialize;

use crate::error::{Chainable, Result};

const DELIMITER: &str = "+++";

/// Document-level settings from a leading `+++`-delimited TOML block.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Overrides the title derived from the file name.
    pub title: Option<String>,
    /// Drafts are left out of the site entirely.
    pub draft: bool,
}

impl FrontMatter {
    /// Splits `input` into its front matter and the remaining body. Input
    /// without a complete front matter block is returned untouched with
    /// default settings.
    pub fn split(input: &str) -> Result<(FrontMatter, &str)> {
        let mut lines = input.split_inclusive('\n');
        let start = match lines.next() {
            Some(first) if is_delimiter(first) => first.len(),
            _ => return Ok((FrontMatter::default(), input)),
        };

        let mut offset = start;
        for line in lines {
            if is_delimiter(line) {
                let toml = &input[start..offset];
                let body = &input[(offset + line.len())..];
                let front_matter = toml::from_str(toml)
                    .chain(error!("invalid front matter"))?;

                return Ok((front_matter, body));
            }

            offset += line.len();
        }

        Ok((FrontMatter::default(), input))
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_title_and_body() {
        let input = "+++\ntitle = \"Hello, World\"\n+++\n# Body\n";
        let (meta, body) = FrontMatter::split(input).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Hello, World"));
        assert!(!meta.draft);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn accepts_crlf_delimiters() {
        let input = "+++\r\ndraft = true\r\n+++\r\ntext";
        let (meta, body) = FrontMatter::split(input).unwrap();
        assert!(meta.draft);
        assert_eq!(body, "text");
    }

    #[test]
    fn leaves_plain_documents_alone() {
        for input in ["# Title\n+++\n", "+++ not a delimiter\n", "+++\nunterminated = 1\n", ""] {
            let (meta, body) = FrontMatter::split(input).unwrap();
            assert_eq!(meta, FrontMatter::default());
            assert_eq!(body, input);
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (meta, body) = FrontMatter::split("+++\nauthor = \"me\"\n+++\n").unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, "");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let error = FrontMatter::split("+++\ntitle = \n+++\nbody").unwrap_err();
        assert!(error.to_string().contains("invalid front matter"));
    }
}
