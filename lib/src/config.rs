use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde::de::IntoDeserializer;

use crate::error::{Chainable, Error, Result};
use crate::markdown::{Extension, Extensions};

/// The name of the configuration file discovered by default.
pub const CONFIG_FILE: &str = "folio.toml";

/// The default file name of the search index, written at the destination root.
pub const SEARCH_INDEX_FILE: &str = "search_index.json";

/// Static build configuration. Not mutated once a build starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    /// Exact file or directory names pruned from the scan.
    pub excluded_names: BTreeSet<String>,
    pub markdown_extensions: Extensions,
    pub template: TemplateVariant,
    /// Stylesheets and scripts referenced by every page. When unset, the
    /// template variant's defaults are used.
    pub asset_links: Option<Vec<AssetLink>>,
    pub site_name: String,
    pub language: String,
    pub path_case: PathCase,
    /// Stamp pages with the build time. Off by default so that rebuilds of an
    /// unchanged tree are byte-identical.
    pub build_timestamp: bool,
    /// File name of the search index at the destination root.
    pub search_index: String,
}

/// The fixed page layout used for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateVariant {
    /// A single centered column styled by github-markdown-css.
    Plain,
    /// A sticky, responsive navigation bar above the article.
    #[default]
    Navbar,
}

/// An external stylesheet or script, referenced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLink {
    Stylesheet(String),
    Script(String),
}

/// How destination paths are compared when detecting collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCase {
    /// `Note.html` and `note.html` collide, as they would on most desktop
    /// filesystems and many static hosts.
    #[default]
    Insensitive,
    Sensitive,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_root: PathBuf::from("."),
            destination_root: PathBuf::from("output"),
            excluded_names: [".git", ".github"].into_iter().map(String::from).collect(),
            markdown_extensions: [Extension::Extra, Extension::Toc, Extension::Tables]
                .into_iter()
                .collect(),
            template: TemplateVariant::default(),
            asset_links: None,
            site_name: "Notes".into(),
            language: "en".into(),
            path_case: PathCase::default(),
            build_timestamp: false,
            search_index: SEARCH_INDEX_FILE.into(),
        }
    }
}

impl Config {
    /// Parses TOML configuration. Missing keys take their defaults.
    pub fn from_toml_str(string: &str) -> Result<Self> {
        toml::from_str(string).chain(error!("invalid configuration"))
    }

    /// Reads configuration from `path`. Relative roots in the file are
    /// resolved against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read configuration file",
            "path" => path.display(),
        })?;

        let mut config = Self::from_toml_str(&string).chain_with(|| error! {
            "failed to load configuration file",
            "path" => path.display(),
        })?;

        if let Some(base) = path.parent() {
            config.source_root = base.join(&config.source_root);
            config.destination_root = base.join(&config.destination_root);
        }

        Ok(config)
    }

    /// Looks for [`CONFIG_FILE`] in each of `dirs`, in order, and loads the
    /// first one found. Falls back to the defaults.
    pub fn discover<'a, I>(dirs: I) -> Result<Self>
        where I: IntoIterator<Item = &'a Path>
    {
        for dir in dirs {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "using configuration file");
                return Self::from_file(candidate);
            }
        }

        Ok(Config::default())
    }

    /// The stylesheets and scripts every page references.
    pub fn asset_links(&self) -> Vec<AssetLink> {
        match &self.asset_links {
            Some(links) => links.clone(),
            None => self.template.default_asset_links(),
        }
    }

    /// Checks the parts of the configuration that can only be checked against
    /// the filesystem, or that serde can't express.
    pub fn validate(&self) -> Result<()> {
        if !self.source_root.is_dir() {
            return err! {
                "source root must be an existing directory",
                "source root" => self.source_root.display(),
            };
        }

        let source = self.source_root.canonicalize()?;
        if let Ok(destination) = self.destination_root.canonicalize() {
            if destination == source {
                return err! {
                    "destination root must differ from the source root",
                    "path" => source.display(),
                };
            }

            if source.starts_with(&destination) {
                return err! {
                    "destination root must not contain the source root",
                    "source root" => source.display(),
                    "destination root" => destination.display(),
                };
            }
        }

        let index = &self.search_index;
        if index.is_empty() || index.contains(['/', '\\']) || index == "." || index == ".." {
            return err! {
                "search index must be a plain file name",
                "search index" => index,
            };
        }

        Ok(())
    }
}

impl TemplateVariant {
    pub fn default_asset_links(self) -> Vec<AssetLink> {
        const GITHUB_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/\
            github-markdown-css/5.2.0/github-markdown.min.css";
        const PRISM: &str = "https://cdn.jsdelivr.net/npm/prismjs@1.29.0";

        match self {
            TemplateVariant::Plain => vec![AssetLink::Stylesheet(GITHUB_CSS.into())],
            TemplateVariant::Navbar => vec![
                AssetLink::Stylesheet(format!("{PRISM}/themes/prism.min.css")),
                AssetLink::Stylesheet(format!("{PRISM}/themes/prism-okaidia.min.css")),
                AssetLink::Stylesheet(format!("{PRISM}/plugins/line-numbers/prism-line-numbers.min.css")),
                AssetLink::Script("https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js".into()),
                AssetLink::Script(format!("{PRISM}/components/prism-core.min.js")),
                AssetLink::Script(format!("{PRISM}/plugins/autoloader/prism-autoloader.min.js")),
            ],
        }
    }

    /// The name of the variant's template.
    pub fn template_name(self) -> &'static str {
        match self {
            TemplateVariant::Plain => "plain.html",
            TemplateVariant::Navbar => "navbar.html",
        }
    }
}

impl FromStr for TemplateVariant {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let de: serde::de::value::StrDeserializer<'_, serde::de::value::Error>
            = name.into_deserializer();

        TemplateVariant::deserialize(de).map_err(|_| error! {
            "unknown template variant",
            "name" => name,
            "known variants" => "plain, navbar",
        })
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateVariant::Plain => f.write_str("plain"),
            TemplateVariant::Navbar => f.write_str("navbar"),
        }
    }
}

impl AssetLink {
    pub fn url(&self) -> &str {
        match self {
            AssetLink::Stylesheet(url) | AssetLink::Script(url) => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_notes_layout() {
        let config = Config::default();
        assert_eq!(config.destination_root, Path::new("output"));
        assert!(config.excluded_names.contains(".github"));
        assert!(config.markdown_extensions.contains(Extension::Toc));
        assert_eq!(config.template, TemplateVariant::Navbar);
        assert_eq!(config.asset_links().len(), 6);
        assert_eq!(config.search_index, "search_index.json");
    }

    #[test]
    fn parses_full_configuration() {
        let config = Config::from_toml_str(r#"
            source_root = "md"
            destination_root = "html"
            excluded_names = ["drafts"]
            markdown_extensions = ["fenced_code", "tables"]
            template = "plain"
            asset_links = [
                { stylesheet = "https://example.com/site.css?v=1&x=2" },
                { script = "/search.js" },
            ]
            site_name = "Jinbao"
            language = "zh-CN"
            path_case = "sensitive"
            build_timestamp = true
        "#).unwrap();

        assert_eq!(config.source_root, Path::new("md"));
        assert_eq!(config.excluded_names.len(), 1);
        assert!(config.markdown_extensions.contains(Extension::FencedCode));
        assert!(!config.markdown_extensions.contains(Extension::Toc));
        assert_eq!(config.template, TemplateVariant::Plain);
        assert_eq!(config.asset_links(), vec![
            AssetLink::Stylesheet("https://example.com/site.css?v=1&x=2".into()),
            AssetLink::Script("/search.js".into()),
        ]);
        assert_eq!(config.path_case, PathCase::Sensitive);
        assert!(config.build_timestamp);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(Config::from_toml_str("markdown_extensions = [\"mermaid\"]").is_err());
        assert!(Config::from_toml_str("template = \"fancy\"").is_err());
        assert!(Config::from_toml_str("sourceroot = \".\"").is_err());
        assert!("fancy".parse::<TemplateVariant>().is_err());
        assert_eq!("plain".parse::<TemplateVariant>().unwrap(), TemplateVariant::Plain);
    }

    #[test]
    fn roots_resolve_against_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "source_root = \"docs\"\n").unwrap();

        let config = Config::discover([Path::new("/nonexistent"), dir.path()]).unwrap();
        assert_eq!(config.source_root, dir.path().join("docs"));
        assert_eq!(config.destination_root, dir.path().join("output"));
    }

    #[test]
    fn validation_rejects_overlapping_roots() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            source_root: dir.path().to_path_buf(),
            destination_root: dir.path().to_path_buf(),
            ..Config::default()
        };

        assert!(config.validate().is_err());

        let config = Config { destination_root: dir.path().join("out"), ..config };
        assert!(config.validate().is_ok());

        let config = Config { search_index: "a/b.json".into(), ..config };
        assert!(config.validate().is_err());

        let config = Config { source_root: dir.path().join("missing"), ..Config::default() };
        assert!(config.validate().is_err());
    }
}
