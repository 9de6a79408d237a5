use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};
use serde::de::IntoDeserializer;

use crate::error::{Error, Result};

/// A named Markdown extension, using python-markdown's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// `tables`, `footnotes`, `attr_list`, `def_list`, and `fenced_code`.
    Extra,
    /// Always on in CommonMark; accepted for compatibility.
    FencedCode,
    Tables,
    /// Heading ids plus `[TOC]` marker replacement.
    Toc,
    Footnotes,
    Strikethrough,
    Tasklists,
    /// Typographic quotes and dashes.
    Smarty,
    /// `{#id .class}` heading attributes.
    AttrList,
    DefList,
}

/// The set of extensions enabled for a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Extensions(BTreeSet<Extension>);

impl Extension {
    fn options(self) -> Options {
        match self {
            Extension::Extra => Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_HEADING_ATTRIBUTES
                | Options::ENABLE_DEFINITION_LIST,
            Extension::FencedCode | Extension::Toc => Options::empty(),
            Extension::Tables => Options::ENABLE_TABLES,
            Extension::Footnotes => Options::ENABLE_FOOTNOTES,
            Extension::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Extension::Tasklists => Options::ENABLE_TASKLISTS,
            Extension::Smarty => Options::ENABLE_SMART_PUNCTUATION,
            Extension::AttrList => Options::ENABLE_HEADING_ATTRIBUTES,
            Extension::DefList => Options::ENABLE_DEFINITION_LIST,
        }
    }
}

impl Extensions {
    pub fn new() -> Self {
        Extensions::default()
    }

    pub fn contains(&self, extension: Extension) -> bool {
        self.0.contains(&extension)
    }

    pub fn insert(&mut self, extension: Extension) -> bool {
        self.0.insert(extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = Extension> + '_ {
        self.0.iter().copied()
    }

    /// The parser options implied by the enabled extensions.
    pub fn options(&self) -> Options {
        self.iter().fold(Options::empty(), |options, ext| options | ext.options())
    }

    /// Whether headings should receive generated ids.
    pub fn heading_ids(&self) -> bool {
        self.contains(Extension::Toc)
            || self.contains(Extension::AttrList)
            || self.contains(Extension::Extra)
    }
}

impl FromIterator<Extension> for Extensions {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        Extensions(iter.into_iter().collect())
    }
}

impl Extend<Extension> for Extensions {
    fn extend<I: IntoIterator<Item = Extension>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl FromStr for Extension {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let de: serde::de::value::StrDeserializer<'_, serde::de::value::Error>
            = name.into_deserializer();

        Extension::deserialize(de).map_err(|_| error! {
            "unknown markdown extension",
            "name" => name,
            "known extensions" => "extra, fenced_code, tables, toc, footnotes, \
                strikethrough, tasklists, smarty, attr_list, def_list",
        })
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Extension::Extra => "extra",
            Extension::FencedCode => "fenced_code",
            Extension::Tables => "tables",
            Extension::Toc => "toc",
            Extension::Footnotes => "footnotes",
            Extension::Strikethrough => "strikethrough",
            Extension::Tasklists => "tasklists",
            Extension::Smarty => "smarty",
            Extension::AttrList => "attr_list",
            Extension::DefList => "def_list",
        };

        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for name in ["extra", "fenced_code", "toc", "attr_list", "def_list"] {
            let ext: Extension = name.parse().unwrap();
            assert_eq!(ext.to_string(), name);
        }

        let error = "wikilinks".parse::<Extension>().unwrap_err();
        assert!(error.to_string().contains("name: wikilinks"));
    }

    #[test]
    fn extra_implies_tables_and_footnotes() {
        let exts: Extensions = [Extension::Extra].into_iter().collect();
        let options = exts.options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_FOOTNOTES));
        assert!(!options.contains(Options::ENABLE_SMART_PUNCTUATION));
        assert!(exts.heading_ids());
    }

    #[test]
    fn fenced_code_alone_adds_nothing() {
        let exts: Extensions = [Extension::FencedCode].into_iter().collect();
        assert!(exts.options().is_empty());
        assert!(!exts.heading_ids());
    }
}
