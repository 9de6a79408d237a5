pub mod minijinja;

use std::fmt::Debug;

use chrono::{DateTime, Utc};

pub use self::minijinja::MiniJinjaEngine;

use crate::config::{AssetLink, Config, TemplateVariant};
use crate::error::Result;
use crate::site::{section_of, Page, SiteModel};
use crate::util;

/// Turns one page of a completed site into a full HTML document.
pub trait Engine: Send + Sync + Debug {
    fn render(&self, page: &Page, site: &SiteModel) -> Result<String>;
}

/// The parts of a page that are fixed for the whole build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub variant: TemplateVariant,
    pub site_name: String,
    pub language: String,
    pub asset_links: Vec<AssetLink>,
    /// Shown on every page when set. Computed once per build.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Layout {
    pub fn from_config(config: &Config, generated_at: Option<DateTime<Utc>>) -> Self {
        Layout {
            variant: config.template,
            site_name: config.site_name.clone(),
            language: config.language.clone(),
            asset_links: config.asset_links(),
            generated_at,
        }
    }

    pub fn stylesheets(&self) -> impl Iterator<Item = String> + '_ {
        self.asset_links.iter()
            .filter(|link| matches!(link, AssetLink::Stylesheet(_)))
            .map(|link| util::asset_url(link.url()))
    }

    pub fn scripts(&self) -> impl Iterator<Item = String> + '_ {
        self.asset_links.iter()
            .filter(|link| matches!(link, AssetLink::Script(_)))
            .map(|link| util::asset_url(link.url()))
    }
}

/// One entry of a page's navigation, with an href relative to that page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub href: String,
    pub active: bool,
}

/// The link from `page` back to the site root: the root `index.html` if the
/// site has one, otherwise the root directory itself.
pub fn home_href(page: &Page, site: &SiteModel) -> String {
    let prefix = util::root_prefix(page.depth);
    match site.page("index.html") {
        Some(_) => util::href(&prefix, "index.html"),
        None if prefix.is_empty() => "./".into(),
        None => prefix,
    }
}

/// A link to every section that has a landing page, in section order.
pub fn navigation(page: &Page, site: &SiteModel) -> Vec<NavLink> {
    let prefix = util::root_prefix(page.depth);
    let current = section_of(&page.relative_html_path);

    site.sections.iter()
        .filter_map(|section| {
            let landing = section.landing.as_deref()?;
            Some(NavLink {
                title: section.title.clone(),
                href: util::href(&prefix, landing),
                active: current == Some(section.name.as_str()),
            })
        })
        .collect()
}
