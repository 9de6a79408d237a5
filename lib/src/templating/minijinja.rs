use minijinja::{context, Environment, UndefinedBehavior};
use minijinja::value::Value;

use crate::error::Result;
use crate::site::{Page, SiteModel};
use crate::templating::{home_href, navigation, Engine, Layout};
use crate::util;

const PLAIN: &str = include_str!("../../templates/plain.html");
const NAVBAR: &str = include_str!("../../templates/navbar.html");

/// Renders pages with one of the built-in layouts.
///
/// Every value in the context is HTML-escaped except the page body, which is
/// trusted renderer output, and hrefs, which are percent-encoded beforehand.
#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    layout: Layout,
}

impl MiniJinjaEngine {
    pub fn new(layout: Layout) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.add_template("plain.html", PLAIN)?;
        env.add_template("navbar.html", NAVBAR)?;
        env.add_filter("date", ext::date);

        Ok(MiniJinjaEngine { env, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl Engine for MiniJinjaEngine {
    fn render(&self, page: &Page, site: &SiteModel) -> Result<String> {
        let template = self.env.get_template(self.layout.variant.template_name())?;
        let nav: Vec<Value> = navigation(page, site).into_iter()
            .map(|link| context! {
                title => link.title,
                href => Value::from_safe_string(link.href),
                active => link.active,
            })
            .collect();

        let safe = |strings: Vec<String>| -> Vec<Value> {
            strings.into_iter().map(Value::from_safe_string).collect()
        };

        let context = context! {
            lang => &self.layout.language,
            site_name => &self.layout.site_name,
            title => &page.title,
            root => Value::from_safe_string(util::root_prefix(page.depth)),
            home => Value::from_safe_string(home_href(page, site)),
            nav => nav,
            stylesheets => safe(self.layout.stylesheets().collect()),
            scripts => safe(self.layout.scripts().collect()),
            body => &page.html_fragment,
            generated => self.layout.generated_at.map(|time| time.to_rfc3339()),
        };

        Ok(template.render(context)?)
    }
}

mod ext {
    use chrono::{DateTime, Utc};
    use minijinja::{Error, ErrorKind};

    pub fn date(value: &str, fmt: &str) -> Result<String, Error> {
        let datetime = value.parse::<DateTime<Utc>>()
            .map_err(|e| Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to parse {value}: {e}")
            ))?;

        Ok(datetime.format(fmt).to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::{AssetLink, Config, TemplateVariant};
    use crate::site::Section;

    fn page(path: &str, title: &str, body: &str) -> Page {
        Page {
            title: title.into(),
            source_path: path.replace(".html", ".md").into(),
            relative_html_path: path.into(),
            depth: path.matches('/').count(),
            html_fragment: body.into(),
            raw_text: Arc::from(""),
        }
    }

    fn site(pages: Vec<Page>, sections: &[(&str, Option<&str>)]) -> SiteModel {
        let mut site = SiteModel::default();
        for page in pages {
            site.add_page(page);
        }

        site.sections = sections.iter()
            .map(|(name, landing)| Section {
                name: name.to_string(),
                title: util::titleize(name),
                landing: landing.map(String::from),
            })
            .collect();

        site
    }

    fn engine(variant: TemplateVariant) -> MiniJinjaEngine {
        let config = Config { template: variant, ..Config::default() };
        MiniJinjaEngine::new(Layout::from_config(&config, None)).unwrap()
    }

    #[test]
    fn titles_are_escaped_and_bodies_are_not() {
        let page = page("a.html", "<script>alert(\"x\")</script> & co", "<p><em>raw</em></p>");
        let site = site(vec![page.clone()], &[]);

        for variant in [TemplateVariant::Plain, TemplateVariant::Navbar] {
            let html = engine(variant).render(&page, &site).unwrap();
            assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;"));
            assert!(html.contains("&amp; co"));
            assert!(!html.contains("<script>alert"));
            assert!(html.contains("<p><em>raw</em></p>"));
            assert!(html.to_lowercase().contains("<meta charset=\"utf-8\">"));
        }
    }

    #[test]
    fn nav_links_are_relative_to_the_page() {
        let pages = vec![
            page("index.html", "Home", ""),
            page("my notes/deep/a.html", "A", ""),
            page("guides/index.html", "Guides", ""),
        ];

        let site = site(pages.clone(), &[
            ("assets", None),
            ("guides", Some("guides/index.html")),
            ("my notes", Some("my notes/deep/a.html")),
        ]);

        let html = engine(TemplateVariant::Navbar).render(&pages[1], &site).unwrap();
        assert!(html.contains("href=\"../../index.html\""));
        assert!(html.contains("href=\"../../guides/index.html\">Guides</a>"));
        assert!(html.contains("href=\"../../my%20notes/deep/a.html\" class=\"active\">My Notes</a>"));
        assert!(!html.contains("Assets"));

        let html = engine(TemplateVariant::Plain).render(&pages[0], &site).unwrap();
        assert!(html.contains("href=\"index.html\""));
        assert!(html.contains("href=\"guides/index.html\">Guides</a>"));
        assert!(!html.contains("class=\"active\""));
    }

    #[test]
    fn home_falls_back_to_the_root_directory() {
        let pages = vec![page("a.html", "A", ""), page("sub/b.html", "B", "")];
        let site = site(pages.clone(), &[("sub", Some("sub/b.html"))]);

        assert_eq!(home_href(&pages[0], &site), "./");
        assert_eq!(home_href(&pages[1], &site), "../");
    }

    #[test]
    fn asset_links_are_placed_verbatim() {
        let config = Config {
            template: TemplateVariant::Plain,
            asset_links: Some(vec![
                AssetLink::Script("https://example.com/app.js?v=2".into()),
                AssetLink::Stylesheet("https://example.com/site.css".into()),
            ]),
            ..Config::default()
        };

        let engine = MiniJinjaEngine::new(Layout::from_config(&config, None)).unwrap();
        let page = page("a.html", "A", "<p>body</p>");
        let html = engine.render(&page, &site(vec![page.clone()], &[])).unwrap();

        let stylesheet = html.find("<link rel=\"stylesheet\" href=\"https://example.com/site.css\">").unwrap();
        let script = html.find("<script src=\"https://example.com/app.js?v=2\"></script>").unwrap();
        let head_end = html.find("</head>").unwrap();
        let body = html.find("<p>body</p>").unwrap();
        assert!(stylesheet < head_end);
        assert!(script > body);
    }

    #[test]
    fn timestamps_are_optional() {
        let page = page("a.html", "A", "");
        let site = site(vec![page.clone()], &[]);
        let html = engine(TemplateVariant::Navbar).render(&page, &site).unwrap();
        assert!(!html.contains("Generated"));

        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let layout = Layout::from_config(&Config::default(), Some(at));
        let html = MiniJinjaEngine::new(layout).unwrap().render(&page, &site).unwrap();
        assert!(html.contains("Generated 2024-05-06 07:08 UTC"));
    }
}
