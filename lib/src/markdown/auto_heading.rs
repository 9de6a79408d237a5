use std::collections::VecDeque;

use pulldown_cmark::{Event, Tag, TagEnd};
use rustc_hash::FxHashMap;

use super::Plugin;

/// Assigns a slug id to every heading that doesn't already have one. Repeated
/// slugs are disambiguated with `-1`, `-2`, ... suffixes.
#[derive(Default)]
pub struct AutoHeading {
    seen: FxHashMap<String, usize>,
}

struct HeadingIterator<'a, 's, I: Iterator<Item = Event<'a>>> {
    stack: VecDeque<Event<'a>>,
    seen: &'s mut FxHashMap<String, usize>,
    inner: I,
}

impl AutoHeading {
    fn unique(seen: &mut FxHashMap<String, usize>, slug: String) -> String {
        let slug = if slug.is_empty() { "section".to_string() } else { slug };
        let mut candidate = slug.clone();
        while let Some(n) = seen.get_mut(&candidate) {
            *n += 1;
            candidate = format!("{slug}-{}", *n - 1);
        }

        seen.insert(candidate.clone(), 1);
        candidate
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for HeadingIterator<'a, '_, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.stack.pop_front() {
            return Some(event);
        }

        match self.inner.next()? {
            Event::Start(Tag::Heading { level, id: None, classes, attrs }) => {
                let mut text = String::new();
                loop {
                    let event = self.inner.next()?;
                    if let Event::Text(ref s) | Event::Code(ref s) = event {
                        text.push_str(s);
                    } else if let Event::SoftBreak | Event::HardBreak = event {
                        text.push(' ');
                    } else if let Event::End(TagEnd::Heading(..)) = event {
                        break;
                    }

                    self.stack.push_back(event);
                }

                let id = AutoHeading::unique(self.seen, crate::util::slugify(&text));
                let tag = Tag::Heading { level, id: Some(id.into()), classes, attrs };
                self.stack.push_back(Event::End(TagEnd::Heading(level)));
                Some(Event::Start(tag))
            },
            Event::Start(Tag::Heading { level, id: Some(id), classes, attrs }) => {
                self.seen.entry(id.to_string()).or_insert(1);
                Some(Event::Start(Tag::Heading { level, id: Some(id), classes, attrs }))
            }
            event => Some(event)
        }
    }
}

impl Plugin for AutoHeading {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        self.seen.clear();
        HeadingIterator {
            seen: &mut self.seen,
            inner: events,
            stack: VecDeque::with_capacity(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{html, Options, Parser};

    use super::*;

    fn render(input: &str) -> String {
        let mut plugin = AutoHeading::default();
        let mut output = String::new();
        let events = plugin.remap(Parser::new_ext(input, Options::ENABLE_HEADING_ATTRIBUTES));
        html::push_html(&mut output, events);
        output
    }

    #[test]
    fn headings_get_slug_ids() {
        let html = render("# Hello *World*\n\n## `code` span");
        assert!(html.contains(r#"<h1 id="hello-world">Hello <em>World</em></h1>"#));
        assert!(html.contains(r#"<h2 id="code-span"><code>code</code> span</h2>"#));
    }

    #[test]
    fn repeated_headings_are_disambiguated() {
        let html = render("# Notes\n# Notes\n# Notes\n");
        assert!(html.contains(r#"id="notes""#));
        assert!(html.contains(r#"id="notes-1""#));
        assert!(html.contains(r#"id="notes-2""#));
    }

    #[test]
    fn multi_line_headings_keep_word_breaks() {
        let html = render("Getting\nStarted\n=======\n");
        assert!(html.contains(r#"<h1 id="getting-started">Getting"#));
    }

    #[test]
    fn explicit_ids_are_kept_and_reserved() {
        let html = render("# Setup {#setup}\n# Setup\n");
        assert!(html.contains(r#"<h1 id="setup">Setup</h1>"#));
        assert!(html.contains(r#"<h1 id="setup-1">Setup</h1>"#));
    }
}
