use pulldown_cmark::{CowStr, Event, HeadingLevel, LinkType, Tag, TagEnd};

use crate::markdown::Plugin;

/// The paragraph text that is replaced by the table of contents.
pub const MARKER: &str = "[TOC]";

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub level: HeadingLevel,
    pub id: String,
}

/// Replaces every `[TOC]` paragraph with a nested list of links to the
/// document's headings. Only headings with ids are listed, so this runs after
/// [`AutoHeading`](super::AutoHeading).
#[derive(Debug, Clone, Default)]
pub struct TableOfContents {
    pub entries: Vec<Entry>,
}

impl TableOfContents {
    fn collect_entries(&mut self, events: &[Event<'_>]) {
        self.entries.clear();

        let mut current: Option<Entry> = None;
        for event in events {
            match event {
                Event::Start(Tag::Heading { level, id: Some(id), .. }) => {
                    current = Some(Entry { title: String::new(), level: *level, id: id.to_string() });
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(entry) = current.as_mut() {
                        entry.title.push_str(text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some(entry) = current.as_mut() {
                        entry.title.push(' ');
                    }
                }
                Event::End(TagEnd::Heading(_)) => {
                    self.entries.extend(current.take());
                }
                _ => {}
            }
        }
    }

    fn list<'a>(&self) -> Vec<Event<'a>> {
        let mut events = vec![Event::Html(CowStr::from("<div class=\"toc\">\n"))];
        let mut open: Vec<HeadingLevel> = vec![];
        for entry in &self.entries {
            while open.last().map_or(false, |&top| top > entry.level) {
                events.push(Event::Html("</li>\n</ul>\n".into()));
                open.pop();
            }

            match open.last() {
                Some(&top) if top == entry.level => events.push(Event::Html("</li>\n".into())),
                _ => {
                    events.push(Event::Html("<ul>\n".into()));
                    open.push(entry.level);
                }
            }

            events.push(Event::Html("<li>".into()));
            events.push(Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                dest_url: format!("#{}", crate::util::fragment(&entry.id)).into(),
                title: CowStr::from(""),
                id: CowStr::from(""),
            }));
            events.push(Event::Text(entry.title.clone().into()));
            events.push(Event::End(TagEnd::Link));
        }

        for _ in open {
            events.push(Event::Html("</li>\n</ul>\n".into()));
        }

        events.push(Event::Html("</div>\n".into()));
        events
    }
}

/// If `events` starts with a paragraph holding only the marker text, returns
/// the number of events that paragraph spans.
fn marker_len(events: &[Event<'_>]) -> Option<usize> {
    if !matches!(events.first(), Some(Event::Start(Tag::Paragraph))) {
        return None;
    }

    // The parser may split bracketed text into several text events.
    let mut text = String::new();
    for (i, event) in events.iter().enumerate().skip(1) {
        match event {
            Event::Text(chunk) => text.push_str(chunk),
            Event::End(TagEnd::Paragraph) if text.trim() == MARKER => return Some(i + 1),
            _ => return None,
        }
    }

    None
}

impl Plugin for TableOfContents {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        // The marker may precede the headings it lists, so the whole stream is
        // buffered before anything is emitted.
        let events: Vec<Event<'a>> = events.collect();
        self.collect_entries(&events);

        let mut output = Vec::with_capacity(events.len());
        let mut i = 0;
        while i < events.len() {
            if let Some(len) = marker_len(&events[i..]) {
                output.extend(self.list());
                i += len;
            } else {
                output.push(events[i].clone());
                i += 1;
            }
        }

        output.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{html, Options, Parser};

    use super::*;
    use crate::markdown::AutoHeading;

    fn render(input: &str) -> (String, Vec<Entry>) {
        let mut headings = AutoHeading::default();
        let mut toc = TableOfContents::default();
        let mut output = String::new();
        {
            let events = headings.remap(Parser::new_ext(input, Options::empty()));
            html::push_html(&mut output, toc.remap(events));
        }

        (output, toc.entries)
    }

    #[test]
    fn marker_is_replaced_with_nested_list() {
        let (html, entries) = render("[TOC]\n\n# One\n## One A\n## One B\n# Two & Three\n");
        assert_eq!(entries.len(), 4);
        assert!(!html.contains(MARKER));
        assert!(html.starts_with("<div class=\"toc\">\n<ul>\n<li><a href=\"#one\">One</a><ul>\n"));
        assert!(html.contains("<li><a href=\"#one-a\">One A</a></li>\n<li><a href=\"#one-b\">One B</a></li>\n</ul>\n"));
        assert!(html.contains("<a href=\"#two-three\">Two &amp; Three</a>"));
        assert!(html.contains("</li>\n</ul>\n</div>\n"));
    }

    #[test]
    fn skipped_levels_still_nest() {
        let (html, _) = render("[TOC]\n\n# A\n### Deep\n## Mid\n");
        let opened = html.matches("<ul>").count();
        let closed = html.matches("</ul>").count();
        assert_eq!(opened, closed);
        assert_eq!(opened, 3);
    }

    #[test]
    fn multi_line_headings_are_listed_with_spaces() {
        let (html, entries) = render("[TOC]\n\nGetting\nStarted\n=======\n");
        assert_eq!(entries[0].title, "Getting Started");
        assert_eq!(entries[0].id, "getting-started");
        assert!(html.contains("<a href=\"#getting-started\">Getting Started</a>"));
    }

    #[test]
    fn documents_without_marker_are_unchanged() {
        let (html, entries) = render("# Title\n\ntext [TOC] inline\n");
        assert_eq!(entries.len(), 1);
        assert!(!html.contains("class=\"toc\""));
        assert!(html.contains("text [TOC] inline"));
    }
}
