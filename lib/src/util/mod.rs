mod macros;
mod path_ext;

pub use path_ext::*;
pub(crate) use macros::*;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Convert spaces to hyphens. Remove characters that aren't alphanumerics,
/// underscores, or hyphens. Convert to lowercase. Also strip leading and
/// trailing whitespace.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        if ch.is_whitespace() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => {
                    // This deviates from Django: all sequences of characters
                    // not alphanumeric or `_` or converted into one `-`.
                    need_dash = !output.is_empty();
                }
            }
        }
    }

    output
}

/// Turns a file stem into a display title: `-` and `_` become spaces, runs of
/// whitespace collapse, and each word's first character is uppercased. The
/// rest of each word is left as written so acronyms survive.
///
/// ```
/// use quire::util::titleize;
///
/// assert_eq!(titleize("getting-started"), "Getting Started");
/// assert_eq!(titleize("API_design"), "API Design");
/// assert_eq!(titleize("a"), "A");
/// ```
pub fn titleize(stem: &str) -> String {
    let mut title = String::with_capacity(stem.len());
    let words = stem.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty());

    for word in words {
        if !title.is_empty() {
            title.push(' ');
        }

        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            title.extend(first.to_uppercase());
            title.push_str(chars.as_str());
        }
    }

    title
}

/// The prefix that leads from a page `depth` directories deep back to the
/// site root: `""`, `"../"`, `"../../"`, ...
pub fn root_prefix(depth: usize) -> String {
    "../".repeat(depth)
}

// Everything that can't appear raw inside a quoted HTML attribute or that
// changes the meaning of a relative URL. Non-ASCII is always encoded.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'\'').add(b'<').add(b'>').add(b'&')
    .add(b'#').add(b'?').add(b'%').add(b'`').add(b'\\');

/// Builds a link to the site-relative, forward-slash `path` from a page whose
/// root prefix is `prefix`. Each segment is percent-encoded so the result is
/// safe inside an HTML attribute.
pub fn href(prefix: &str, path: &str) -> String {
    let mut href = String::from(prefix);
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            href.push('/');
        }

        href.extend(utf8_percent_encode(segment, HREF));
    }

    href
}

// Characters that are never valid raw in a URL and would break out of an
// attribute. Everything else in a configured URL is kept as written.
const ASSET: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// A configured stylesheet or script URL, ready for an HTML attribute.
/// Well-formed URLs are returned unchanged.
pub fn asset_url(url: &str) -> String {
    utf8_percent_encode(url, ASSET).to_string()
}

/// Percent-encodes a URL fragment (heading id) for use after `#`.
pub fn fragment(id: &str) -> String {
    utf8_percent_encode(id, HREF).to_string()
}
