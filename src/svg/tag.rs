//! Tag-scoped scanning.
//!
//! Locates opening tags in raw markup and reads or rewrites attributes inside
//! a single tag. Nothing outside the matched tag span is ever touched, so the
//! set and order of tags in the document is preserved by construction.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

// Shape elements the rewriter edits. `\b` keeps `line` from matching `linearGradient`.
// Quoted values are consumed whole so a `>` inside one does not end the tag.
static SHAPE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:circle|rect|path|ellipse|polygon|line|polyline)\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
        .expect("shape tag pattern is valid")
});

static ROOT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<svg\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("root tag pattern is valid")
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[A-Za-z][^\s/>]*(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("tag pattern is valid")
});

// Leading whitespace is required so `width` never matches inside `stroke-width`.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern is valid")
});

/// One `name="value"` pair inside an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, case preserved.
    pub name: &'a str,
    /// Raw value between the quotes.
    pub value: &'a str,
    /// Byte range of `value` within the tag text.
    value_range: Range<usize>,
    /// Quote character the value was written with.
    quote: char,
}

/// A parsed opening tag such as `<path d="M0 0" fill="red"/>`.
#[derive(Debug, Clone)]
pub struct Tag<'a> {
    text: &'a str,
    name: &'a str,
    attributes: Vec<Attribute<'a>>,
}

impl<'a> Tag<'a> {
    /// Parse the text of a single opening tag, starting at `<` and ending at `>`.
    pub fn parse(text: &'a str) -> Self {
        let after_lt = text.strip_prefix('<').unwrap_or(text);
        let name_len = after_lt
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(after_lt.len());
        let name = &after_lt[..name_len];
        let body_start = text.len() - after_lt.len() + name_len;

        let attributes = ATTRIBUTE
            .captures_iter(&text[body_start..])
            .filter_map(|caps| attribute_from(&caps, body_start))
            .collect();

        Self {
            text,
            name,
            attributes,
        }
    }

    /// Element name, e.g. `path`.
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// The full original tag text.
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// All attributes in source order.
    pub fn attributes(&self) -> &[Attribute<'a>] {
        &self.attributes
    }

    /// Look up an attribute value by exact name.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.attribute(name).map(|attr| attr.value)
    }

    /// Whether the tag carries an attribute with this exact name.
    pub fn has(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn attribute(&self, name: &str) -> Option<&Attribute<'a>> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Return the tag text with each `(name, value)` applied.
    ///
    /// Existing attributes keep their position and quote style; missing ones
    /// are appended just before the closing `>` or `/>`.
    pub fn with_attributes(&self, updates: &[(&str, &str)]) -> String {
        let mut replacements: Vec<(Range<usize>, String)> = Vec::new();
        let mut inserted = String::new();

        for &(name, value) in updates {
            if let Some(attr) = self.attribute(name) {
                replacements.push((attr.value_range.clone(), escape_value(value, attr.quote)));
            } else {
                inserted.push(' ');
                inserted.push_str(name);
                inserted.push_str("=\"");
                inserted.push_str(&escape_value(value, '"'));
                inserted.push('"');
            }
        }
        replacements.sort_by_key(|(range, _)| range.start);

        let insert_at = self.insert_offset();
        let mut out = String::with_capacity(self.text.len() + inserted.len() + 16);
        let mut cursor = 0;
        for (range, value) in replacements {
            out.push_str(&self.text[cursor..range.start]);
            out.push_str(&value);
            cursor = range.end;
        }
        out.push_str(&self.text[cursor..insert_at]);
        out.push_str(&inserted);
        out.push_str(&self.text[insert_at..]);
        out
    }

    /// Offset just past the last attribute, before any trailing whitespace
    /// and the `/>` or `>` terminator.
    fn insert_offset(&self) -> usize {
        let open = self.text.strip_suffix('>').unwrap_or(self.text).trim_end();
        let open = open.strip_suffix('/').map_or(open, str::trim_end);
        open.len()
    }
}

fn attribute_from<'a>(caps: &Captures<'a>, offset: usize) -> Option<Attribute<'a>> {
    let name = caps.get(1)?.as_str();
    let (value, quote) = match (caps.get(2), caps.get(3)) {
        (Some(value), _) => (value, '"'),
        (None, Some(value)) => (value, '\''),
        (None, None) => return None,
    };
    Some(Attribute {
        name,
        value: value.as_str(),
        value_range: offset + value.start()..offset + value.end(),
        quote,
    })
}

/// Escape characters that would end the attribute or confuse tag scanning.
fn escape_value(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Find the root `<svg ...>` opening tag and its byte range in `markup`.
pub fn root_tag(markup: &str) -> Option<(Range<usize>, Tag<'_>)> {
    let found = ROOT_TAG.find(markup)?;
    Some((found.range(), Tag::parse(found.as_str())))
}

/// Whether any opening tag, of any element, satisfies `pred`.
pub fn any_tag(markup: &str, mut pred: impl FnMut(&Tag<'_>) -> bool) -> bool {
    ANY_TAG
        .find_iter(markup)
        .any(|found| pred(&Tag::parse(found.as_str())))
}

/// Rewrite every shape opening tag in document order.
///
/// `edit` returns `Some(new_tag_text)` to replace a tag or `None` to leave it
/// as is. Returns the rewritten markup and the number of tags replaced.
pub fn rewrite_shapes(
    markup: &str,
    mut edit: impl FnMut(&Tag<'_>) -> Option<String>,
) -> (String, usize) {
    let mut edited = 0;
    let out = SHAPE_TAG.replace_all(markup, |caps: &Captures<'_>| {
        let text = caps.get(0).map_or("", |m| m.as_str());
        match edit(&Tag::parse(text)) {
            Some(new_text) => {
                if new_text != text {
                    edited += 1;
                }
                new_text
            }
            None => text.to_string(),
        }
    });
    (out.into_owned(), edited)
}
