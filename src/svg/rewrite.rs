//! Attribute rewriting for recolor, resize and restroke edits.
//!
//! All three operations are pure `(markup, parameter) -> markup` transforms.
//! They only change attribute values or add attributes to existing tags, and
//! applying one twice with the same parameter yields the same markup as
//! applying it once.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::tag::{self, Tag};

static SIZE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s)(width|height)\s*=\s*(?:"[^"]*"|'[^']*')"#)
        .expect("size attribute pattern is valid")
});

static VIEW_BOX_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s)viewBox\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("viewBox pattern is valid")
});

/// Options for [`recolor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecolorOptions {
    /// When no tag in the markup carries a `fill` attribute, add `fill` to the root
    /// `<svg>` tag before recoloring shapes.
    ///
    /// Icons that rely on the default black fill have nothing else to
    /// recolor, so an editor usually wants this on.
    pub root_fill_fallback: bool,
}

/// Recolor shapes, honoring the fill/stroke intent declared on the root tag.
///
/// The root `<svg>` tag itself is never modified.
pub fn set_color(markup: &str, color: &str) -> String {
    recolor(markup, color, RecolorOptions::default())
}

/// Recolor shapes with explicit options.
///
/// Rules per shape, in document order:
/// - `path`: when the root declares a paintable `fill`, the path's `fill` is
///   replaced (or inserted when absent) unless it is `none`; likewise for
///   `stroke`.
/// - other shapes: an existing `fill` other than `none` is replaced.
/// - any shape with `stroke-width` gets its `stroke` replaced (or inserted
///   when absent) unless it is `none`.
pub fn recolor(markup: &str, color: &str, options: RecolorOptions) -> String {
    let markup = if options.root_fill_fallback {
        with_root_fill(markup, color)
    } else {
        Cow::Borrowed(markup)
    };

    let (fill_inherited, stroke_inherited) = match tag::root_tag(&markup) {
        Some((_, root)) => (
            root.get("fill").is_some_and(is_paint),
            root.get("stroke").is_some_and(is_paint),
        ),
        None => (false, false),
    };

    let (out, edited) = tag::rewrite_shapes(&markup, |shape| {
        let updates = color_updates(shape, color, fill_inherited, stroke_inherited);
        if updates.is_empty() {
            None
        } else {
            Some(shape.with_attributes(&updates))
        }
    });
    debug!(color, edited, fill_inherited, stroke_inherited, "recolored shapes");
    out
}

fn color_updates<'c>(
    shape: &Tag<'_>,
    color: &'c str,
    fill_inherited: bool,
    stroke_inherited: bool,
) -> Vec<(&'static str, &'c str)> {
    let fill = shape.get("fill");
    let stroke = shape.get("stroke");
    let mut updates = Vec::with_capacity(2);

    if shape.name() == "path" {
        if fill_inherited && !fill.is_some_and(is_none) {
            updates.push(("fill", color));
        }
        if stroke_inherited && !stroke.is_some_and(is_none) {
            updates.push(("stroke", color));
        }
    } else if fill.is_some_and(|value| !is_none(value)) {
        updates.push(("fill", color));
    }

    let stroke_pending = updates.iter().any(|(name, _)| *name == "stroke");
    if shape.has("stroke-width") && !stroke_pending && !stroke.is_some_and(is_none) {
        updates.push(("stroke", color));
    }
    updates
}

/// Insert `fill` on the root tag when no tag in the markup declares a fill.
fn with_root_fill<'m>(markup: &'m str, color: &str) -> Cow<'m, str> {
    if tag::any_tag(markup, |t| t.has("fill")) {
        return Cow::Borrowed(markup);
    }
    let Some((range, root)) = tag::root_tag(markup) else {
        return Cow::Borrowed(markup);
    };
    let mut out = String::with_capacity(markup.len() + color.len() + 8);
    out.push_str(&markup[..range.start]);
    out.push_str(&root.with_attributes(&[("fill", color)]));
    out.push_str(&markup[range.end..]);
    Cow::Owned(out)
}

/// Set `width`, `height` and `viewBox` everywhere in the markup.
///
/// Intentionally global: in icon markup these appear on the root element.
/// `stroke-width` and other hyphenated names are not touched.
pub fn set_size(markup: &str, size: f64) -> String {
    let size = format_number(size);
    let resized = SIZE_ATTRIBUTE.replace_all(markup, |caps: &Captures<'_>| {
        format!("{}{}=\"{size}\"", &caps[1], &caps[2])
    });
    let resized = VIEW_BOX_ATTRIBUTE.replace_all(&resized, |caps: &Captures<'_>| {
        format!("{}viewBox=\"0 0 {size} {size}\"", &caps[1])
    });
    debug!(%size, "resized markup");
    resized.into_owned()
}

/// Set `stroke-width` on every stroked shape.
///
/// Shapes without a `stroke` or `stroke-width` attribute are left alone.
pub fn set_stroke_width(markup: &str, width: f64) -> String {
    let width = format_number(width);
    let (out, edited) = tag::rewrite_shapes(markup, |shape| {
        (shape.has("stroke-width") || shape.has("stroke"))
            .then(|| shape.with_attributes(&[("stroke-width", width.as_str())]))
    });
    debug!(%width, edited, "set stroke width");
    out
}

fn is_none(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("none")
}

/// A root paint value that child paths should inherit.
fn is_paint(value: &str) -> bool {
    !value.trim().is_empty() && !is_none(value)
}

/// Shortest decimal form: `48.0` renders as `48`, `1.5` as `1.5`.
fn format_number(value: f64) -> String {
    format!("{value}")
}
