use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{ExportError, ExportFormat};
use crate::icon::Icon;
use crate::svg::normalize;

const DATA_URL_PREFIX: &str = "data:image/svg+xml";

/// Download name for an icon, e.g. `home-1.png`.
///
/// Path separators in the name are replaced so the result stays a single
/// path component.
pub fn icon_file_name(name: &str, format: ExportFormat) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    let stem = if stem.is_empty() { "icon" } else { stem.as_str() };
    format!("{stem}.{}", format.extension())
}

/// Slug name from a description: `"Home Page!"` at index 0 becomes `home-page-1`.
pub fn generate_icon_name(description: &str, index: usize) -> String {
    let cleaned: String = description
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{slug}-{}", index + 1)
}

/// All icons in one text document, each preceded by a `<!-- name -->` comment.
pub fn combined_svg_text(icons: &[Icon]) -> String {
    let mut out = String::new();
    for (i, icon) in icons.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = write!(out, "<!-- {} -->\n{}", icon.name, normalize(&icon.svg));
    }
    out
}

/// Encode markup as a base64 `data:` URL.
pub fn svg_data_url(svg: &str) -> String {
    format!("{DATA_URL_PREFIX};base64,{}", STANDARD.encode(svg))
}

/// Decode markup from a `data:image/svg+xml` URL.
///
/// Accepts both the base64 form and the percent-encoded form.
///
/// # Errors
/// Returns [`ExportError::DataUrl`] when the URL is not an SVG data URL or
/// its payload does not decode to UTF-8 text.
pub fn svg_from_data_url(url: &str) -> Result<String, ExportError> {
    let rest = url.trim().strip_prefix(DATA_URL_PREFIX).ok_or(ExportError::DataUrl)?;
    let (params, payload) = rest.split_once(',').ok_or(ExportError::DataUrl)?;
    if params.split(';').any(|p| p == "base64") {
        let bytes = STANDARD.decode(payload).map_err(|_| ExportError::DataUrl)?;
        return String::from_utf8(bytes).map_err(|_| ExportError::DataUrl);
    }
    // `urlencoding` passes malformed escapes through untouched.
    if !has_valid_escapes(payload) {
        return Err(ExportError::DataUrl);
    }
    urlencoding::decode(payload)
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| ExportError::DataUrl)
}

/// Every `%` must be followed by exactly two hex digits.
fn has_valid_escapes(payload: &str) -> bool {
    payload.split('%').skip(1).all(|rest| {
        rest.as_bytes()
            .get(..2)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    })
}
