//! Exporting icons as files.
//!
//! SVG export writes the markup unchanged. Raster export renders with
//! `resvg` at exactly `size × size` pixels and encodes PNG (transparent
//! background) or JPEG (composited on white).

mod naming;
mod raster;

pub use naming::{combined_svg_text, generate_icon_name, icon_file_name, svg_data_url, svg_from_data_url};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::svg::is_valid_svg;

/// Errors from exporting an icon.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("refusing to export invalid SVG markup")]
    MalformedMarkup,
    #[error("failed to parse SVG: {0}")]
    Parse(#[from] resvg::usvg::Error),
    #[error("failed to render SVG: {0}")]
    Render(String),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("unsupported export size {0}; expected one of 16, 24, 32, 48, 64, 128, 256")]
    Size(u32),
    #[error("not an SVG data URL")]
    DataUrl,
}

/// Output file format.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Svg,
    Png,
    Jpg,
}

impl ExportFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Edge length in pixels of a raster export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ExportSize(u32);

impl ExportSize {
    pub const ALLOWED: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for ExportSize {
    fn default() -> Self {
        Self(32)
    }
}

impl TryFrom<u32> for ExportSize {
    type Error = ExportError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ExportError::Size(value))
        }
    }
}

impl From<ExportSize> for u32 {
    fn from(size: ExportSize) -> Self {
        size.0
    }
}

impl fmt::Display for ExportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Produce the file contents for one icon.
///
/// # Errors
/// Invalid markup is refused before any rendering. Raster formats can also
/// fail to parse, render or encode.
pub fn export_icon(svg: &str, format: ExportFormat, size: ExportSize) -> Result<Vec<u8>, ExportError> {
    let _scope = crate::perf::scope("export");
    if !is_valid_svg(svg) {
        return Err(ExportError::MalformedMarkup);
    }
    debug!(%format, %size, "exporting icon");
    match format {
        ExportFormat::Svg => Ok(svg.as_bytes().to_vec()),
        ExportFormat::Png => raster::encode_png(svg, size.get()),
        ExportFormat::Jpg => raster::encode_jpeg(svg, size.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_size_accepts_only_listed_sizes() {
        assert_eq!(ExportSize::try_from(48).unwrap().get(), 48);
        assert!(matches!(ExportSize::try_from(50), Err(ExportError::Size(50))));
        assert_eq!(ExportSize::default().get(), 32);
    }

    #[test]
    fn test_export_size_deserialize_checks_range() {
        assert!(serde_json::from_str::<ExportSize>("128").is_ok());
        assert!(serde_json::from_str::<ExportSize>("100").is_err());
    }

    #[test]
    fn test_format_parse_and_extension() {
        assert_eq!(ExportFormat::parse("JPEG"), Some(ExportFormat::Jpg));
        assert_eq!(ExportFormat::parse("gif"), None);
        assert_eq!(ExportFormat::Png.to_string(), "png");
    }

    #[test]
    fn test_svg_export_returns_markup() {
        let svg = "<svg><path d=\"M0 0\"/></svg>";
        let bytes = export_icon(svg, ExportFormat::Svg, ExportSize::default()).unwrap();
        assert_eq!(bytes, svg.as_bytes());
    }

    #[test]
    fn test_invalid_markup_is_refused() {
        assert!(matches!(
            export_icon("<svg>", ExportFormat::Png, ExportSize::default()),
            Err(ExportError::MalformedMarkup)
        ));
    }
}
