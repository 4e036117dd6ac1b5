use std::borrow::Cow;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

use super::ExportError;
use crate::svg::tag;

const JPEG_QUALITY: u8 = 95;
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

pub(super) fn encode_png(svg: &str, size: u32) -> Result<Vec<u8>, ExportError> {
    let image = rasterize_svg(svg, size, None)?;
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

pub(super) fn encode_jpeg(svg: &str, size: u32) -> Result<Vec<u8>, ExportError> {
    // JPEG has no alpha channel.
    let image = rasterize_svg(svg, size, Some(Color::WHITE))?;
    let rgb = DynamicImage::ImageRgba8(image).into_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}

/// Render `svg` stretched to exactly `size × size` pixels.
fn rasterize_svg(svg: &str, size: u32, background: Option<Color>) -> Result<RgbaImage, ExportError> {
    let svg = with_namespace(svg);
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())?;
    let natural = tree.size();

    #[allow(clippy::cast_precision_loss)]
    let target = size as f32;
    let scale_x = target / natural.width();
    let scale_y = target / natural.height();

    let mut pixmap = Pixmap::new(size, size)
        .ok_or_else(|| ExportError::Render(format!("failed to create pixmap {size}x{size}")))?;
    if let Some(color) = background {
        pixmap.fill(color);
    }

    resvg::render(&tree, Transform::from_scale(scale_x, scale_y), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; image expects straight alpha.
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();
    RgbaImage::from_raw(size, size, rgba)
        .ok_or_else(|| ExportError::Render("failed to create image from pixmap data".to_string()))
}

/// Model output often omits `xmlns`, which the parser needs to recognise
/// the root element.
fn with_namespace(svg: &str) -> Cow<'_, str> {
    match tag::root_tag(svg) {
        Some((range, root)) if !root.has("xmlns") => {
            let mut out = String::with_capacity(svg.len() + SVG_NAMESPACE.len() + 10);
            out.push_str(&svg[..range.start]);
            out.push_str(&root.with_attributes(&[("xmlns", SVG_NAMESPACE)]));
            out.push_str(&svg[range.end..]);
            Cow::Owned(out)
        }
        _ => Cow::Borrowed(svg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNER_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><rect x="0" y="0" width="12" height="12" fill="#ff0000"/></svg>"##;

    #[test]
    fn test_rasterize_scales_to_exact_size() {
        for size in [16, 48, 256] {
            let image = rasterize_svg(CORNER_SQUARE, size, None).unwrap();
            assert_eq!(image.dimensions(), (size, size));
        }
    }

    #[test]
    fn test_png_keeps_transparent_background() {
        let bytes = encode_png(CORNER_SQUARE, 32).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (32, 32));
        assert_eq!(decoded.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(30, 30).0[3], 0);
    }

    #[test]
    fn test_jpeg_composites_on_white() {
        let bytes = encode_jpeg(CORNER_SQUARE, 64).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (64, 64));
        let corner = decoded.get_pixel(60, 60).0;
        assert!(corner.iter().all(|&c| c > 240), "expected white, got {corner:?}");
    }

    #[test]
    fn test_missing_namespace_is_added() {
        let bare = r#"<svg viewBox="0 0 8 8"><rect width="8" height="8"/></svg>"#;
        assert_eq!(
            with_namespace(bare),
            r#"<svg viewBox="0 0 8 8" xmlns="http://www.w3.org/2000/svg"><rect width="8" height="8"/></svg>"#
        );
        let image = rasterize_svg(bare, 16, None).unwrap();
        assert_eq!(image.get_pixel(8, 8).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_unparseable_svg_is_parse_error() {
        assert!(matches!(
            rasterize_svg("<svg><path</svg>", 16, None),
            Err(ExportError::Parse(_))
        ));
    }
}
