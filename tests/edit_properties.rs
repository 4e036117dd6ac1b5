//! Properties of the markup transforms over generated icon markup.

use icon_factory::svg::{
    RecolorOptions, is_valid_svg, normalize, recolor, set_color, set_size, set_stroke_width,
};
use proptest::prelude::*;

fn paint() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("none".to_string())),
        "#[0-9a-f]{6}".prop_map(Some),
    ]
}

fn attr(name: &str, value: Option<&String>) -> String {
    value.map_or_else(String::new, |v| format!(" {name}=\"{v}\""))
}

fn shape() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![
            "path", "circle", "rect", "ellipse", "line", "polyline", "polygon", "g",
        ]),
        paint(),
        paint(),
        prop::option::of(1u8..5),
    )
        .prop_map(|(name, fill, stroke, width)| {
            let width = width.map(|w| w.to_string());
            format!(
                "<{name} d=\"M0 0\"{}{}{}/>",
                attr("fill", fill.as_ref()),
                attr("stroke", stroke.as_ref()),
                attr("stroke-width", width.as_ref()),
            )
        })
}

fn icon_markup() -> impl Strategy<Value = String> {
    (paint(), paint(), prop::collection::vec(shape(), 0..6)).prop_map(|(fill, stroke, shapes)| {
        format!(
            "<svg width=\"24\" height=\"24\" viewBox=\"0 0 24 24\"{}{}>{}</svg>",
            attr("fill", fill.as_ref()),
            attr("stroke", stroke.as_ref()),
            shapes.concat()
        )
    })
}

fn tag_count(markup: &str) -> usize {
    markup.matches('<').count()
}

proptest! {
    #[test]
    fn set_color_is_idempotent(markup in icon_markup(), color in "#[0-9a-f]{6}") {
        let once = set_color(&markup, &color);
        prop_assert_eq!(set_color(&once, &color), once);
    }

    #[test]
    fn recolor_with_root_fill_is_idempotent(markup in icon_markup(), color in "#[0-9a-f]{6}") {
        let options = RecolorOptions { root_fill_fallback: true };
        let once = recolor(&markup, &color, options);
        prop_assert_eq!(recolor(&once, &color, options), once);
    }

    #[test]
    fn set_size_is_idempotent(markup in icon_markup(), size in 1u16..512) {
        let once = set_size(&markup, f64::from(size));
        prop_assert_eq!(set_size(&once, f64::from(size)), once);
    }

    #[test]
    fn set_stroke_width_is_idempotent(markup in icon_markup(), width in 0u8..10) {
        let once = set_stroke_width(&markup, f64::from(width));
        prop_assert_eq!(set_stroke_width(&once, f64::from(width)), once);
    }

    #[test]
    fn rewrites_preserve_validity_and_tags(
        markup in icon_markup(),
        color in "#[0-9a-f]{6}",
        size in 1u16..512,
        width in 0u8..10,
    ) {
        prop_assert!(is_valid_svg(&markup));
        let edited = set_stroke_width(&set_size(&set_color(&markup, &color), f64::from(size)), f64::from(width));
        prop_assert!(is_valid_svg(&edited));
        prop_assert_eq!(tag_count(&edited), tag_count(&markup));
    }

    #[test]
    fn root_paint_is_never_rewritten(markup in icon_markup(), color in "#[0-9a-f]{6}") {
        let root_end = markup.find('>').unwrap();
        let recolored = set_color(&markup, &color);
        prop_assert_eq!(&recolored[..=root_end], &markup[..=root_end]);
    }

    #[test]
    fn normalize_is_idempotent(text in "[ \t\r\n<>/a-z=\"]{0,64}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_keeps_validity_verdict(markup in icon_markup(), pad in "[ \n\t]{0,4}") {
        let padded = markup.replace('>', &format!(">{pad}"));
        prop_assert_eq!(is_valid_svg(&normalize(&padded)), is_valid_svg(&padded));
    }
}
