//! SVG markup checks and edits.
//!
//! Everything here works on markup as text. Edits are scoped to single
//! opening tags found by pattern matching; no document tree is built.
//!
//! - [`is_valid_svg`] / [`validate`]: structural gate for persisting and exporting
//! - [`normalize`]: whitespace collapse
//! - [`set_color`], [`set_size`], [`set_stroke_width`]: attribute rewriting

mod normalize;
mod rewrite;
pub mod tag;
mod validate;

pub use normalize::normalize;
pub use rewrite::{RecolorOptions, recolor, set_color, set_size, set_stroke_width};
pub use validate::{ValidationReport, element_count, is_valid_svg, validate};
