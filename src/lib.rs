// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. icon::IconCollection)
    clippy::module_name_repetitions
)]

//! # icon-factory
//!
//! Attribute rewriting and validation for AI-generated SVG icon sets.
//!
//! Model output is ingested into sanitized icons, edited through pure
//! markup transforms, checked by a structural validator, saved into
//! collections and exported as SVG, PNG or JPEG.
//!
//! ## Architecture
//!
//! Editing follows The Elm Architecture (TEA) pattern:
//! - **Model**: [`editor::EditSession`]
//! - **Message**: [`editor::Message`]
//! - **Update**: [`editor::update`], a pure state transition
//!
//! ## Modules
//!
//! - [`svg`]: Validator, normalizer and attribute rewriter
//! - [`icon`]: Icon and collection records
//! - [`ingest`]: Model response extraction and sanitization
//! - [`editor`]: Edit sessions
//! - [`library`]: Collection storage
//! - [`export`]: SVG/PNG/JPEG export and naming helpers
//! - [`generate`]: Prompting a model for icons
//! - [`config`]: Persisted default flags
//! - [`perf`]: Timing and debug event log

pub mod config;
pub mod editor;
pub mod export;
pub mod generate;
pub mod icon;
pub mod ingest;
pub mod library;
pub mod perf;
pub mod svg;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{EditSession, Message, update};
    pub use crate::icon::{Icon, IconCollection};
    pub use crate::ingest::{Ingestion, ingest};
    pub use crate::svg::{is_valid_svg, normalize, set_color, set_size, set_stroke_width};
}
