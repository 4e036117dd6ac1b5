//! Interactive icon editing.
//!
//! An [`EditSession`] holds the working copy of one icon. Edits arrive as
//! [`Message`]s and flow through [`update`]; each one is checked against the
//! SVG validator before it replaces the working markup.

mod session;

pub use session::{
    EditDefaults, EditError, EditSession, EditableIcon, Message, Notice, NoticeLevel, update,
};
