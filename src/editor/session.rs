use thiserror::Error;
use tracing::debug;

use crate::icon::Icon;
use crate::svg::{RecolorOptions, is_valid_svg, recolor, set_size, set_stroke_width};

/// Starting values for a new edit session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDefaults {
    pub color: String,
    pub size: f64,
    pub stroke_width: f64,
    /// Recolor the root `<svg>` when the icon declares no fill anywhere.
    pub root_fill_fallback: bool,
}

impl Default for EditDefaults {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            size: 32.0,
            stroke_width: 2.0,
            root_fill_fallback: true,
        }
    }
}

/// Why an edit was not applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// The edited markup would fail the SVG validator.
    #[error("invalid SVG markup; keeping the previous version")]
    MalformedMarkup,
    #[error("color cannot be empty")]
    EmptyColor,
    #[error("{name} must be a finite number {bound}, got {value}")]
    InvalidParameter {
        name: &'static str,
        bound: &'static str,
        value: f64,
    },
}

/// An icon plus the working values shown in the editor.
///
/// The working values belong to the session and are dropped with it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableIcon {
    pub icon: Icon,
    pub selected_color: String,
    pub selected_size: f64,
    pub stroke_width: f64,
}

impl EditableIcon {
    fn new(icon: Icon, defaults: &EditDefaults) -> Self {
        Self {
            icon,
            selected_color: defaults.color.clone(),
            selected_size: defaults.size,
            stroke_width: defaults.stroke_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Short feedback for the user about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// All edits a user can make during a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Recolor shapes
    SetColor(String),
    /// Set width, height and viewBox
    SetSize(f64),
    /// Set stroke width on stroked shapes
    SetStrokeWidth(f64),
    /// Replace the markup from the code editor
    SetCode(String),
    /// Change the icon name
    Rename(String),
    /// Change the icon description
    Describe(String),
    /// Discard all edits
    Reset,
}

/// Working state for editing one icon.
///
/// The markup held in [`EditSession::working`] always reflects the last
/// accepted edit; an edit whose result fails the validator is rejected and
/// reported through [`EditSession::notice`].
#[derive(Debug, Clone)]
pub struct EditSession {
    original: Icon,
    working: EditableIcon,
    /// Raw text of the code editor. May differ from the working markup while
    /// the user is typing invalid SVG.
    code: String,
    defaults: EditDefaults,
    notice: Option<Notice>,
}

impl EditSession {
    /// Start editing `icon` with the given working values.
    pub fn new(icon: Icon, defaults: EditDefaults) -> Self {
        Self {
            code: icon.svg.clone(),
            working: EditableIcon::new(icon.clone(), &defaults),
            original: icon,
            defaults,
            notice: None,
        }
    }

    pub const fn working(&self) -> &EditableIcon {
        &self.working
    }

    /// The current accepted markup.
    pub fn svg(&self) -> &str {
        &self.working.icon.svg
    }

    /// The code editor text.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether anything differs from the icon the session started with.
    pub fn is_dirty(&self) -> bool {
        self.working.icon != self.original
    }

    /// Whether [`EditSession::finish`] would succeed.
    pub fn can_save(&self) -> bool {
        is_valid_svg(self.svg())
    }

    /// Apply one edit.
    ///
    /// # Errors
    /// Returns an error when the parameter is out of range or the result
    /// would not be valid SVG. The previous markup is kept in both cases.
    pub fn apply(&mut self, msg: Message) -> Result<(), EditError> {
        let result = self.apply_inner(msg);
        if let Err(err) = &result {
            debug!(error = %err, "edit rejected");
            self.notice = Some(Notice {
                level: NoticeLevel::Error,
                message: err.to_string(),
            });
        }
        result
    }

    fn apply_inner(&mut self, msg: Message) -> Result<(), EditError> {
        match msg {
            Message::SetColor(color) => {
                let color = color.trim();
                if color.is_empty() {
                    return Err(EditError::EmptyColor);
                }
                let options = RecolorOptions {
                    root_fill_fallback: self.defaults.root_fill_fallback,
                };
                let svg = recolor(self.svg(), color, options);
                self.accept_markup(svg)?;
                self.working.selected_color = color.to_string();
            }
            Message::SetSize(size) => {
                check_number("size", size, size > 0.0, "greater than 0")?;
                let svg = set_size(self.svg(), size);
                self.accept_markup(svg)?;
                self.working.selected_size = size;
            }
            Message::SetStrokeWidth(width) => {
                check_number("stroke width", width, width >= 0.0, "of at least 0")?;
                let svg = set_stroke_width(self.svg(), width);
                self.accept_markup(svg)?;
                self.working.stroke_width = width;
            }
            Message::SetCode(code) => {
                self.code.clone_from(&code);
                if !is_valid_svg(&code) {
                    return Err(EditError::MalformedMarkup);
                }
                self.working.icon.svg = code;
                self.notice = None;
            }
            Message::Rename(name) => self.working.icon.name = name,
            Message::Describe(description) => self.working.icon.description = description,
            Message::Reset => {
                self.working = EditableIcon::new(self.original.clone(), &self.defaults);
                self.code = self.original.svg.clone();
                self.notice = Some(Notice {
                    level: NoticeLevel::Info,
                    message: "Reset to original icon".to_string(),
                });
            }
        }
        Ok(())
    }

    fn accept_markup(&mut self, svg: String) -> Result<(), EditError> {
        if !is_valid_svg(&svg) {
            return Err(EditError::MalformedMarkup);
        }
        self.code.clone_from(&svg);
        self.working.icon.svg = svg;
        self.notice = None;
        Ok(())
    }

    /// End the session and produce the edited icon.
    ///
    /// Only the markup, name and description carry over; the working color,
    /// size and stroke width are dropped.
    ///
    /// # Errors
    /// Returns [`EditError::MalformedMarkup`] when the markup is not valid SVG.
    pub fn finish(self) -> Result<Icon, EditError> {
        if !self.can_save() {
            return Err(EditError::MalformedMarkup);
        }
        let edited = self.working.icon;
        Ok(Icon {
            id: self.original.id,
            name: edited.name,
            description: edited.description,
            svg: edited.svg,
            category: self.original.category,
            is_edited: true,
        })
    }
}

fn check_number(
    name: &'static str,
    value: f64,
    in_range: bool,
    bound: &'static str,
) -> Result<(), EditError> {
    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(EditError::InvalidParameter { name, bound, value })
    }
}

/// Apply `msg` to `session` and return the new state.
///
/// Rejected edits leave the markup untouched and set an error notice.
pub fn update(mut session: EditSession, msg: Message) -> EditSession {
    let _ = session.apply(msg);
    session
}
