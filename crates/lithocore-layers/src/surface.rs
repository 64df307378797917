//! The seam between the core and whatever draws the map.

use lithocore_core::Category;
use serde::Serialize;

use crate::viewport::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A short, non-technical message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Rendering surface driven by the session controller.
///
/// Implementations only display; they never call back into the controller.
pub trait RenderSurface {
    fn notify(&mut self, notice: Notice);

    /// Enables or disables the search trigger (button, prompt, endpoint).
    fn set_trigger_enabled(&mut self, enabled: bool);

    fn fit_bounds(&mut self, bounds: Bounds);

    /// Makes a category's layer visible on the surface.
    fn show_layer(&mut self, category: Category);
}

/// Surface that records every call, used by the HTTP server to return a
/// session's effects as JSON and by tests to assert on them.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSurface {
    pub notices: Vec<Notice>,
    pub trigger_changes: Vec<bool>,
    pub fitted: Vec<Bounds>,
    pub shown_layers: Vec<Category>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current trigger state; enabled until the first change.
    #[must_use]
    pub fn trigger_enabled(&self) -> bool {
        self.trigger_changes.last().copied().unwrap_or(true)
    }

    /// How many times the trigger was re-enabled.
    #[must_use]
    pub fn trigger_restorations(&self) -> usize {
        self.trigger_changes.iter().filter(|enabled| **enabled).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger_changes.push(enabled);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.fitted.push(bounds);
    }

    fn show_layer(&mut self, category: Category) {
        if !self.shown_layers.contains(&category) {
            self.shown_layers.push(category);
        }
    }
}
