//! View settings - the per-workspace canvas state the UI persists

use serde::{Deserialize, Serialize};

use crate::types::person::CanvasPoint;

/// Minimum allowed zoom factor
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom factor
pub const MAX_ZOOM: f64 = 8.0;

/// Color theme for the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

/// Per-workspace canvas view state
///
/// Saved alongside the graph so reopening a workspace restores the
/// last zoom, pan, and display toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Zoom factor, clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`]
    pub zoom: f64,

    /// Canvas pan offset
    pub pan: CanvasPoint,

    /// Color theme
    pub theme: Theme,

    /// Whether node labels are drawn
    pub show_labels: bool,

    /// Whether person photos are drawn instead of initials
    pub show_photos: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: CanvasPoint::ORIGIN,
            theme: Theme::Light,
            show_labels: true,
            show_photos: true,
        }
    }
}

impl ViewSettings {
    /// Set the zoom factor, clamped to the valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ViewSettings::default();
        assert_eq!(settings.zoom, 1.0);
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.show_labels);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut settings = ViewSettings::default();
        settings.set_zoom(0.0);
        assert_eq!(settings.zoom, MIN_ZOOM);
        settings.set_zoom(100.0);
        assert_eq!(settings.zoom, MAX_ZOOM);
    }
}
