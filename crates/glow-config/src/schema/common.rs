//! Settings shared by every glow layer.

use glow_common::Color;
use serde::{Deserialize, Serialize};

/// Which intermediate buffer the debug inset shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    #[default]
    None,
    /// Raw per-layer captures.
    Glow,
    /// Thresholded captures.
    Threshold,
    /// Blurred results.
    Blurred,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    /// Debug inset background as a hex string (`#rrggbb` or `#rrggbbaa`).
    pub clear_color: String,
    pub overlay_mode: OverlayMode,
    /// Inset height as a fraction of the frame height (valid range: 0.0-1.0).
    pub overlay_height: f32,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            clear_color: "#00000000".into(),
            overlay_mode: OverlayMode::None,
            overlay_height: 0.4,
        }
    }
}

impl CommonConfig {
    /// Parsed clear colour; unparseable values fall back to transparent.
    pub fn clear_color(&self) -> Color {
        Color::from_hex(&self.clear_color).unwrap_or(Color::TRANSPARENT)
    }
}
