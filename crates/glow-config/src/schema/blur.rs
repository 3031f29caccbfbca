//! Blur stage settings carried per glow layer.
//!
//! The compositing core never reads these fields; they are handed through
//! to whichever blur stage the host plugs in.

use serde::{Deserialize, Serialize};

/// Separable blur parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurSettings {
    /// Horizontal + vertical pass pairs (valid range: 1-8).
    pub iterations: u32,
    /// Distance between taps in texels (valid range: 0.0-8.0).
    pub spread: f32,
    /// Scratch resolution divisor (valid range: 1-4).
    pub downsample: u32,
}

impl Default for BlurSettings {
    fn default() -> Self {
        Self {
            iterations: 2,
            spread: 1.0,
            downsample: 1,
        }
    }
}
