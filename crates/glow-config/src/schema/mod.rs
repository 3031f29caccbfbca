//! Glow pipeline settings.
//!
//! A [`DataSet`] is one TOML document: a `[common]` table and an ordered
//! `[[layers]]` array. Every table uses serde defaults, so partial files
//! load cleanly.

mod blur;
mod common;
mod layer;

pub use blur::*;
pub use common::*;
pub use layer::*;

use serde::{Deserialize, Serialize};

/// Complete pipeline settings. Layer order is compositing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSet {
    pub common: CommonConfig,
    pub layers: Vec<LayerConfig>,
}

impl DataSet {
    /// Scene layer of every configured glow layer, in order.
    pub fn scene_layers(&self) -> Vec<u32> {
        self.layers.iter().map(|l| l.scene_layer).collect()
    }

    /// Number of layers that take part in the composite this frame.
    pub fn enabled_count(&self) -> usize {
        self.layers.iter().filter(|l| l.enabled).count()
    }
}

// =============================================================================
// Tests
// =============================================================================
