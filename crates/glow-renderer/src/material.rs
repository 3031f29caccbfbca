//! The shared glow material.
//!
//! One [`GlowMaterial`] serves every layer in a frame. Each layer's pass
//! overwrites its parameters and keywords before drawing, so it is lent out
//! by `&mut` to one pass at a time and is not re-entrant.

use glow_config::{AlphaMode, LayerConfig, ThresholdMode};
use serde::{Deserialize, Serialize};

/// Lower bound on `1 - threshold` before inversion.
pub const MIN_THRESHOLD_RANGE: f32 = 0.1;

/// Shader variant switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderKeyword {
    LumAverage,
    LumValue,
    LumSaturate,
    AlphaThrottle,
}

impl ShaderKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderKeyword::LumAverage => "LUM_AVERAGE",
            ShaderKeyword::LumValue => "LUM_VALUE",
            ShaderKeyword::LumSaturate => "LUM_SATURATE",
            ShaderKeyword::AlphaThrottle => "ALPHA_THROTTLE",
        }
    }

    pub fn for_threshold(mode: ThresholdMode) -> Option<Self> {
        match mode {
            ThresholdMode::None => None,
            ThresholdMode::LumAverage => Some(ShaderKeyword::LumAverage),
            ThresholdMode::LumValue => Some(ShaderKeyword::LumValue),
            ThresholdMode::LumSaturate => Some(ShaderKeyword::LumSaturate),
        }
    }

    pub fn for_alpha(mode: AlphaMode) -> Option<Self> {
        match mode {
            AlphaMode::None => None,
            AlphaMode::AlphaThrottle => Some(ShaderKeyword::AlphaThrottle),
        }
    }
}

/// `(t, 1 / clamp(1 - t, 0.1, 1), 0, 0)`: the cut-off and the factor that
/// rescales the range above it to `0..=1`.
pub fn threshold_vector(threshold: f32) -> [f32; 4] {
    let range = (1.0 - threshold).clamp(MIN_THRESHOLD_RANGE, 1.0);
    [threshold, 1.0 / range, 0.0, 0.0]
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlowMaterial {
    intensity: f32,
    threshold: [f32; 4],
    keywords: Vec<ShaderKeyword>,
}

impl Default for GlowMaterial {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            threshold: threshold_vector(0.0),
            keywords: Vec::new(),
        }
    }
}

impl GlowMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn threshold(&self) -> [f32; 4] {
        self.threshold
    }

    pub fn keywords(&self) -> &[ShaderKeyword] {
        &self.keywords
    }

    pub fn is_enabled(&self, keyword: ShaderKeyword) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold_vector(threshold);
    }

    pub fn clear_keywords(&mut self) {
        self.keywords.clear();
    }

    pub fn enable_keyword(&mut self, keyword: ShaderKeyword) {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
    }

    /// Load one layer's parameters. Keywords left over from the previous
    /// layer are dropped first.
    pub fn apply_layer(&mut self, layer: &LayerConfig) {
        self.set_intensity(layer.intensity);
        self.set_threshold(layer.threshold);
        self.clear_keywords();
        if let Some(kw) = ShaderKeyword::for_threshold(layer.threshold_mode) {
            self.enable_keyword(kw);
        }
        if let Some(kw) = ShaderKeyword::for_alpha(layer.alpha_mode) {
            self.enable_keyword(kw);
        }
    }
}
