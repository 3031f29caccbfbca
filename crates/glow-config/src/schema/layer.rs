//! Per-layer glow settings.

use serde::{Deserialize, Serialize};

use super::blur::BlurSettings;

/// How the threshold pass measures a pixel's brightness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// No thresholding; the capture is scaled by intensity only.
    #[default]
    None,
    /// Mean of the RGB channels.
    LumAverage,
    /// Brightest RGB channel.
    LumValue,
    /// HSV saturation: `(max - min) / max` over the RGB channels, zero for black.
    LumSaturate,
}

/// How capture alpha feeds into the glow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMode {
    #[default]
    None,
    /// Scale the thresholded colour by the capture's alpha.
    AlphaThrottle,
}

/// One glow layer: which scene layer to capture and how to treat it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub enabled: bool,
    pub blur: BlurSettings,
    /// Scene layer the capture camera renders (valid range: 0-31).
    pub scene_layer: u32,
    /// Glow brightness multiplier (valid range: 0.0-64.0).
    pub intensity: f32,
    /// Brightness cut-off (valid range: 0.0-1.0).
    pub threshold: f32,
    pub threshold_mode: ThresholdMode,
    pub alpha_mode: AlphaMode,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blur: BlurSettings::default(),
            scene_layer: 0,
            intensity: 3.0,
            threshold: 0.6,
            threshold_mode: ThresholdMode::None,
            alpha_mode: AlphaMode::None,
        }
    }
}

impl LayerConfig {
    /// A default layer capturing `scene_layer`.
    pub fn on_layer(scene_layer: u32) -> Self {
        Self {
            scene_layer,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_defaults() {
        let layer = LayerConfig::default();
        assert!(layer.enabled);
        assert_eq!(layer.scene_layer, 0);
        assert!((layer.intensity - 3.0).abs() < f32::EPSILON);
        assert!((layer.threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(layer.threshold_mode, ThresholdMode::None);
        assert_eq!(layer.alpha_mode, AlphaMode::None);
    }

    #[test]
    fn modes_use_snake_case() {
        let toml_str = r#"
threshold_mode = "lum_saturate"
alpha_mode = "alpha_throttle"
"#;
        let layer: LayerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(layer.threshold_mode, ThresholdMode::LumSaturate);
        assert_eq!(layer.alpha_mode, AlphaMode::AlphaThrottle);
        assert!(layer.enabled); // default preserved
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result: Result<LayerConfig, _> = toml::from_str(r#"threshold_mode = "lum_max""#);
        assert!(result.is_err());
    }

    #[test]
    fn on_layer_keeps_other_defaults() {
        let layer = LayerConfig::on_layer(9);
        assert_eq!(layer.scene_layer, 9);
        assert!((layer.intensity - 3.0).abs() < f32::EPSILON);
    }
}
