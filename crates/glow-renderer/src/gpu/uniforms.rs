//! Uniform block shared by the glow and blur shaders.

use crate::material::{GlowMaterial, ShaderKeyword};

/// GPU-side uniforms matching the WGSL `GlowUniforms` struct.
///
/// Layout: 12 × 4 bytes = 48 bytes, 16-byte aligned.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlowUniforms {
    /// Cut-off and inverse range, see [`crate::material::threshold_vector`].
    pub threshold: [f32; 4],
    pub intensity: f32,
    /// 0 = none, 1 = average, 2 = value, 3 = saturate.
    pub threshold_mode: u32,
    /// Non-zero weights colour by alpha.
    pub alpha_throttle: u32,
    /// Non-zero samples the source upside down.
    pub flip_y: u32,
    /// 1 / width, 1 / height of the source.
    pub texel_size: [f32; 2],
    /// Blur tap distance in texels.
    pub spread: f32,
    pub _padding: f32,
}

impl Default for GlowUniforms {
    fn default() -> Self {
        Self {
            threshold: [0.0, 1.0, 0.0, 0.0],
            intensity: 1.0,
            threshold_mode: 0,
            alpha_throttle: 0,
            flip_y: 0,
            texel_size: [1.0, 1.0],
            spread: 1.0,
            _padding: 0.0,
        }
    }
}

impl GlowUniforms {
    pub fn from_material(material: &GlowMaterial) -> Self {
        let threshold_mode = if material.is_enabled(ShaderKeyword::LumAverage) {
            1
        } else if material.is_enabled(ShaderKeyword::LumValue) {
            2
        } else if material.is_enabled(ShaderKeyword::LumSaturate) {
            3
        } else {
            0
        };
        Self {
            threshold: material.threshold(),
            intensity: material.intensity(),
            threshold_mode,
            alpha_throttle: material.is_enabled(ShaderKeyword::AlphaThrottle) as u32,
            ..Self::default()
        }
    }

    /// Uniforms for one blur pass reading a `width` × `height` source.
    pub fn blur(width: u32, height: u32, spread: f32) -> Self {
        Self {
            texel_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            spread,
            ..Self::default()
        }
    }

    pub fn flipped(mut self, flip: bool) -> Self {
        self.flip_y = flip as u32;
        self
    }
}
