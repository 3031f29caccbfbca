//! Value types exchanged with the host engine.

use glow_common::{CameraId, Color, PhysicalSize};
use serde::{Deserialize, Serialize};

/// Pixel format of a render target. Glow targets are always half-float RGBA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetFormat {
    #[default]
    Rgba16Float,
}

/// Everything needed to allocate a render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub label: String,
    pub size: PhysicalSize,
    /// Depth buffer precision in bits; 0 means colour only.
    pub depth_bits: u32,
    pub format: TargetFormat,
}

impl TargetDescriptor {
    /// Colour-only target.
    pub fn color(label: impl Into<String>, size: PhysicalSize) -> Self {
        Self {
            label: label.into(),
            size,
            depth_bits: 0,
            format: TargetFormat::Rgba16Float,
        }
    }

    /// Colour target with a depth buffer of `depth_bits`.
    pub fn with_depth(label: impl Into<String>, size: PhysicalSize, depth_bits: u32) -> Self {
        Self {
            depth_bits,
            ..Self::color(label, size)
        }
    }

    /// Same size, depth and format as an existing target.
    pub fn like(label: impl Into<String>, info: &TargetInfo) -> Self {
        Self {
            label: label.into(),
            size: info.size,
            depth_bits: info.depth_bits,
            format: info.format,
        }
    }
}

/// What a compositor reports about a live target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub size: PhysicalSize,
    pub depth_bits: u32,
    pub format: TargetFormat,
}

impl From<&TargetDescriptor> for TargetInfo {
    fn from(desc: &TargetDescriptor) -> Self {
        Self {
            size: desc.size,
            depth_bits: desc.depth_bits,
            format: desc.format,
        }
    }
}

/// Passes of the shared glow material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderPass {
    Threshold = 0,
    Additive = 1,
    Overlay = 2,
}

impl ShaderPass {
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Bit set of scene layers a camera renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);

    /// Mask selecting exactly `layer`. Layers past the 32-bit range select
    /// nothing.
    pub fn single(layer: u32) -> Self {
        Self(1u32.checked_shl(layer).unwrap_or(0))
    }

    pub fn contains(self, layer: u32) -> bool {
        self.0 & Self::single(layer).0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearMode {
    /// Keep whatever the target already holds.
    Nothing,
    /// Clear to the camera's background colour.
    SolidColor,
}

/// Overrides applied to a camera after its settings were copied from
/// another camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSetup {
    pub layer_mask: LayerMask,
    pub clear: ClearMode,
    pub background: Color,
    /// `None` keeps the copied value.
    pub occlusion_culling: Option<bool>,
    /// Render order; higher renders later.
    pub depth: f32,
    /// Drop any tag (e.g. "main camera") copied from the source camera.
    pub untagged: bool,
    pub enabled: bool,
}

impl CameraSetup {
    /// Camera that only hosts the pipeline and renders nothing itself.
    pub fn host_only(depth: f32) -> Self {
        Self {
            layer_mask: LayerMask::NONE,
            clear: ClearMode::Nothing,
            background: Color::TRANSPARENT,
            occlusion_culling: Some(false),
            depth,
            untagged: true,
            enabled: true,
        }
    }

    /// Camera capturing a single scene layer onto a transparent target.
    pub fn capture(scene_layer: u32, depth: f32) -> Self {
        Self {
            layer_mask: LayerMask::single(scene_layer),
            clear: ClearMode::Nothing,
            background: Color::TRANSPARENT,
            occlusion_culling: None,
            depth,
            untagged: true,
            enabled: true,
        }
    }
}

/// Observable camera configuration used to detect drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub pixel_size: PhysicalSize,
    pub depth: f32,
}

/// A camera's identity plus its state at the moment of capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub id: CameraId,
    pub state: CameraState,
}
