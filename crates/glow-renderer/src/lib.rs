//! Layered glow compositing.
//!
//! [`GlowCamera`] isolates objects on selected scene layers, thresholds
//! and blurs them, and adds the result over the main camera's image. The
//! host engine is reached only through the [`host`] traits; [`recording`]
//! implements them in memory and [`gpu`] on top of wgpu.

pub mod blur;
pub mod glow_camera;
pub mod gpu;
pub mod host;
pub mod material;
pub mod recording;
pub mod target;
pub mod validity;
pub mod workspace;

pub use blur::BlurStage;
pub use glow_camera::{FrameOutcome, GlowCamera};
pub use gpu::{GaussianBlur, GpuContext, WgpuCompositor};
pub use host::{CameraRig, Compositor, Host, ShaderPass};
pub use material::GlowMaterial;
pub use recording::{HostOp, RecordingBlur, RecordingHost};
pub use validity::{Validation, Validator, Validity};
pub use workspace::Workspace;
