//! Interface between the glow pipeline and the host engine.
//!
//! The host owns cameras, textures and shader execution. The pipeline only
//! talks to it through [`Compositor`] (render targets and full-screen
//! passes) and [`CameraRig`] (the scene's camera objects).

mod types;

pub use types::*;

use glow_common::{CameraId, Color, Rect, TargetId};

use crate::material::GlowMaterial;

/// Render-target storage and full-screen drawing.
pub trait Compositor {
    fn create_target(&mut self, desc: &TargetDescriptor) -> TargetId;

    /// Destroy a target. Unknown ids are ignored.
    fn destroy_target(&mut self, id: TargetId);

    /// `None` once the target has been destroyed.
    fn target_info(&self, id: TargetId) -> Option<TargetInfo>;

    /// Borrow a frame-local target; must be handed back with
    /// [`Compositor::release_temporary`].
    fn acquire_temporary(&mut self, desc: &TargetDescriptor) -> TargetId;

    fn release_temporary(&mut self, id: TargetId);

    fn clear(&mut self, target: TargetId, color: Color);

    /// Plain copy of `source` over `destination`.
    fn blit(&mut self, source: TargetId, destination: TargetId);

    /// Full-screen pass of `material` reading `source` into `destination`.
    fn blit_pass(
        &mut self,
        source: TargetId,
        destination: TargetId,
        material: &GlowMaterial,
        pass: ShaderPass,
    );

    /// Draw `source` into the pixel rectangle `rect` of `destination`.
    fn draw_inset(
        &mut self,
        source: TargetId,
        destination: TargetId,
        rect: Rect,
        material: &GlowMaterial,
        pass: ShaderPass,
    );
}

/// The host's camera objects.
pub trait CameraRig {
    /// The scene's designated main camera, if any.
    fn main_camera(&self) -> Option<CameraId>;

    /// `None` once the camera has been destroyed.
    fn camera_state(&self, id: CameraId) -> Option<CameraState>;

    /// Create a camera owned by the pipeline. It is never saved with the
    /// scene.
    fn spawn_camera(&mut self, name: &str) -> CameraId;

    fn destroy_camera(&mut self, id: CameraId);

    /// Copy every visual setting of `from` onto `to`, target included.
    fn copy_camera_settings(&mut self, from: CameraId, to: CameraId);

    fn apply_camera_setup(&mut self, id: CameraId, setup: &CameraSetup);

    fn target_texture(&self, id: CameraId) -> Option<TargetId>;

    fn set_target_texture(&mut self, id: CameraId, target: Option<TargetId>);

    /// Render colour into `color` while depth-testing against `depth`.
    fn set_target_buffers(&mut self, id: CameraId, color: TargetId, depth: TargetId);

    /// Parent `child` to `parent` with an identity local transform.
    fn attach_to(&mut self, child: CameraId, parent: CameraId);
}

/// A full host: targets, passes and cameras.
pub trait Host: Compositor + CameraRig {}

impl<T: Compositor + CameraRig> Host for T {}
