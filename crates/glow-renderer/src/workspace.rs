//! Per-layer resource bundle.
//!
//! A [`Workspace`] owns the capture camera that renders one scene layer,
//! the target it renders into, and the threshold and blurred targets
//! derived from it. Nothing else destroys or resizes these resources.

use glow_common::{CameraId, Color, PhysicalSize, TargetId};
use glow_config::{LayerConfig, OverlayMode};
use tracing::debug;

use crate::blur::BlurStage;
use crate::host::{CameraRig, Compositor, Host, ShaderPass, TargetDescriptor};
use crate::material::GlowMaterial;
use crate::target;

#[derive(Debug, Default)]
pub struct Workspace {
    capture_camera: Option<CameraId>,
    capture: Option<TargetId>,
    threshold: Option<TargetId>,
    blurred: Option<TargetId>,
}

impl Workspace {
    /// New workspace with a freshly spawned capture camera and no targets.
    pub fn spawn<R: CameraRig + ?Sized>(rig: &mut R, index: usize) -> Self {
        let camera = rig.spawn_camera(&format!("Glow camera {index}"));
        debug!(index, %camera, "spawned capture camera");
        Self {
            capture_camera: Some(camera),
            ..Self::default()
        }
    }

    pub fn capture_camera(&self) -> Option<CameraId> {
        self.capture_camera
    }

    /// Whether the capture camera still exists on the host. Hosts may
    /// destroy it along with its parent.
    pub fn is_alive<R: CameraRig + ?Sized>(&self, rig: &R) -> bool {
        self.capture_camera
            .is_some_and(|camera| rig.camera_state(camera).is_some())
    }

    pub fn capture(&self) -> Option<TargetId> {
        self.capture
    }

    pub fn threshold(&self) -> Option<TargetId> {
        self.threshold
    }

    pub fn blurred(&self) -> Option<TargetId> {
        self.blurred
    }

    /// The intermediate buffer the debug overlay shows for `mode`.
    pub fn buffer(&self, mode: OverlayMode) -> Option<TargetId> {
        match mode {
            OverlayMode::None => None,
            OverlayMode::Glow => self.capture,
            OverlayMode::Threshold => self.threshold,
            OverlayMode::Blurred => self.blurred,
        }
    }

    /// Every target this workspace currently owns.
    pub fn owned_targets(&self) -> Vec<TargetId> {
        [self.capture, self.threshold, self.blurred]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Make sure the capture target is `size`, detaching the capture camera
    /// before the old target goes away.
    pub fn ensure_capture<H: Host + ?Sized>(&mut self, host: &mut H, size: PhysicalSize) -> TargetId {
        if let Some(id) = self.capture {
            if !target::needs_resize(host, Some(id), size) {
                return id;
            }
        }
        if let Some(camera) = self.capture_camera {
            host.set_target_texture(camera, None);
        }
        target::resize(
            host,
            &mut self.capture,
            &TargetDescriptor::color("Glow capture", size),
        )
    }

    /// Match the threshold and blurred targets to the capture target.
    /// Returns false when there is no capture target to match.
    pub fn ensure_intermediates<C: Compositor + ?Sized>(&mut self, gpu: &mut C) -> bool {
        let Some(capture) = self.capture.filter(|id| gpu.target_info(*id).is_some()) else {
            return false;
        };
        if target::needs_resize_like(gpu, self.threshold, capture) {
            target::resize_like(gpu, &mut self.threshold, capture, "Glow threshold");
        }
        if target::needs_resize_like(gpu, self.blurred, capture) {
            target::resize_like(gpu, &mut self.blurred, capture, "Glow blurred");
        }
        true
    }

    /// Threshold the capture into the threshold target, then blur it into
    /// the blurred target. Returns the blurred target.
    ///
    /// Overwrites `material`'s parameters and keywords.
    pub fn update_blur_texture<C, B>(
        &mut self,
        gpu: &mut C,
        layer: &LayerConfig,
        blur: &mut B,
        material: &mut GlowMaterial,
    ) -> Option<TargetId>
    where
        C: Compositor + ?Sized,
        B: BlurStage<C> + ?Sized,
    {
        if !self.ensure_intermediates(gpu) {
            return None;
        }
        let (capture, threshold, blurred) = (self.capture?, self.threshold?, self.blurred?);

        material.apply_layer(layer);
        gpu.blit_pass(capture, threshold, material, ShaderPass::Threshold);
        blur.render(gpu, threshold, blurred, &layer.blur);
        Some(blurred)
    }

    /// Clear the capture target to transparent ahead of capture; the
    /// capture camera itself never clears.
    pub fn clear_capture<C: Compositor + ?Sized>(&self, gpu: &mut C) {
        if let Some(capture) = self.capture {
            gpu.clear(capture, Color::TRANSPARENT);
        }
    }

    /// Release the camera and all targets. Safe on a partially built
    /// workspace and safe to repeat.
    pub fn dispose<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(camera) = self.capture_camera.take() {
            if host.camera_state(camera).is_some() {
                host.set_target_texture(camera, None);
                host.destroy_camera(camera);
            }
        }
        target::release(host, &mut self.capture);
        target::release(host, &mut self.threshold);
        target::release(host, &mut self.blurred);
    }
}
