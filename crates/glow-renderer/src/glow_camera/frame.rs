use glow_common::{PhysicalSize, Rect, TargetId};
use glow_config::OverlayMode;
use tracing::{trace, warn};

use crate::blur::BlurStage;
use crate::host::{Host, ShaderPass, TargetDescriptor};

use super::state::PipelineState;

/// Pixels between the debug inset and the bottom-left frame corner.
pub const OVERLAY_GAP: f32 = 10.0;

/// What [`super::GlowCamera::on_frame`] drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Source copied to destination unchanged.
    PassThrough,
    Composited {
        /// Enabled layers blended over the base image.
        layers: usize,
        overlay: bool,
    },
}

/// Where the debug inset goes for a `source`-sized frame: `height`
/// fraction of the frame tall, source aspect, flipped vertically.
pub fn overlay_rect(source: PhysicalSize, height: f32) -> Rect {
    let h = height * source.height as f32;
    Rect {
        x: OVERLAY_GAP,
        y: OVERLAY_GAP + h,
        width: h * source.aspect(),
        height: -h,
    }
}

impl<B> PipelineState<B> {
    pub fn composite<H>(&mut self, host: &mut H, source: TargetId, destination: TargetId) -> FrameOutcome
    where
        H: Host + ?Sized,
        B: BlurStage<H>,
    {
        let main_alive = self
            .main_camera
            .is_some_and(|id| host.camera_state(id).is_some());
        let main_target = match self.main_target {
            Some(target) if main_alive && self.initialized => target,
            _ => {
                host.blit(source, destination);
                return FrameOutcome::PassThrough;
            }
        };

        host.blit(main_target, destination);

        let mut layers = 0;
        for (ws, layer) in self.workspaces.iter_mut().zip(&self.dataset.layers) {
            if !layer.enabled {
                continue;
            }
            let Some(blurred) =
                ws.update_blur_texture(host, layer, &mut self.blur, &mut self.material)
            else {
                continue;
            };
            host.blit_pass(blurred, destination, &self.material, ShaderPass::Additive);
            layers += 1;
        }

        let overlay = self.dataset.common.overlay_mode != OverlayMode::None
            && self.draw_overlay(host, source, destination);
        trace!(layers, overlay, "composited frame");
        FrameOutcome::Composited { layers, overlay }
    }

    /// Sum the selected buffer of every enabled layer into a temporary and
    /// inset it over `destination`.
    fn draw_overlay<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        source: TargetId,
        destination: TargetId,
    ) -> bool {
        let Some(info) = host.target_info(source) else {
            warn!(%source, "frame source is gone; skipping overlay");
            return false;
        };
        // Show each buffer as is, not scaled by the last layer's intensity.
        self.material.set_intensity(1.0);
        let common = &self.dataset.common;
        let scratch = host.acquire_temporary(&TargetDescriptor::like("Glow overlay", &info));
        host.clear(scratch, common.clear_color());

        for (ws, layer) in self.workspaces.iter().zip(&self.dataset.layers) {
            if !layer.enabled {
                continue;
            }
            if let Some(buffer) = ws.buffer(common.overlay_mode) {
                host.blit_pass(buffer, scratch, &self.material, ShaderPass::Additive);
            }
        }

        let rect = overlay_rect(info.size, common.overlay_height);
        host.draw_inset(scratch, destination, rect, &self.material, ShaderPass::Overlay);
        host.release_temporary(scratch);
        true
    }
}
