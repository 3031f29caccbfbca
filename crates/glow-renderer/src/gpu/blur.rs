//! Separable Gaussian blur on the wgpu compositor.
//!
//! Each iteration runs a horizontal pass into a scratch target and a
//! vertical pass back into the destination. The scratch target is
//! `downsample` times smaller than the source and lives until `dispose`.

use glow_common::{PhysicalSize, TargetId};
use glow_config::BlurSettings;
use tracing::warn;

use super::compositor::{BlurAxis, WgpuCompositor};
use crate::blur::BlurStage;
use crate::host::{Compositor, TargetDescriptor};
use crate::target;

#[derive(Debug, Default)]
pub struct GaussianBlur {
    scratch: Option<TargetId>,
}

impl GaussianBlur {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Size of the scratch target for a `source`-sized input.
pub fn scratch_size(source: PhysicalSize, downsample: u32) -> PhysicalSize {
    let d = downsample.max(1);
    PhysicalSize::new((source.width / d).max(1), (source.height / d).max(1))
}

impl BlurStage<WgpuCompositor> for GaussianBlur {
    fn render(
        &mut self,
        gpu: &mut WgpuCompositor,
        source: TargetId,
        destination: TargetId,
        settings: &BlurSettings,
    ) {
        let Some(info) = gpu.target_info(source) else {
            warn!(%source, "blur skipped: unknown source");
            return;
        };
        let size = scratch_size(info.size, settings.downsample);
        if target::needs_resize(gpu, self.scratch, size) {
            target::resize(
                gpu,
                &mut self.scratch,
                &TargetDescriptor::color("Glow blur scratch", size),
            );
        }
        let Some(scratch) = self.scratch else {
            return;
        };

        let mut input = source;
        for _ in 0..settings.iterations.max(1) {
            gpu.blur_pass(input, scratch, BlurAxis::Horizontal, settings.spread);
            gpu.blur_pass(scratch, destination, BlurAxis::Vertical, settings.spread);
            input = destination;
        }
    }

    fn dispose(&mut self, gpu: &mut WgpuCompositor) {
        target::release(gpu, &mut self.scratch);
    }
}
