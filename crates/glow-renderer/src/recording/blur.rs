//! Blur stage that copies instead of blurring and remembers each call.

use glow_common::TargetId;
use glow_config::BlurSettings;

use crate::blur::BlurStage;
use crate::host::Compositor;

#[derive(Debug, Clone, PartialEq)]
pub struct BlurCall {
    pub source: TargetId,
    pub destination: TargetId,
    pub settings: BlurSettings,
}

#[derive(Debug, Default)]
pub struct RecordingBlur {
    calls: Vec<BlurCall>,
    disposals: usize,
}

impl RecordingBlur {
    pub fn calls(&self) -> &[BlurCall] {
        &self.calls
    }

    pub fn disposals(&self) -> usize {
        self.disposals
    }
}

impl<C: Compositor + ?Sized> BlurStage<C> for RecordingBlur {
    fn render(
        &mut self,
        gpu: &mut C,
        source: TargetId,
        destination: TargetId,
        settings: &BlurSettings,
    ) {
        self.calls.push(BlurCall {
            source,
            destination,
            settings: settings.clone(),
        });
        gpu.blit(source, destination);
    }

    fn dispose(&mut self, _gpu: &mut C) {
        self.disposals += 1;
    }
}
