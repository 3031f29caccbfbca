//! Blur stage interface.

use glow_common::TargetId;
use glow_config::BlurSettings;

use crate::host::Compositor;

/// Produces a blurred copy of `source` in `destination`.
///
/// Implementations may keep scratch targets between calls; they are freed
/// by [`BlurStage::dispose`]. Nothing but `destination` and the stage's own
/// scratch may be written.
pub trait BlurStage<C: Compositor + ?Sized> {
    fn render(
        &mut self,
        gpu: &mut C,
        source: TargetId,
        destination: TargetId,
        settings: &BlurSettings,
    );

    fn dispose(&mut self, gpu: &mut C);
}
