//! Render-target resize helpers.
//!
//! A target "needs resize" when it is missing, was destroyed behind our
//! back, or its width/height differ from the wanted size. Depth and format
//! are fixed per kind of target and never checked.

use glow_common::{PhysicalSize, TargetId};
use tracing::debug;

use crate::host::{Compositor, TargetDescriptor};

pub fn needs_resize<C: Compositor + ?Sized>(
    gpu: &C,
    target: Option<TargetId>,
    size: PhysicalSize,
) -> bool {
    match target.and_then(|id| gpu.target_info(id)) {
        Some(info) => info.size != size,
        None => true,
    }
}

/// [`needs_resize`] against another target's size. A missing reference
/// never asks for a resize.
pub fn needs_resize_like<C: Compositor + ?Sized>(
    gpu: &C,
    target: Option<TargetId>,
    reference: TargetId,
) -> bool {
    match gpu.target_info(reference) {
        Some(info) => needs_resize(gpu, target, info.size),
        None => false,
    }
}

/// Destroy whatever `slot` holds and allocate a fresh target in its place.
pub fn resize<C: Compositor + ?Sized>(
    gpu: &mut C,
    slot: &mut Option<TargetId>,
    desc: &TargetDescriptor,
) -> TargetId {
    if let Some(old) = slot.take() {
        gpu.destroy_target(old);
    }
    let id = gpu.create_target(desc);
    debug!(%id, size = %desc.size, label = %desc.label, "allocated render target");
    *slot = Some(id);
    id
}

/// [`resize`] to match `reference`'s size, depth and format.
pub fn resize_like<C: Compositor + ?Sized>(
    gpu: &mut C,
    slot: &mut Option<TargetId>,
    reference: TargetId,
    label: &str,
) -> Option<TargetId> {
    let info = gpu.target_info(reference)?;
    Some(resize(gpu, slot, &TargetDescriptor::like(label, &info)))
}

/// Destroy the target in `slot`, if any, leaving it empty.
pub fn release<C: Compositor + ?Sized>(gpu: &mut C, slot: &mut Option<TargetId>) {
    if let Some(id) = slot.take() {
        gpu.destroy_target(id);
    }
}
