//! The glow pipeline orchestrator.
//!
//! [`GlowCamera`] sits on a host camera and layers glow over the main
//! camera's image. Derived resources (main capture target, per-layer
//! workspaces, camera wiring) are rebuilt lazily: configuration changes
//! only invalidate, and the next [`GlowCamera::on_update`] or
//! [`GlowCamera::on_frame`] checkpoint rebuilds once.
//!
//! Hosts drive it through the lifecycle callbacks in this order:
//! `on_start`, then per frame `on_update`, `on_before_capture`,
//! `on_frame`, and finally `on_stop` to release everything.

mod frame;
mod state;

#[cfg(test)]
mod tests;

pub use frame::{overlay_rect, FrameOutcome, OVERLAY_GAP};
pub use state::MAIN_TARGET_LABEL;

use glow_common::{CameraId, EventBus, GlowEvent, TargetId};
use glow_config::DataSet;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::blur::BlurStage;
use crate::host::Host;
use crate::material::GlowMaterial;
use crate::validity::{Validation, Validator};
use crate::workspace::Workspace;

use state::{PipelineState, Revalidation};

pub struct GlowCamera<B> {
    validator: Validator,
    state: PipelineState<B>,
}

impl<B> GlowCamera<B> {
    /// Pipeline hosted on `attached`, blurring with `blur`. Starts with an
    /// empty dataset and nothing allocated.
    pub fn new(attached: CameraId, blur: B) -> Self {
        Self {
            validator: Validator::new(),
            state: PipelineState::new(attached, blur),
        }
    }

    pub fn with_dataset(mut self, dataset: DataSet) -> Self {
        self.set_dataset(dataset);
        self
    }

    /// Use `camera` as the main camera instead of the host's designated
    /// one. Falls back to the host's choice once `camera` is destroyed.
    pub fn with_main_camera(mut self, camera: CameraId) -> Self {
        self.state.main_camera = Some(camera);
        self.validator.invalidate();
        self
    }

    pub fn attached_camera(&self) -> CameraId {
        self.state.attached
    }

    /// The main camera resolved at the last rebuild.
    pub fn main_camera(&self) -> Option<CameraId> {
        self.state.main_camera
    }

    pub fn main_target(&self) -> Option<TargetId> {
        self.state.main_target
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.state.workspaces
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn material(&self) -> &GlowMaterial {
        &self.state.material
    }

    pub fn blur(&self) -> &B {
        &self.state.blur
    }

    pub fn events(&self) -> &EventBus {
        &self.state.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GlowEvent> {
        self.state.events.subscribe()
    }

    /// Current settings, after bringing derived resources up to date.
    pub fn dataset<H: Host + ?Sized>(&mut self, host: &mut H) -> &DataSet {
        self.validate(host);
        &self.state.dataset
    }

    /// Replace the settings. Takes effect at the next checkpoint.
    pub fn set_dataset(&mut self, dataset: DataSet) {
        self.state.dataset = dataset;
        self.validator.invalidate();
    }

    /// Start of a session.
    pub fn on_start(&mut self) {
        debug!(attached = %self.state.attached, "glow camera started");
        self.validator.reset();
    }

    /// Settings were edited in place somewhere upstream.
    pub fn on_config_changed(&mut self) {
        self.validator.invalidate();
    }

    /// Per-frame checkpoint ahead of rendering.
    pub fn on_update<H: Host + ?Sized>(&mut self, host: &mut H) -> Validation {
        self.validate(host)
    }

    /// Clear every capture target; run before the capture cameras render.
    pub fn on_before_capture<H: Host + ?Sized>(&mut self, host: &mut H) {
        for ws in &self.state.workspaces {
            ws.clear_capture(host);
        }
    }

    /// Composite the glow layers over `source` into `destination`.
    pub fn on_frame<H>(
        &mut self,
        host: &mut H,
        source: TargetId,
        destination: TargetId,
    ) -> FrameOutcome
    where
        H: Host + ?Sized,
        B: BlurStage<H>,
    {
        self.validate(host);
        self.state.composite(host, source, destination)
    }

    /// End of a session: release every resource the pipeline owns.
    pub fn on_stop<H>(&mut self, host: &mut H)
    where
        H: Host + ?Sized,
        B: BlurStage<H>,
    {
        self.state.blur.dispose(host);
        self.state.teardown(host);
        self.validator.invalidate();
        debug!(attached = %self.state.attached, "glow camera stopped");
    }

    /// Validate, treating any drift since the last rebuild as an
    /// invalidation.
    fn validate<H: Host + ?Sized>(&mut self, host: &mut H) -> Validation {
        if self.validator.is_valid() && !self.state.is_valid(host) {
            debug!("camera configuration drifted");
            self.validator.invalidate();
        }
        self.validator.validate(&mut Revalidation::new(&mut self.state, host))
    }
}

impl<B> Drop for GlowCamera<B> {
    fn drop(&mut self) {
        if self.state.owns_resources() {
            warn!(
                attached = %self.state.attached,
                workspaces = self.state.workspaces.len(),
                "glow camera dropped while still owning resources; call on_stop first"
            );
        }
    }
}
