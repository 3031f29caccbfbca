use glow_common::{CameraId, EventBus, GlowEvent, TargetId};
use glow_config::DataSet;
use tracing::{debug, warn};

use crate::host::{CameraRig, CameraSetup, CameraSnapshot, Host, TargetDescriptor};
use crate::material::GlowMaterial;
use crate::target;
use crate::validity::Revalidate;
use crate::workspace::Workspace;

pub const MAIN_TARGET_LABEL: &str = "Main texture (Generated)";

const MAIN_DEPTH_BITS: u32 = 24;
/// Capture cameras render right after the main camera.
const CAPTURE_DEPTH_OFFSET: f32 = 1.0;
/// The attached camera composites after every capture camera.
const ATTACHED_DEPTH_OFFSET: f32 = 2.0;

/// What the last successful rebuild saw.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct ValidityRecord {
    pub attached: Option<CameraSnapshot>,
    pub main: Option<CameraSnapshot>,
    pub scene_layers: Vec<u32>,
}

pub(super) struct PipelineState<B> {
    pub attached: CameraId,
    pub main_camera: Option<CameraId>,
    /// The camera whose output currently goes to the main target.
    pub redirected: Option<CameraId>,
    pub dataset: DataSet,
    pub workspaces: Vec<Workspace>,
    pub main_target: Option<TargetId>,
    pub material: GlowMaterial,
    pub blur: B,
    pub initialized: bool,
    pub record: ValidityRecord,
    pub events: EventBus,
    missing_main_reported: bool,
}

impl<B> PipelineState<B> {
    pub fn new(attached: CameraId, blur: B) -> Self {
        Self {
            attached,
            main_camera: None,
            redirected: None,
            dataset: DataSet::default(),
            workspaces: Vec::new(),
            main_target: None,
            material: GlowMaterial::new(),
            blur,
            initialized: false,
            record: ValidityRecord::default(),
            events: EventBus::default(),
            missing_main_reported: false,
        }
    }

    pub fn owns_resources(&self) -> bool {
        self.main_target.is_some() || !self.workspaces.is_empty()
    }

    /// The configured main camera while it is alive, otherwise whatever
    /// the host designates.
    fn peek_main_camera<H: CameraRig + ?Sized>(&self, host: &H) -> Option<CameraId> {
        self.main_camera
            .filter(|id| host.camera_state(*id).is_some())
            .or_else(|| host.main_camera())
            .filter(|id| host.camera_state(*id).is_some())
    }

    fn snapshot<H: CameraRig + ?Sized>(host: &H, id: CameraId) -> Option<CameraSnapshot> {
        host.camera_state(id).map(|state| CameraSnapshot { id, state })
    }

    pub fn is_valid<H: Host + ?Sized>(&self, host: &H) -> bool {
        let attached_ok = self.record.attached.is_some()
            && Self::snapshot(host, self.attached) == self.record.attached;
        let main_ok = match self.peek_main_camera(host) {
            Some(main) => {
                self.record.main.is_some() && Self::snapshot(host, main) == self.record.main
            }
            None => false,
        };
        attached_ok
            && main_ok
            && self.initialized
            && self.workspaces.iter().all(|ws| ws.is_alive(host))
            && self.record.scene_layers == self.dataset.scene_layers()
    }

    /// Point `camera`'s output at `target` and announce it.
    fn redirect_main_output<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        camera: CameraId,
        target: Option<TargetId>,
    ) {
        host.set_target_texture(camera, target);
        self.redirected = target.map(|_| camera);
        self.events.publish(GlowEvent::MainTargetChanged(target));
    }

    /// Drop every camera reference to the main target.
    fn detach_main_target<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(camera) = self.redirected {
            if host.camera_state(camera).is_some() {
                self.redirect_main_output(host, camera, None);
            } else {
                self.redirected = None;
            }
        }
        for ws in &self.workspaces {
            if let Some(camera) = ws
                .capture_camera()
                .filter(|camera| host.camera_state(*camera).is_some())
            {
                host.set_target_texture(camera, None);
            }
        }
    }

    pub fn rebuild<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.initialized = false;

        let Some(main) = self.peek_main_camera(host) else {
            if !self.missing_main_reported {
                warn!("no main camera; passing frames through until one appears");
                self.missing_main_reported = true;
            }
            self.main_camera = None;
            return;
        };
        self.missing_main_reported = false;
        self.main_camera = Some(main);

        // A different camera may still be drawing into our target.
        if self.redirected.is_some_and(|c| c != main) {
            self.detach_main_target(host);
        }
        let Some(main_depth) = host.camera_state(main).map(|s| s.depth) else {
            return;
        };

        let own_target = host.target_texture(self.attached);
        host.copy_camera_settings(main, self.attached);
        host.set_target_texture(self.attached, own_target);
        host.apply_camera_setup(
            self.attached,
            &CameraSetup::host_only(main_depth + ATTACHED_DEPTH_OFFSET),
        );
        let Some(size) = host.camera_state(self.attached).map(|s| s.pixel_size) else {
            warn!(attached = %self.attached, "attached camera is gone");
            return;
        };

        if target::needs_resize(host, self.main_target, size) {
            self.detach_main_target(host);
            let desc = TargetDescriptor::with_depth(MAIN_TARGET_LABEL, size, MAIN_DEPTH_BITS);
            target::resize(host, &mut self.main_target, &desc);
        }
        let Some(main_target) = self.main_target else {
            return;
        };
        self.redirect_main_output(host, main, Some(main_target));

        self.resize_workspaces(host);
        for (ws, layer) in self.workspaces.iter_mut().zip(&self.dataset.layers) {
            let Some(camera) = ws.capture_camera() else {
                continue;
            };
            let capture = ws.ensure_capture(host, size);
            host.copy_camera_settings(main, camera);
            host.attach_to(camera, main);
            host.apply_camera_setup(
                camera,
                &CameraSetup::capture(layer.scene_layer, main_depth + CAPTURE_DEPTH_OFFSET),
            );
            host.set_target_texture(camera, Some(capture));
            host.set_target_buffers(camera, capture, main_target);
            ws.ensure_intermediates(host);
        }

        self.initialized = true;
        self.record = ValidityRecord {
            attached: Self::snapshot(host, self.attached),
            main: Self::snapshot(host, main),
            scene_layers: self.dataset.scene_layers(),
        };
        let layers = self.workspaces.len();
        debug!(%main, %size, layers, "rebuilt glow pipeline");
        self.events.publish(GlowEvent::Rebuilt { layers });
    }

    /// Match the workspace array to the layer list: dispose from the tail,
    /// append fresh workspaces. Survivors are left alone unless the host
    /// destroyed their capture camera, in which case they are respawned.
    fn resize_workspaces<H: Host + ?Sized>(&mut self, host: &mut H) {
        let wanted = self.dataset.layers.len();
        if self.workspaces.len() > wanted {
            for mut ws in self.workspaces.drain(wanted..) {
                ws.dispose(host);
            }
        }
        for (index, ws) in self.workspaces.iter_mut().enumerate() {
            if !ws.is_alive(&*host) {
                warn!(index, "capture camera is gone; respawning workspace");
                ws.dispose(host);
                *ws = Workspace::spawn(host, index);
            }
        }
        while self.workspaces.len() < wanted {
            let index = self.workspaces.len();
            self.workspaces.push(Workspace::spawn(host, index));
        }
    }

    /// Release workspaces and the main target.
    pub fn teardown<H: Host + ?Sized>(&mut self, host: &mut H) {
        for mut ws in self.workspaces.drain(..) {
            ws.dispose(host);
        }
        self.detach_main_target(host);
        target::release(host, &mut self.main_target);
        self.initialized = false;
        self.record = ValidityRecord::default();
    }
}

/// Binds the pipeline state to a host for one validation.
pub(super) struct Revalidation<'a, H: ?Sized, B> {
    state: &'a mut PipelineState<B>,
    host: &'a mut H,
}

impl<'a, H: ?Sized, B> Revalidation<'a, H, B> {
    pub fn new(state: &'a mut PipelineState<B>, host: &'a mut H) -> Self {
        Self { state, host }
    }
}

impl<H: Host + ?Sized, B> Revalidate for Revalidation<'_, H, B> {
    fn is_valid(&mut self) -> bool {
        self.state.is_valid(&*self.host)
    }

    fn rebuild(&mut self) {
        self.state.rebuild(&mut *self.host)
    }
}
