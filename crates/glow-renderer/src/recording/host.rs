//! In-memory host that records every call.

use std::collections::BTreeMap;
use std::fmt;

use glow_common::{CameraId, Color, IdSequence, PhysicalSize, Rect, TargetId};

use crate::host::{
    CameraRig, CameraSetup, CameraState, Compositor, ShaderPass, TargetDescriptor, TargetInfo,
};
use crate::material::{GlowMaterial, ShaderKeyword};

/// One recorded host call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    CreateTarget {
        id: TargetId,
        label: String,
        size: PhysicalSize,
    },
    DestroyTarget(TargetId),
    AcquireTemporary {
        id: TargetId,
        size: PhysicalSize,
    },
    ReleaseTemporary(TargetId),
    Clear {
        target: TargetId,
        color: Color,
    },
    Blit {
        source: TargetId,
        destination: TargetId,
    },
    BlitPass {
        source: TargetId,
        destination: TargetId,
        pass: ShaderPass,
        intensity: f32,
        threshold: [f32; 4],
        keywords: Vec<ShaderKeyword>,
    },
    DrawInset {
        source: TargetId,
        destination: TargetId,
        rect: Rect,
        pass: ShaderPass,
    },
    SpawnCamera {
        id: CameraId,
        name: String,
    },
    DestroyCamera(CameraId),
    CopyCameraSettings {
        from: CameraId,
        to: CameraId,
    },
    ApplyCameraSetup {
        id: CameraId,
        setup: CameraSetup,
    },
    SetTargetTexture {
        camera: CameraId,
        target: Option<TargetId>,
    },
    SetTargetBuffers {
        camera: CameraId,
        color: TargetId,
        depth: TargetId,
    },
    AttachCamera {
        child: CameraId,
        parent: CameraId,
    },
}

impl HostOp {
    /// Whether this op draws into `target`.
    pub fn writes(&self, target: TargetId) -> bool {
        match self {
            HostOp::Clear { target: t, .. } => *t == target,
            HostOp::Blit { destination, .. }
            | HostOp::BlitPass { destination, .. }
            | HostOp::DrawInset { destination, .. } => *destination == target,
            _ => false,
        }
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOp::CreateTarget { id, label, size } => write!(f, "create {id} {size} \"{label}\""),
            HostOp::DestroyTarget(id) => write!(f, "destroy {id}"),
            HostOp::AcquireTemporary { id, size } => write!(f, "acquire temporary {id} {size}"),
            HostOp::ReleaseTemporary(id) => write!(f, "release temporary {id}"),
            HostOp::Clear { target, color } => write!(f, "clear {target} {}", color.to_hex()),
            HostOp::Blit {
                source,
                destination,
            } => write!(f, "blit {source} -> {destination}"),
            HostOp::BlitPass {
                source,
                destination,
                pass,
                keywords,
                ..
            } => {
                write!(f, "blit {source} -> {destination} [{pass:?}]")?;
                if !keywords.is_empty() {
                    let names: Vec<&str> = keywords.iter().map(|k| k.as_str()).collect();
                    write!(f, " {}", names.join(" "))?;
                }
                Ok(())
            }
            HostOp::DrawInset {
                source,
                destination,
                rect,
                pass,
            } => write!(
                f,
                "inset {source} -> {destination} at ({:.0}, {:.0}) {:.0}x{:.0} [{pass:?}]",
                rect.x, rect.y, rect.width, rect.height
            ),
            HostOp::SpawnCamera { id, name } => write!(f, "spawn {id} \"{name}\""),
            HostOp::DestroyCamera(id) => write!(f, "destroy {id}"),
            HostOp::CopyCameraSettings { from, to } => write!(f, "copy {from} -> {to}"),
            HostOp::ApplyCameraSetup { id, setup } => write!(
                f,
                "setup {id} mask={:#x} depth={}",
                setup.layer_mask.0, setup.depth
            ),
            HostOp::SetTargetTexture { camera, target } => match target {
                Some(t) => write!(f, "target {camera} = {t}"),
                None => write!(f, "target {camera} = none"),
            },
            HostOp::SetTargetBuffers {
                camera,
                color,
                depth,
            } => write!(f, "buffers {camera} color={color} depth={depth}"),
            HostOp::AttachCamera { child, parent } => write!(f, "attach {child} to {parent}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedTarget {
    pub label: String,
    pub info: TargetInfo,
    pub temporary: bool,
}

#[derive(Debug, Clone)]
pub struct RecordedCamera {
    pub name: String,
    pub depth: f32,
    pub target: Option<TargetId>,
    pub depth_buffer: Option<TargetId>,
    pub setup: Option<CameraSetup>,
    pub parent: Option<CameraId>,
    /// Spawned through [`CameraRig::spawn_camera`] rather than part of the
    /// scene.
    pub spawned: bool,
}

/// A [`Compositor`] + [`CameraRig`] that keeps everything in memory.
///
/// Ids come from one monotonic sequence and are never reused. Destroying
/// or releasing something that is not alive is counted in
/// [`RecordingHost::invalid_destroys`].
#[derive(Debug)]
pub struct RecordingHost {
    ids: IdSequence,
    screen: PhysicalSize,
    targets: BTreeMap<TargetId, RecordedTarget>,
    cameras: BTreeMap<CameraId, RecordedCamera>,
    main_camera: Option<CameraId>,
    ops: Vec<HostOp>,
    invalid_destroys: usize,
}

impl RecordingHost {
    pub fn new(screen: PhysicalSize) -> Self {
        Self {
            ids: IdSequence::starting_at(1),
            screen,
            targets: BTreeMap::new(),
            cameras: BTreeMap::new(),
            main_camera: None,
            ops: Vec::new(),
            invalid_destroys: 0,
        }
    }

    /// A host whose scene already has a main camera at depth 0.
    pub fn with_main_camera(screen: PhysicalSize) -> (Self, CameraId) {
        let mut host = Self::new(screen);
        let main = host.add_camera("Main Camera", 0.0);
        host.set_main_camera(Some(main));
        (host, main)
    }

    /// Add a scene camera. Not recorded as an op.
    pub fn add_camera(&mut self, name: &str, depth: f32) -> CameraId {
        let id = self.ids.next_camera();
        self.cameras.insert(
            id,
            RecordedCamera {
                name: name.to_string(),
                depth,
                target: None,
                depth_buffer: None,
                setup: None,
                parent: None,
                spawned: false,
            },
        );
        id
    }

    pub fn set_main_camera(&mut self, camera: Option<CameraId>) {
        self.main_camera = camera;
    }

    /// Destroy a camera from outside the pipeline, children included. Not
    /// recorded as an op.
    pub fn remove_camera(&mut self, id: CameraId) {
        if self.cameras.remove(&id).is_none() {
            return;
        }
        if self.main_camera == Some(id) {
            self.main_camera = None;
        }
        let children: Vec<CameraId> = self
            .cameras
            .iter()
            .filter(|(_, camera)| camera.parent == Some(id))
            .map(|(child, _)| *child)
            .collect();
        for child in children {
            self.remove_camera(child);
        }
    }

    pub fn screen_size(&self) -> PhysicalSize {
        self.screen
    }

    /// Resize the screen; cameras without a target follow it.
    pub fn set_screen_size(&mut self, size: PhysicalSize) {
        self.screen = size;
    }

    /// A screen-sized colour target, e.g. a frame's source or destination.
    pub fn frame_target(&mut self, label: &str) -> TargetId {
        let desc = TargetDescriptor::color(label, self.screen);
        self.create_target(&desc)
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn camera(&self, id: CameraId) -> Option<&RecordedCamera> {
        self.cameras.get(&id)
    }

    pub fn target(&self, id: TargetId) -> Option<&RecordedTarget> {
        self.targets.get(&id)
    }

    /// Live non-temporary targets.
    pub fn live_targets(&self) -> usize {
        self.targets.values().filter(|t| !t.temporary).count()
    }

    pub fn live_temporaries(&self) -> usize {
        self.targets.values().filter(|t| t.temporary).count()
    }

    /// Live cameras spawned by the pipeline.
    pub fn live_cameras(&self) -> usize {
        self.cameras.values().filter(|c| c.spawned).count()
    }

    pub fn invalid_destroys(&self) -> usize {
        self.invalid_destroys
    }

    fn insert_target(&mut self, desc: &TargetDescriptor, temporary: bool) -> TargetId {
        let id = self.ids.next_target();
        self.targets.insert(
            id,
            RecordedTarget {
                label: desc.label.clone(),
                info: TargetInfo::from(desc),
                temporary,
            },
        );
        id
    }
}

impl Compositor for RecordingHost {
    fn create_target(&mut self, desc: &TargetDescriptor) -> TargetId {
        let id = self.insert_target(desc, false);
        self.ops.push(HostOp::CreateTarget {
            id,
            label: desc.label.clone(),
            size: desc.size,
        });
        id
    }

    fn destroy_target(&mut self, id: TargetId) {
        match self.targets.get(&id) {
            Some(t) if !t.temporary => {
                self.targets.remove(&id);
            }
            _ => self.invalid_destroys += 1,
        }
        self.ops.push(HostOp::DestroyTarget(id));
    }

    fn target_info(&self, id: TargetId) -> Option<TargetInfo> {
        self.targets.get(&id).map(|t| t.info)
    }

    fn acquire_temporary(&mut self, desc: &TargetDescriptor) -> TargetId {
        let id = self.insert_target(desc, true);
        self.ops.push(HostOp::AcquireTemporary {
            id,
            size: desc.size,
        });
        id
    }

    fn release_temporary(&mut self, id: TargetId) {
        match self.targets.get(&id) {
            Some(t) if t.temporary => {
                self.targets.remove(&id);
            }
            _ => self.invalid_destroys += 1,
        }
        self.ops.push(HostOp::ReleaseTemporary(id));
    }

    fn clear(&mut self, target: TargetId, color: Color) {
        self.ops.push(HostOp::Clear { target, color });
    }

    fn blit(&mut self, source: TargetId, destination: TargetId) {
        self.ops.push(HostOp::Blit {
            source,
            destination,
        });
    }

    fn blit_pass(
        &mut self,
        source: TargetId,
        destination: TargetId,
        material: &GlowMaterial,
        pass: ShaderPass,
    ) {
        self.ops.push(HostOp::BlitPass {
            source,
            destination,
            pass,
            intensity: material.intensity(),
            threshold: material.threshold(),
            keywords: material.keywords().to_vec(),
        });
    }

    fn draw_inset(
        &mut self,
        source: TargetId,
        destination: TargetId,
        rect: Rect,
        _material: &GlowMaterial,
        pass: ShaderPass,
    ) {
        self.ops.push(HostOp::DrawInset {
            source,
            destination,
            rect,
            pass,
        });
    }
}

impl CameraRig for RecordingHost {
    fn main_camera(&self) -> Option<CameraId> {
        self.main_camera
    }

    fn camera_state(&self, id: CameraId) -> Option<CameraState> {
        let camera = self.cameras.get(&id)?;
        let pixel_size = camera
            .target
            .and_then(|t| self.targets.get(&t))
            .map(|t| t.info.size)
            .unwrap_or(self.screen);
        Some(CameraState {
            pixel_size,
            depth: camera.depth,
        })
    }

    fn spawn_camera(&mut self, name: &str) -> CameraId {
        let id = self.add_camera(name, 0.0);
        if let Some(camera) = self.cameras.get_mut(&id) {
            camera.spawned = true;
        }
        self.ops.push(HostOp::SpawnCamera {
            id,
            name: name.to_string(),
        });
        id
    }

    fn destroy_camera(&mut self, id: CameraId) {
        if self.cameras.remove(&id).is_none() {
            self.invalid_destroys += 1;
        }
        if self.main_camera == Some(id) {
            self.main_camera = None;
        }
        self.ops.push(HostOp::DestroyCamera(id));
    }

    fn copy_camera_settings(&mut self, from: CameraId, to: CameraId) {
        let Some(source) = self.cameras.get(&from).cloned() else {
            return;
        };
        if let Some(camera) = self.cameras.get_mut(&to) {
            camera.depth = source.depth;
            camera.target = source.target;
            camera.depth_buffer = source.depth_buffer;
            camera.setup = source.setup;
        }
        self.ops.push(HostOp::CopyCameraSettings { from, to });
    }

    fn apply_camera_setup(&mut self, id: CameraId, setup: &CameraSetup) {
        if let Some(camera) = self.cameras.get_mut(&id) {
            camera.depth = setup.depth;
            camera.setup = Some(*setup);
        }
        self.ops.push(HostOp::ApplyCameraSetup { id, setup: *setup });
    }

    fn target_texture(&self, id: CameraId) -> Option<TargetId> {
        self.cameras.get(&id).and_then(|c| c.target)
    }

    fn set_target_texture(&mut self, id: CameraId, target: Option<TargetId>) {
        if let Some(camera) = self.cameras.get_mut(&id) {
            camera.target = target;
            camera.depth_buffer = None;
        }
        self.ops.push(HostOp::SetTargetTexture { camera: id, target });
    }

    fn set_target_buffers(&mut self, id: CameraId, color: TargetId, depth: TargetId) {
        if let Some(camera) = self.cameras.get_mut(&id) {
            camera.target = Some(color);
            camera.depth_buffer = Some(depth);
        }
        self.ops.push(HostOp::SetTargetBuffers {
            camera: id,
            color,
            depth,
        });
    }

    fn attach_to(&mut self, child: CameraId, parent: CameraId) {
        if let Some(camera) = self.cameras.get_mut(&child) {
            camera.parent = Some(parent);
        }
        self.ops.push(HostOp::AttachCamera { child, parent });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_pixel_size_follows_target() {
        let (mut host, main) = RecordingHost::with_main_camera(PhysicalSize::new(100, 50));
        assert_eq!(
            host.camera_state(main).unwrap().pixel_size,
            PhysicalSize::new(100, 50)
        );

        let t = host.create_target(&TargetDescriptor::color("t", PhysicalSize::new(10, 5)));
        host.set_target_texture(main, Some(t));
        assert_eq!(
            host.camera_state(main).unwrap().pixel_size,
            PhysicalSize::new(10, 5)
        );

        host.set_screen_size(PhysicalSize::new(300, 200));
        assert_eq!(
            host.camera_state(main).unwrap().pixel_size,
            PhysicalSize::new(10, 5)
        );
    }

    #[test]
    fn double_destroy_is_counted() {
        let mut host = RecordingHost::new(PhysicalSize::new(8, 8));
        let t = host.frame_target("t");
        host.destroy_target(t);
        host.destroy_target(t);
        assert_eq!(host.invalid_destroys(), 1);
    }

    #[test]
    fn temporaries_are_tracked_separately() {
        let mut host = RecordingHost::new(PhysicalSize::new(8, 8));
        let tmp = host.acquire_temporary(&TargetDescriptor::color("tmp", PhysicalSize::new(8, 8)));
        assert_eq!(host.live_temporaries(), 1);
        assert_eq!(host.live_targets(), 0);

        host.destroy_target(tmp);
        assert_eq!(host.invalid_destroys(), 1);
        host.release_temporary(tmp);
        assert_eq!(host.live_temporaries(), 0);
    }

    #[test]
    fn removing_main_camera_clears_designation() {
        let (mut host, main) = RecordingHost::with_main_camera(PhysicalSize::new(8, 8));
        host.remove_camera(main);
        assert!(host.main_camera().is_none());
        assert!(host.camera_state(main).is_none());
    }

    #[test]
    fn removing_a_camera_takes_its_children() {
        let (mut host, main) = RecordingHost::with_main_camera(PhysicalSize::new(8, 8));
        let child = host.spawn_camera("child");
        let grandchild = host.spawn_camera("grandchild");
        let sibling = host.add_camera("sibling", 1.0);
        host.attach_to(child, main);
        host.attach_to(grandchild, child);

        host.remove_camera(main);
        assert!(host.camera_state(child).is_none());
        assert!(host.camera_state(grandchild).is_none());
        assert!(host.camera_state(sibling).is_some());
        assert_eq!(host.live_cameras(), 0);
    }

    #[test]
    fn op_display() {
        let op = HostOp::Blit {
            source: TargetId(1),
            destination: TargetId(2),
        };
        assert_eq!(op.to_string(), "blit target-1 -> target-2");

        let op = HostOp::BlitPass {
            source: TargetId(1),
            destination: TargetId(2),
            pass: ShaderPass::Threshold,
            intensity: 1.0,
            threshold: [0.0, 1.0, 0.0, 0.0],
            keywords: vec![ShaderKeyword::LumValue],
        };
        assert_eq!(op.to_string(), "blit target-1 -> target-2 [Threshold] LUM_VALUE");
        assert!(op.writes(TargetId(2)));
        assert!(!op.writes(TargetId(1)));
    }
}
