use std::collections::BTreeSet;

use glow_common::{CameraId, Color, GlowEvent, PhysicalSize, TargetId};
use glow_config::{DataSet, LayerConfig, OverlayMode};

use super::*;
use crate::host::{CameraRig, CameraSetup, Compositor, LayerMask, ShaderPass};
use crate::recording::{HostOp, RecordingBlur, RecordingHost};

const SCREEN: PhysicalSize = PhysicalSize {
    width: 320,
    height: 180,
};

struct Rig {
    host: RecordingHost,
    main: CameraId,
    attached: CameraId,
    glow: GlowCamera<RecordingBlur>,
    source: TargetId,
    destination: TargetId,
}

impl Rig {
    fn new(dataset: DataSet) -> Self {
        let (mut host, main) = RecordingHost::with_main_camera(SCREEN);
        let attached = host.add_camera("Glow host", 0.0);
        let source = host.frame_target("source");
        let destination = host.frame_target("destination");
        let mut glow = GlowCamera::new(attached, RecordingBlur::default()).with_dataset(dataset);
        glow.on_start();
        Self {
            host,
            main,
            attached,
            glow,
            source,
            destination,
        }
    }

    fn with_layers(layers: Vec<LayerConfig>) -> Self {
        Self::new(DataSet {
            layers,
            ..DataSet::default()
        })
    }

    fn frame(&mut self) -> FrameOutcome {
        self.glow.on_update(&mut self.host);
        self.glow.on_before_capture(&mut self.host);
        self.glow.on_frame(&mut self.host, self.source, self.destination)
    }

    /// Validate, then clear the op log so only the next frame is recorded.
    fn settle(&mut self) {
        self.glow.on_update(&mut self.host);
        self.host.clear_ops();
    }

    fn stop(&mut self) {
        self.glow.on_stop(&mut self.host);
    }

    fn all_owned(&self) -> BTreeSet<TargetId> {
        self.glow
            .workspaces()
            .iter()
            .flat_map(|ws| ws.owned_targets())
            .chain(self.glow.main_target())
            .collect()
    }
}

fn layer(scene_layer: u32) -> LayerConfig {
    LayerConfig::on_layer(scene_layer)
}

fn additive_into(ops: &[HostOp], target: TargetId) -> Vec<TargetId> {
    ops.iter()
        .filter_map(|op| match op {
            HostOp::BlitPass {
                source,
                destination,
                pass: ShaderPass::Additive,
                ..
            } if *destination == target => Some(*source),
            _ => None,
        })
        .collect()
}

fn destroyed_targets(ops: &[HostOp]) -> BTreeSet<TargetId> {
    ops.iter()
        .filter_map(|op| match op {
            HostOp::DestroyTarget(id) => Some(*id),
            _ => None,
        })
        .collect()
}

#[test]
fn first_checkpoint_rebuilds_once() {
    let mut rig = Rig::with_layers(vec![layer(3)]);
    assert_eq!(rig.glow.on_update(&mut rig.host), Validation::Rebuilt);
    for _ in 0..5 {
        rig.frame();
    }
    assert_eq!(rig.glow.validator().rebuild_count(), 1);
    assert!(rig.glow.is_initialized());
    rig.stop();
}

#[test]
fn zero_layers_draw_only_the_base_image() {
    let mut rig = Rig::with_layers(vec![]);
    rig.settle();

    let outcome = rig.frame();
    let main_target = rig.glow.main_target().unwrap();
    assert_eq!(
        outcome,
        FrameOutcome::Composited {
            layers: 0,
            overlay: false
        }
    );
    assert_eq!(
        rig.host.ops(),
        &[HostOp::Blit {
            source: main_target,
            destination: rig.destination
        }]
    );
    rig.stop();
}

#[test]
fn one_layer_adds_its_blurred_buffer_once() {
    let mut rig = Rig::with_layers(vec![LayerConfig {
        intensity: 3.0,
        threshold: 0.6,
        ..layer(3)
    }]);
    rig.settle();

    let outcome = rig.frame();
    let ops = rig.host.ops().to_vec();
    let ws = &rig.glow.workspaces()[0];

    assert_eq!(
        outcome,
        FrameOutcome::Composited {
            layers: 1,
            overlay: false
        }
    );
    assert_eq!(
        ops.iter()
            .find(|op| op.writes(rig.destination))
            .cloned(),
        Some(HostOp::Blit {
            source: rig.glow.main_target().unwrap(),
            destination: rig.destination
        })
    );
    assert_eq!(additive_into(&ops, rig.destination), vec![ws.blurred().unwrap()]);
    assert!(ops.iter().any(|op| matches!(
        op,
        HostOp::BlitPass { pass: ShaderPass::Additive, intensity, .. } if (*intensity - 3.0).abs() < f32::EPSILON
    )));
    assert!(!ops.iter().any(|op| matches!(op, HostOp::DrawInset { .. })));
    rig.stop();
}

#[test]
fn threshold_overlay_sums_threshold_buffers_only() {
    let mut rig = Rig::new(DataSet {
        common: glow_config::CommonConfig {
            overlay_mode: OverlayMode::Threshold,
            ..Default::default()
        },
        layers: vec![layer(1), layer(2)],
    });
    rig.settle();

    let outcome = rig.frame();
    let ops = rig.host.ops().to_vec();
    assert_eq!(
        outcome,
        FrameOutcome::Composited {
            layers: 2,
            overlay: true
        }
    );

    let scratch = ops
        .iter()
        .find_map(|op| match op {
            HostOp::AcquireTemporary { id, size } => {
                assert_eq!(*size, SCREEN);
                Some(*id)
            }
            _ => None,
        })
        .unwrap();
    let thresholds: Vec<TargetId> = rig
        .glow
        .workspaces()
        .iter()
        .map(|ws| ws.threshold().unwrap())
        .collect();

    assert!(ops.contains(&HostOp::Clear {
        target: scratch,
        color: Color::TRANSPARENT
    }));
    assert_eq!(additive_into(&ops, scratch), thresholds);
    assert!(ops.contains(&HostOp::DrawInset {
        source: scratch,
        destination: rig.destination,
        rect: overlay_rect(SCREEN, 0.4),
        pass: ShaderPass::Overlay,
    }));
    assert_eq!(ops.last(), Some(&HostOp::ReleaseTemporary(scratch)));
    assert_eq!(rig.host.live_temporaries(), 0);
    rig.stop();
}

#[test]
fn disabled_layer_is_skipped_but_keeps_its_workspace() {
    let mut rig = Rig::new(DataSet {
        common: glow_config::CommonConfig {
            overlay_mode: OverlayMode::Blurred,
            ..Default::default()
        },
        layers: vec![
            layer(1),
            LayerConfig {
                enabled: false,
                ..layer(2)
            },
        ],
    });
    rig.settle();

    let outcome = rig.frame();
    assert_eq!(
        outcome,
        FrameOutcome::Composited {
            layers: 1,
            overlay: true
        }
    );
    assert_eq!(rig.glow.workspaces().len(), 2);
    assert_eq!(rig.glow.blur().calls().len(), 1);

    let skipped: BTreeSet<TargetId> = rig.glow.workspaces()[1].owned_targets().into_iter().collect();
    assert_eq!(skipped.len(), 3);
    for op in rig.host.ops() {
        match op {
            HostOp::Blit { source, .. }
            | HostOp::BlitPass { source, .. }
            | HostOp::DrawInset { source, .. } => assert!(!skipped.contains(source)),
            _ => {}
        }
    }
    rig.stop();
}

#[test]
fn shrinking_disposes_only_the_tail() {
    let mut rig = Rig::with_layers(vec![layer(1), layer(2), layer(3)]);
    rig.frame();
    let kept = rig.glow.workspaces()[0].owned_targets();
    let kept_camera = rig.glow.workspaces()[0].capture_camera();
    let tail: BTreeSet<TargetId> = rig.glow.workspaces()[1..]
        .iter()
        .flat_map(|ws| ws.owned_targets())
        .collect();
    let tail_cameras: Vec<CameraId> = rig.glow.workspaces()[1..]
        .iter()
        .filter_map(|ws| ws.capture_camera())
        .collect();

    rig.glow.set_dataset(DataSet {
        layers: vec![layer(1)],
        ..DataSet::default()
    });
    rig.host.clear_ops();
    rig.frame();

    assert_eq!(rig.glow.workspaces().len(), 1);
    assert_eq!(rig.glow.workspaces()[0].owned_targets(), kept);
    assert_eq!(rig.glow.workspaces()[0].capture_camera(), kept_camera);
    assert_eq!(destroyed_targets(rig.host.ops()), tail);
    for camera in tail_cameras {
        assert!(rig.host.ops().contains(&HostOp::DestroyCamera(camera)));
    }
    assert_eq!(rig.host.live_cameras(), 1);
    assert_eq!(rig.host.invalid_destroys(), 0);
    rig.stop();
}

#[test]
fn growing_appends_fresh_workspaces() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    rig.frame();
    let kept = rig.glow.workspaces()[0].owned_targets();
    let seen = rig.all_owned();

    rig.glow.set_dataset(DataSet {
        layers: vec![layer(1), layer(4), layer(5)],
        ..DataSet::default()
    });
    rig.host.clear_ops();
    rig.frame();

    assert_eq!(rig.glow.workspaces().len(), 3);
    assert_eq!(rig.glow.workspaces()[0].owned_targets(), kept);
    assert!(destroyed_targets(rig.host.ops()).is_empty());
    for ws in &rig.glow.workspaces()[1..] {
        let owned = ws.owned_targets();
        assert_eq!(owned.len(), 3);
        assert!(owned.iter().all(|id| !seen.contains(id)));
    }
    rig.stop();
}

#[test]
fn repeated_invalidation_rebuilds_once() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    rig.frame();

    rig.glow.set_dataset(DataSet {
        layers: vec![layer(2)],
        ..DataSet::default()
    });
    rig.glow.on_config_changed();
    assert_eq!(rig.glow.on_update(&mut rig.host), Validation::Rebuilt);
    assert_eq!(rig.glow.on_update(&mut rig.host), Validation::AlreadyValid);
    assert_eq!(rig.glow.validator().rebuild_count(), 2);
    rig.stop();
}

#[test]
fn invalidation_without_drift_is_confirmed() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    rig.frame();
    rig.glow.on_config_changed();
    assert_eq!(rig.glow.on_update(&mut rig.host), Validation::Confirmed);
    assert_eq!(rig.glow.validator().rebuild_count(), 1);
    rig.stop();
}

#[test]
fn screen_resize_reallocates_every_target() {
    let mut rig = Rig::with_layers(vec![layer(1), layer(2)]);
    rig.frame();
    let before = rig.all_owned();

    let resized = PhysicalSize::new(640, 360);
    rig.host.set_screen_size(resized);
    rig.frame();

    assert_eq!(rig.glow.validator().rebuild_count(), 2);
    let after = rig.all_owned();
    assert_eq!(after.len(), 7);
    assert!(after.is_disjoint(&before));
    for id in after {
        assert_eq!(rig.host.target_info(id).unwrap().size, resized);
    }
    assert_eq!(rig.host.invalid_destroys(), 0);
    rig.stop();
}

#[test]
fn missing_main_camera_passes_through_until_one_appears() {
    let mut host = RecordingHost::new(SCREEN);
    let attached = host.add_camera("Glow host", 0.0);
    let source = host.frame_target("source");
    let destination = host.frame_target("destination");
    let mut glow = GlowCamera::new(attached, RecordingBlur::default()).with_dataset(DataSet {
        layers: vec![layer(1)],
        ..DataSet::default()
    });
    glow.on_start();

    for _ in 0..3 {
        host.clear_ops();
        glow.on_update(&mut host);
        assert_eq!(
            glow.on_frame(&mut host, source, destination),
            FrameOutcome::PassThrough
        );
        assert_eq!(
            host.ops(),
            &[HostOp::Blit {
                source,
                destination
            }]
        );
    }
    assert!(glow.workspaces().is_empty());

    let main = host.add_camera("Main Camera", 0.0);
    host.set_main_camera(Some(main));
    glow.on_update(&mut host);
    assert_eq!(glow.main_camera(), Some(main));
    assert!(matches!(
        glow.on_frame(&mut host, source, destination),
        FrameOutcome::Composited { layers: 1, .. }
    ));
    glow.on_stop(&mut host);
}

#[test]
fn cameras_are_wired_to_the_main_target() {
    let mut rig = Rig::with_layers(vec![layer(7)]);
    rig.frame();
    let main_target = rig.glow.main_target().unwrap();
    let ws = &rig.glow.workspaces()[0];
    let capture_camera = ws.capture_camera().unwrap();

    let main = rig.host.camera(rig.main).unwrap();
    assert_eq!(main.target, Some(main_target));
    assert_eq!(
        rig.host.target(main_target).unwrap().label,
        MAIN_TARGET_LABEL
    );
    assert_eq!(rig.host.target_info(main_target).unwrap().depth_bits, 24);

    let attached = rig.host.camera(rig.attached).unwrap();
    let setup = attached.setup.unwrap();
    assert!(setup.layer_mask.is_empty());
    assert_eq!(setup.occlusion_culling, Some(false));
    assert_eq!(attached.depth, 2.0);
    assert_eq!(attached.target, None);

    let capture = rig.host.camera(capture_camera).unwrap();
    let setup = capture.setup.unwrap();
    assert_eq!(setup.layer_mask, LayerMask::single(7));
    assert_eq!(setup.background, Color::TRANSPARENT);
    assert_eq!(capture.depth, 1.0);
    assert_eq!(capture.parent, Some(rig.main));
    assert_eq!(capture.target, ws.capture());
    assert_eq!(capture.depth_buffer, Some(main_target));
    rig.stop();
}

#[test]
fn attached_camera_drift_triggers_rebuild() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    rig.frame();

    rig.host
        .apply_camera_setup(rig.attached, &CameraSetup::host_only(9.0));
    assert_eq!(rig.glow.on_update(&mut rig.host), Validation::Rebuilt);
    assert_eq!(rig.host.camera(rig.attached).unwrap().depth, 2.0);
    rig.stop();
}

#[test]
fn destroyed_main_camera_falls_back_to_host_designation() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    rig.frame();
    let old_capture = rig.glow.workspaces()[0].capture_camera().unwrap();

    // Capture cameras are children of the main camera and go with it.
    rig.host.remove_camera(rig.main);
    assert!(rig.host.camera_state(old_capture).is_none());
    let replacement = rig.host.add_camera("Second Camera", 4.0);
    rig.host.set_main_camera(Some(replacement));
    rig.frame();

    let main_target = rig.glow.main_target().unwrap();
    let capture_camera = rig.glow.workspaces()[0].capture_camera().unwrap();
    assert_ne!(capture_camera, old_capture);
    assert_eq!(rig.host.live_cameras(), 1);
    assert_eq!(rig.glow.main_camera(), Some(replacement));
    assert_eq!(rig.host.camera(replacement).unwrap().target, Some(main_target));
    assert_eq!(
        rig.host.camera(capture_camera).unwrap().parent,
        Some(replacement)
    );
    assert_eq!(rig.host.camera(capture_camera).unwrap().depth, 5.0);
    assert_eq!(rig.host.invalid_destroys(), 0);
    rig.stop();
}

#[test]
fn explicit_main_camera_wins_over_host_designation() {
    let (mut host, designated) = RecordingHost::with_main_camera(SCREEN);
    let explicit = host.add_camera("Overlay Camera", 1.0);
    let attached = host.add_camera("Glow host", 0.0);
    let mut glow = GlowCamera::new(attached, RecordingBlur::default()).with_main_camera(explicit);

    glow.on_update(&mut host);
    assert_eq!(glow.main_camera(), Some(explicit));
    assert_eq!(host.camera(explicit).unwrap().target, glow.main_target());
    assert_eq!(host.camera(designated).unwrap().target, None);
    glow.on_stop(&mut host);
}

#[test]
fn main_target_changes_are_announced() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    let mut rx = rig.glow.subscribe();
    rig.frame();
    let main_target = rig.glow.main_target();

    assert!(matches!(
        rx.try_recv().unwrap(),
        GlowEvent::MainTargetChanged(t) if t == main_target
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        GlowEvent::Rebuilt { layers: 1 }
    ));

    rig.stop();
    assert!(matches!(
        rx.try_recv().unwrap(),
        GlowEvent::MainTargetChanged(None)
    ));
}

#[test]
fn stop_releases_everything_and_start_recovers() {
    let mut rig = Rig::with_layers(vec![layer(1), layer(2)]);
    rig.frame();
    rig.stop();

    assert_eq!(rig.host.live_targets(), 2);
    assert_eq!(rig.host.live_cameras(), 0);
    assert_eq!(rig.host.invalid_destroys(), 0);
    assert_eq!(rig.glow.blur().disposals(), 1);
    assert_eq!(rig.host.camera(rig.main).unwrap().target, None);
    assert!(rig.glow.main_target().is_none());
    assert!(rig.glow.workspaces().is_empty());

    rig.stop();
    assert_eq!(rig.host.invalid_destroys(), 0);

    rig.glow.on_start();
    assert!(matches!(
        rig.frame(),
        FrameOutcome::Composited { layers: 2, .. }
    ));
    rig.stop();
}

#[test]
fn dataset_accessor_validates_first() {
    let mut rig = Rig::with_layers(vec![layer(1)]);
    assert_eq!(rig.glow.dataset(&mut rig.host).layers.len(), 1);
    assert_eq!(rig.glow.validator().rebuild_count(), 1);
    assert_eq!(rig.glow.workspaces().len(), 1);
    rig.stop();
}

#[test]
fn before_capture_clears_every_capture_target() {
    let mut rig = Rig::with_layers(vec![layer(1), layer(2)]);
    rig.settle();
    rig.glow.on_before_capture(&mut rig.host);

    let cleared: Vec<TargetId> = rig
        .host
        .ops()
        .iter()
        .filter_map(|op| match op {
            HostOp::Clear { target, color } if *color == Color::TRANSPARENT => Some(*target),
            _ => None,
        })
        .collect();
    let captures: Vec<TargetId> = rig
        .glow
        .workspaces()
        .iter()
        .filter_map(|ws| ws.capture())
        .collect();
    assert_eq!(cleared, captures);
    rig.stop();
}

#[test]
fn full_threshold_stays_finite() {
    let mut rig = Rig::with_layers(vec![LayerConfig {
        threshold: 1.0,
        ..layer(1)
    }]);
    rig.settle();
    rig.frame();

    let factor = rig
        .host
        .ops()
        .iter()
        .find_map(|op| match op {
            HostOp::BlitPass {
                pass: ShaderPass::Threshold,
                threshold,
                ..
            } => Some(threshold[1]),
            _ => None,
        })
        .unwrap();
    assert!(factor.is_finite());
    assert!((factor - 10.0).abs() < 1e-5);
    rig.stop();
}

#[test]
fn overlay_rect_is_flipped_and_inset() {
    let rect = overlay_rect(SCREEN, 0.5);
    assert_eq!(rect.x, OVERLAY_GAP);
    assert_eq!(rect.y, OVERLAY_GAP + 90.0);
    assert!((rect.width - 160.0).abs() < 1e-4);
    assert_eq!(rect.height, -90.0);
    assert!(rect.is_flipped());
    assert_eq!(rect.bottom(), OVERLAY_GAP);
}

#[test]
fn removed_capture_camera_is_respawned() {
    let mut rig = Rig::with_layers(vec![layer(1), layer(2)]);
    rig.frame();
    let before: Vec<CameraId> = rig
        .glow
        .workspaces()
        .iter()
        .map(|ws| ws.capture_camera().unwrap())
        .collect();
    let old_capture = rig.glow.workspaces()[0].capture().unwrap();

    rig.host.remove_camera(before[0]);
    for _ in 0..3 {
        rig.frame();
    }

    assert_eq!(rig.glow.validator().rebuild_count(), 2);
    let ws = &rig.glow.workspaces()[0];
    let camera = ws.capture_camera().unwrap();
    assert_ne!(camera, before[0]);
    assert!(ws.is_alive(&rig.host));
    assert!(rig.host.target_info(old_capture).is_none());

    let capture = ws.capture().unwrap();
    let recorded = rig.host.camera(camera).unwrap();
    assert_eq!(recorded.target, Some(capture));
    assert_eq!(recorded.parent, Some(rig.main));

    // The surviving layer keeps its camera.
    assert_eq!(rig.glow.workspaces()[1].capture_camera(), Some(before[1]));
    assert_eq!(rig.host.live_cameras(), 2);
    assert_eq!(rig.host.invalid_destroys(), 0);

    rig.stop();
    assert_eq!(rig.host.live_cameras(), 0);
    assert_eq!(rig.host.invalid_destroys(), 0);
}

#[test]
fn overlay_shows_buffers_at_unit_intensity() {
    let mut rig = Rig::new(DataSet {
        common: glow_config::CommonConfig {
            overlay_mode: OverlayMode::Blurred,
            ..Default::default()
        },
        layers: vec![
            LayerConfig {
                intensity: 3.0,
                ..layer(1)
            },
            LayerConfig {
                intensity: 5.0,
                ..layer(2)
            },
        ],
    });
    rig.settle();
    rig.frame();

    let intensities: Vec<(TargetId, f32)> = rig
        .host
        .ops()
        .iter()
        .filter_map(|op| match op {
            HostOp::BlitPass {
                destination,
                pass: ShaderPass::Additive,
                intensity,
                ..
            } => Some((*destination, *intensity)),
            _ => None,
        })
        .collect();

    let into_destination: Vec<f32> = intensities
        .iter()
        .filter(|(dst, _)| *dst == rig.destination)
        .map(|(_, i)| *i)
        .collect();
    let into_overlay: Vec<f32> = intensities
        .iter()
        .filter(|(dst, _)| *dst != rig.destination)
        .map(|(_, i)| *i)
        .collect();
    assert_eq!(into_destination, vec![3.0, 5.0]);
    assert_eq!(into_overlay, vec![1.0, 1.0]);
    rig.stop();
}
