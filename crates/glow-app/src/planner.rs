//! Frame planning on the in-memory host.
//!
//! A [`Planner`] keeps one recording host and one glow camera alive across
//! dataset reloads, so a re-plan shows exactly what a live session would
//! rebuild.

use std::fmt;

use glow_common::{GlowEvent, PhysicalSize, TargetId};
use glow_config::DataSet;
use glow_renderer::recording::{HostOp, RecordingBlur, RecordingHost};
use glow_renderer::{FrameOutcome, GlowCamera, Validation};

pub struct FramePlan {
    pub index: usize,
    pub validation: Validation,
    pub outcome: FrameOutcome,
    pub ops: Vec<HostOp>,
}

impl fmt::Display for FramePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frame {} ({:?}, {:?})", self.index, self.validation, self.outcome)?;
        for op in &self.ops {
            writeln!(f, "  {op}")?;
        }
        Ok(())
    }
}

/// What was still alive after the pipeline stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakReport {
    pub targets: usize,
    pub temporaries: usize,
    pub cameras: usize,
    pub invalid_destroys: usize,
}

impl LeakReport {
    pub fn is_clean(&self) -> bool {
        self.targets == 0 && self.temporaries == 0 && self.cameras == 0 && self.invalid_destroys == 0
    }
}

pub struct Planner {
    host: RecordingHost,
    glow: GlowCamera<RecordingBlur>,
    source: TargetId,
    destination: TargetId,
    frame: usize,
}

impl Planner {
    pub fn new(screen: PhysicalSize, dataset: DataSet) -> Self {
        let (mut host, _main) = RecordingHost::with_main_camera(screen);
        let attached = host.add_camera("Glow host", 0.0);
        let source = host.frame_target("Frame source");
        let destination = host.frame_target("Frame destination");
        host.clear_ops();

        let mut glow = GlowCamera::new(attached, RecordingBlur::default()).with_dataset(dataset);
        glow.on_start();
        Self {
            host,
            glow,
            source,
            destination,
            frame: 0,
        }
    }

    /// Simulate `frames` frames.
    pub fn run(&mut self, frames: usize) -> Vec<FramePlan> {
        (0..frames).map(|_| self.step()).collect()
    }

    fn step(&mut self) -> FramePlan {
        let validation = self.glow.on_update(&mut self.host);
        self.glow.on_before_capture(&mut self.host);
        let outcome = self.glow.on_frame(&mut self.host, self.source, self.destination);
        let index = self.frame;
        self.frame += 1;
        FramePlan {
            index,
            validation,
            outcome,
            ops: self.host.take_ops(),
        }
    }

    pub fn reload(&mut self, dataset: DataSet) {
        self.glow.set_dataset(dataset);
        self.glow.events().publish(GlowEvent::ConfigReloaded);
    }

    pub fn rebuilds(&self) -> u64 {
        self.glow.validator().rebuild_count()
    }

    /// Stop the pipeline and report anything it left behind.
    pub fn finish(mut self) -> LeakReport {
        self.glow.on_stop(&mut self.host);
        let frame_targets = [self.source, self.destination]
            .iter()
            .filter(|id| self.host.target(**id).is_some())
            .count();
        LeakReport {
            targets: self.host.live_targets().saturating_sub(frame_targets),
            temporaries: self.host.live_temporaries(),
            cameras: self.host.live_cameras(),
            invalid_destroys: self.host.invalid_destroys(),
        }
    }
}
