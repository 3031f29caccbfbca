use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a render target owned by a compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

/// Handle to a camera in the host's scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CameraId(pub u64);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera-{}", self.0)
    }
}

/// Monotonic handle source. Handles are never reissued, so a destroyed
/// resource's id can't alias a later allocation.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start issuing ids at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    fn bump(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn next_target(&mut self) -> TargetId {
        TargetId(self.bump())
    }

    pub fn next_camera(&mut self) -> CameraId {
        CameraId(self.bump())
    }
}
