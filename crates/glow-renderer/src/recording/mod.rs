//! Headless host for tests and frame planning.
//!
//! [`RecordingHost`] implements the full host interface in memory and logs
//! every call as a [`HostOp`], which makes a frame's pass schedule
//! inspectable without a GPU.

mod blur;
mod host;

pub use blur::{BlurCall, RecordingBlur};
pub use host::{HostOp, RecordedCamera, RecordedTarget, RecordingHost};
