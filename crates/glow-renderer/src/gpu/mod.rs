//! wgpu implementation of the compositor and blur stage.

mod blur;
mod compositor;
mod context;
mod uniforms;

pub use blur::*;
pub use compositor::*;
pub use context::*;
pub use uniforms::*;
