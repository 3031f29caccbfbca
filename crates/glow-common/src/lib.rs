pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, GlowError, RendererError};
pub use events::{EventBus, GlowEvent};
pub use id::{CameraId, IdSequence, TargetId};
pub use types::{Color, PhysicalSize, Rect};

pub type Result<T> = std::result::Result<T, GlowError>;
