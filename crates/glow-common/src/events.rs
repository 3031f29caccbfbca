use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::TargetId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GlowEvent {
    /// The main camera's output was (re)assigned. `None` means it was
    /// detached ahead of a resize or teardown.
    MainTargetChanged(Option<TargetId>),
    /// The pipeline rebuilt its derived resources.
    Rebuilt { layers: usize },
    ConfigReloaded,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<GlowEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GlowEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: GlowEvent) -> usize {
        tracing::trace!(?event, "publishing glow event");
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
