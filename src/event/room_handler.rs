use async_trait::async_trait;
use thiserror::Error;

use super::events::RoomBroadcast;

/// Errors that can occur when handling room events
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that react to a room's events
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    async fn handle_room_event(
        &self,
        room_code: &str,
        broadcast: RoomBroadcast,
    ) -> Result<(), RoomEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
