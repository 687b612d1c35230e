use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::{RoomBroadcast, RoomEvent};

/// Event bus holding one broadcast channel per live room
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Room-specific event channels: room_code -> sender
    room_channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomBroadcast>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus; `capacity` bounds each room's backlog
    pub fn new(capacity: usize) -> Self {
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Emits an event to every subscriber of a room
    pub async fn emit_to_room(&self, room_code: &str, event: RoomEvent) {
        self.publish(room_code, RoomBroadcast::new(event, None))
            .await;
    }

    /// Emits an event that the originating player should not receive
    pub async fn emit_to_room_except(&self, room_code: &str, event: RoomEvent, player_id: &str) {
        self.publish(
            room_code,
            RoomBroadcast::new(event, Some(player_id.to_string())),
        )
        .await;
    }

    async fn publish(&self, room_code: &str, broadcast: RoomBroadcast) {
        let room_channels = self.room_channels.read().await;
        let event_type = broadcast.event.event_type();

        match room_channels.get(room_code) {
            Some(sender) => match sender.send(broadcast) {
                Ok(receiver_count) => {
                    debug!(
                        room_code = %room_code,
                        event = event_type,
                        receivers = receiver_count,
                        "Room event emitted"
                    );
                }
                Err(_) => {
                    debug!(room_code = %room_code, event = event_type, "Room event emitted with no receivers");
                }
            },
            None => {
                debug!(room_code = %room_code, event = event_type, "No room channel, event dropped");
            }
        }
    }

    /// Subscribe to events for a specific room, opening its channel if needed
    pub async fn subscribe_to_room(&self, room_code: &str) -> broadcast::Receiver<RoomBroadcast> {
        let room_channels = self.room_channels.read().await;

        if let Some(sender) = room_channels.get(room_code) {
            sender.subscribe()
        } else {
            drop(room_channels);

            let mut room_channels = self.room_channels.write().await;
            // Another task may have opened it between the two locks.
            let sender = room_channels
                .entry(room_code.to_string())
                .or_insert_with(|| {
                    debug!(room_code = %room_code, "Creating new room channel for subscription");
                    broadcast::channel(self.capacity).0
                });
            sender.subscribe()
        }
    }

    /// Drops a room's channel; subscribers drain what is buffered, then stop
    pub async fn remove_room(&self, room_code: &str) {
        let mut room_channels = self.room_channels.write().await;
        if room_channels.remove(room_code).is_some() {
            debug!(room_code = %room_code, "Room channel closed");
        }
    }

    pub async fn has_room(&self, room_code: &str) -> bool {
        self.room_channels.read().await.contains_key(room_code)
    }
}
