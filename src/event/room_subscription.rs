use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, room_handler::RoomEventHandler};

/// Feeds one room's events, in order, to a handler
pub struct RoomSubscription {
    room_code: String,
    handler: Arc<dyn RoomEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(room_code: String, handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            room_code,
            handler,
            event_bus,
        }
    }

    /// Subscribes before returning, so nothing emitted after `start` resolves
    /// is missed. The task ends when the room's channel is dropped.
    pub async fn start(self) -> JoinHandle<()> {
        let room_code = self.room_code.clone();
        let handler_name = self.handler.handler_name();

        info!(
            room_code = %room_code,
            handler = handler_name,
            "Starting room subscription"
        );

        let mut receiver = self.event_bus.subscribe_to_room(&room_code).await;

        tokio::spawn(async move {
            loop {
                let broadcast = match receiver.recv().await {
                    Ok(broadcast) => broadcast,
                    // Delivery is best-effort: a subscriber that falls more than the
                    // channel capacity behind loses the oldest events and resumes
                    // in order from the oldest one still buffered.
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            room_code = %room_code,
                            handler = handler_name,
                            skipped = skipped,
                            "Room subscription lagged, events dropped"
                        );
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                debug!(
                    room_code = %room_code,
                    handler = handler_name,
                    event = broadcast.event.event_type(),
                    "Received room event"
                );

                if let Err(e) = self.handler.handle_room_event(&room_code, broadcast).await {
                    warn!(
                        room_code = %room_code,
                        handler = handler_name,
                        error = %e,
                        "Room event handler failed"
                    );
                }
            }

            info!(
                room_code = %room_code,
                handler = handler_name,
                "Room subscription ended - channel closed"
            );
        })
    }
}
