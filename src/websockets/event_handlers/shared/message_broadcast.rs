use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::{
    event::{RoomBroadcast, RoomEventError},
    room::models::RoomModel,
    shared::ConnectionId,
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

/// Who a room event goes to and when it happened
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub exclude: Option<&'a str>,
    pub timestamp: DateTime<Utc>,
}

impl<'a> From<&'a RoomBroadcast> for Delivery<'a> {
    fn from(broadcast: &'a RoomBroadcast) -> Self {
        Self {
            exclude: broadcast.exclude.as_deref(),
            timestamp: broadcast.timestamp,
        }
    }
}

pub struct MessageBroadcaster;

impl MessageBroadcaster {
    /// Sends one message to every attached player except the excluded one.
    /// Delivery is best-effort per recipient; returns how many accepted it.
    pub async fn broadcast_to_room(
        connection_manager: &Arc<dyn ConnectionManager>,
        room: &RoomModel,
        message: WebSocketMessage,
        delivery: Delivery<'_>,
    ) -> Result<usize, RoomEventError> {
        let message_json = serde_json::to_string(&message.at(delivery.timestamp)).map_err(|e| {
            RoomEventError::HandlerError(format!("Failed to serialize message: {}", e))
        })?;

        let mut delivered = 0;
        for (player_id, connection) in Self::recipients(room, delivery.exclude) {
            if connection_manager
                .send_to_connection(connection, &message_json)
                .await
            {
                delivered += 1;
            } else {
                debug!(room_code = %room.code, player_id = %player_id, "Player missed a room message");
            }
        }

        Ok(delivered)
    }

    /// Sends a message to a single connection
    pub async fn send_to_connection(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection: ConnectionId,
        message: &WebSocketMessage,
    ) -> bool {
        match serde_json::to_string(message) {
            Ok(message_json) => {
                connection_manager
                    .send_to_connection(connection, &message_json)
                    .await
            }
            Err(_) => false,
        }
    }

    /// Attached players of a room, minus `exclude`
    pub fn recipients<'r>(
        room: &'r RoomModel,
        exclude: Option<&'r str>,
    ) -> impl Iterator<Item = (&'r str, ConnectionId)> + 'r {
        room.players
            .iter()
            .filter(move |p| Some(p.id.as_str()) != exclude)
            .filter_map(|p| p.connection.map(|c| (p.id.as_str(), c)))
    }
}
