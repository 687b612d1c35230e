use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    event::RoomEventError,
    room::service::RoomService,
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

use super::shared::{Delivery, MessageBroadcaster, RoomQueryUtils};

/// Membership notifications: joins, leaves and host changes
pub struct RoomEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl RoomEventHandlers {
    pub fn new(
        room_service: Arc<RoomService>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    pub async fn handle_player_joined(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
        player_count: usize,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        debug!(room_code = %room_code, player_id = %player_id, "Handling player joined event");

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let message = WebSocketMessage::player_joined(
            player_id.to_string(),
            player_name.to_string(),
            player_count,
        );
        let notified =
            MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, message, delivery)
                .await?;

        debug!(
            room_code = %room_code,
            players_notified = notified,
            "Player joined notification sent"
        );
        Ok(())
    }

    pub async fn handle_player_left(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
        player_count: usize,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        debug!(room_code = %room_code, player_id = %player_id, "Handling player left event");

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let message = WebSocketMessage::player_left(
            player_id.to_string(),
            player_name.to_string(),
            player_count,
        );
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, message, delivery)
            .await?;
        Ok(())
    }

    pub async fn handle_new_host(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        info!(
            room_code = %room_code,
            new_host = %player_id,
            "Handling host changed event"
        );

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let message = WebSocketMessage::new_host(player_id.to_string(), player_name.to_string());
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, message, delivery)
            .await?;
        Ok(())
    }
}
