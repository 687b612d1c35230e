use std::sync::Arc;
use tracing::debug;

use crate::{
    event::RoomEventError,
    room::service::RoomService,
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

use super::shared::{Delivery, MessageBroadcaster, RoomQueryUtils};

pub struct ChatEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl ChatEventHandlers {
    pub fn new(
        room_service: Arc<RoomService>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    pub async fn handle_chat_message(
        &self,
        room_code: &str,
        sender_id: &str,
        sender_name: &str,
        message: &str,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        debug!(
            room_code = %room_code,
            sender_id = %sender_id,
            "Handling chat message event"
        );

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let chat_message = WebSocketMessage::chat(
            sender_id.to_string(),
            sender_name.to_string(),
            message.to_string(),
        );
        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room,
            chat_message,
            delivery,
        )
        .await?;

        Ok(())
    }
}
