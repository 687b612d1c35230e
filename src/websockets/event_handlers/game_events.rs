use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    event::RoomEventError,
    game::{GameType, WinPattern},
    room::service::RoomService,
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

use super::shared::{Delivery, MessageBroadcaster, RoomQueryUtils};

/// Round notifications: start, calls, marks and the winner
pub struct GameEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl GameEventHandlers {
    pub fn new(
        room_service: Arc<RoomService>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    /// Every player gets a `gameStarted` carrying only their own board
    pub async fn handle_game_started(
        &self,
        room_code: &str,
        game_id: &str,
        game_type: GameType,
        boards: &[(String, Vec<u8>)],
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        info!(room_code = %room_code, game_id = %game_id, "Handling game started event");

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        for (player_id, connection) in MessageBroadcaster::recipients(&room, delivery.exclude) {
            let Some((_, board)) = boards.iter().find(|(id, _)| id == player_id) else {
                debug!(room_code = %room_code, player_id = %player_id, "Player has no board this round");
                continue;
            };

            let message =
                WebSocketMessage::game_started(game_id.to_string(), game_type, board.clone())
                    .at(delivery.timestamp);
            MessageBroadcaster::send_to_connection(&self.connection_manager, connection, &message)
                .await;
        }

        Ok(())
    }

    pub async fn handle_number_called(
        &self,
        room_code: &str,
        number: u8,
        called_numbers: &[u8],
        remaining: usize,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        debug!(room_code = %room_code, number = number, "Handling number called event");

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let message = WebSocketMessage::number_called(number, called_numbers.to_vec(), remaining);
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, message, delivery)
            .await?;
        Ok(())
    }

    pub async fn handle_player_marked(
        &self,
        room_code: &str,
        player_id: &str,
        number: u8,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let message = WebSocketMessage::player_marked(player_id.to_string(), number);
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, message, delivery)
            .await?;
        Ok(())
    }

    pub async fn handle_winner(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
        pattern: WinPattern,
        score: i64,
        delivery: Delivery<'_>,
    ) -> Result<(), RoomEventError> {
        info!(
            room_code = %room_code,
            winner = %player_id,
            pattern = %pattern,
            "Handling winner event"
        );

        let Some(room) = RoomQueryUtils::get_room_if_exists(&self.room_service, room_code).await
        else {
            return Ok(());
        };

        let message = WebSocketMessage::winner(
            player_id.to_string(),
            player_name.to_string(),
            pattern,
            score,
        );
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, message, delivery)
            .await?;
        Ok(())
    }
}
