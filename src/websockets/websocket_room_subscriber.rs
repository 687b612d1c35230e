use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{
    event::{RoomBroadcast, RoomEvent, RoomEventError, RoomEventHandler},
    room::service::RoomService,
    websockets::connection_manager::ConnectionManager,
};

use super::event_handlers::{
    shared::Delivery, ChatEventHandlers, GameEventHandlers, RoomEventHandlers,
};

/// WebSocket-specific room event handler
///
/// Turns room events into wire messages by delegating to:
/// - RoomEventHandlers: PlayerJoined, PlayerLeft, NewHost
/// - ChatEventHandlers: Chat
/// - GameEventHandlers: GameStarted, NumberCalled, PlayerMarked, Winner
pub struct WebSocketRoomSubscriber {
    room_handlers: RoomEventHandlers,
    chat_handlers: ChatEventHandlers,
    game_handlers: GameEventHandlers,
}

#[async_trait]
impl RoomEventHandler for WebSocketRoomSubscriber {
    async fn handle_room_event(
        &self,
        room_code: &str,
        broadcast: RoomBroadcast,
    ) -> Result<(), RoomEventError> {
        debug!(
            room_code = %room_code,
            event = broadcast.event.event_type(),
            "Handling room event for WebSocket connections"
        );

        let delivery = Delivery::from(&broadcast);
        match &broadcast.event {
            RoomEvent::PlayerJoined {
                player_id,
                player_name,
                player_count,
            } => {
                self.room_handlers
                    .handle_player_joined(room_code, player_id, player_name, *player_count, delivery)
                    .await
            }
            RoomEvent::PlayerLeft {
                player_id,
                player_name,
                player_count,
            } => {
                self.room_handlers
                    .handle_player_left(room_code, player_id, player_name, *player_count, delivery)
                    .await
            }
            RoomEvent::NewHost {
                player_id,
                player_name,
            } => {
                self.room_handlers
                    .handle_new_host(room_code, player_id, player_name, delivery)
                    .await
            }
            RoomEvent::Chat {
                sender_id,
                sender_name,
                message,
            } => {
                self.chat_handlers
                    .handle_chat_message(room_code, sender_id, sender_name, message, delivery)
                    .await
            }
            RoomEvent::GameStarted {
                game_id,
                game_type,
                boards,
            } => {
                self.game_handlers
                    .handle_game_started(room_code, game_id, *game_type, boards, delivery)
                    .await
            }
            RoomEvent::NumberCalled {
                number,
                called_numbers,
                remaining,
            } => {
                self.game_handlers
                    .handle_number_called(room_code, *number, called_numbers, *remaining, delivery)
                    .await
            }
            RoomEvent::PlayerMarked { player_id, number } => {
                self.game_handlers
                    .handle_player_marked(room_code, player_id, *number, delivery)
                    .await
            }
            RoomEvent::Winner {
                player_id,
                player_name,
                pattern,
                score,
            } => {
                self.game_handlers
                    .handle_winner(room_code, player_id, player_name, *pattern, *score, delivery)
                    .await
            }
        }
    }

    fn handler_name(&self) -> &'static str {
        "WebSocketRoomSubscriber"
    }
}

impl WebSocketRoomSubscriber {
    pub fn new(
        room_service: Arc<RoomService>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        let room_handlers =
            RoomEventHandlers::new(Arc::clone(&room_service), Arc::clone(&connection_manager));

        let chat_handlers =
            ChatEventHandlers::new(Arc::clone(&room_service), Arc::clone(&connection_manager));

        let game_handlers =
            GameEventHandlers::new(Arc::clone(&room_service), Arc::clone(&connection_manager));

        Self {
            room_handlers,
            chat_handlers,
            game_handlers,
        }
    }
}
