use async_trait::async_trait;
use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::event::RoomEvent;
use crate::game::{start_room_round, MarkOutcome, WinRecord};
use crate::room::types::RoomDetails;
use crate::shared::{AppError, AppState, ConnectionId};
use crate::websockets::connection_manager::PlayerBinding;
use crate::websockets::messages::{
    ChatPayload, ClaimWinPayload, JoinPayload, MarkNumberPayload, MessageType, WebSocketMessage,
};

use super::event_handlers::shared::MessageBroadcaster;
use super::socket::{Connection, MessageHandler};

/// Longest chat message relayed to a room.
const MAX_CHAT_LEN: usize = 500;

/// Turns inbound commands into registry and engine calls. Failures go
/// back to the originating connection only, as an `error` message.
pub struct WebsocketReceiveHandler {
    state: AppState,
}

impl WebsocketReceiveHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn reply(&self, connection: ConnectionId, message: &WebSocketMessage) {
        MessageBroadcaster::send_to_connection(&self.state.connection_manager, connection, message)
            .await;
    }

    async fn reply_error(&self, connection: ConnectionId, error: &AppError) {
        debug!(connection = %connection, error = %error, "Command rejected");
        self.reply(connection, &WebSocketMessage::error(error.to_string()))
            .await;
    }

    async fn binding(&self, connection: ConnectionId) -> Result<PlayerBinding, AppError> {
        self.state
            .connection_manager
            .get_binding(connection)
            .await
            .ok_or_else(|| AppError::BadRequest("join a room first".to_string()))
    }

    async fn require_host(&self, binding: &PlayerBinding) -> Result<(), AppError> {
        if self
            .state
            .room_service
            .is_host(&binding.room_code, &binding.player_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotHost)
        }
    }

    async fn dispatch(
        &self,
        connection: ConnectionId,
        message: WebSocketMessage,
    ) -> Result<(), AppError> {
        match message.message_type {
            MessageType::Join => {
                let payload: JoinPayload = parse(&message)?;
                self.join(connection, payload).await
            }
            MessageType::Leave => {
                let binding = self.binding(connection).await?;
                self.leave(connection, &binding).await
            }
            MessageType::Chat => {
                let payload: ChatPayload = parse(&message)?;
                self.chat(connection, payload).await
            }
            MessageType::StartGame => {
                let binding = self.binding(connection).await?;
                self.require_host(&binding).await?;
                start_room_round(&self.state, &binding.room_code).await?;
                Ok(())
            }
            MessageType::CallNumber => {
                let binding = self.binding(connection).await?;
                self.require_host(&binding).await?;
                let called = self
                    .state
                    .game_service
                    .call_number(&binding.room_code)
                    .await?;
                if called.is_none() {
                    self.reply(
                        connection,
                        &WebSocketMessage::error("All numbers have been called".to_string()),
                    )
                    .await;
                }
                Ok(())
            }
            MessageType::MarkNumber => {
                let payload: MarkNumberPayload = parse(&message)?;
                let binding = self.binding(connection).await?;
                let outcome = self
                    .state
                    .game_service
                    .mark_number(&binding.room_code, &binding.player_id, payload.number)
                    .await;
                match outcome {
                    MarkOutcome::Rejected => Err(AppError::BadRequest(format!(
                        "cannot mark {}",
                        payload.number
                    ))),
                    MarkOutcome::Won(record) => {
                        self.credit_winner(&binding.room_code, &record).await;
                        Ok(())
                    }
                    MarkOutcome::Marked | MarkOutcome::Unchanged => Ok(()),
                }
            }
            MessageType::ClaimWin => {
                let payload: ClaimWinPayload = parse(&message)?;
                let binding = self.binding(connection).await?;
                let record = self
                    .state
                    .game_service
                    .claim_win(&binding.room_code, &binding.player_id, payload.pattern)
                    .await
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("{} claim rejected", payload.pattern))
                    })?;
                self.credit_winner(&binding.room_code, &record).await;
                Ok(())
            }
            MessageType::Ping => {
                self.reply(connection, &WebSocketMessage::pong()).await;
                Ok(())
            }
            other => Err(AppError::BadRequest(format!(
                "{:?} is not a client message",
                other
            ))),
        }
    }

    #[instrument(skip(self, payload), fields(room_code = %payload.room_code, player_id = %payload.player_id))]
    async fn join(&self, connection: ConnectionId, payload: JoinPayload) -> Result<(), AppError> {
        if self.state.connection_manager.get_binding(connection).await.is_some() {
            return Err(AppError::BadRequest("already in a room".to_string()));
        }
        if payload.player_id.trim().is_empty() || payload.player_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "player id and name are required".to_string(),
            ));
        }

        let room_service = &self.state.room_service;
        let game_service = &self.state.game_service;
        let code = payload.room_code.as_str();

        let attached = room_service
            .attach_player(code, &payload.player_id, &payload.player_name, connection)
            .await?;

        // A start can slip in between the two registrations.
        if let Err(e) = game_service
            .add_player(code, &payload.player_id, &payload.player_name)
            .await
        {
            warn!(error = %e, "Player could not enter the round, detaching");
            if let Err(detach_error) = room_service
                .detach_connection(code, &payload.player_id, connection)
                .await
            {
                warn!(error = %detach_error, "Could not roll back room attach");
            }
            return Err(e);
        }

        self.state
            .connection_manager
            .bind_player(
                connection,
                PlayerBinding {
                    room_code: payload.room_code.clone(),
                    player_id: payload.player_id.clone(),
                    player_name: payload.player_name.clone(),
                },
            )
            .await;

        let game = game_service.get_game(code).await;
        let board = game
            .as_ref()
            .and_then(|g| g.player(&payload.player_id))
            .filter(|p| !p.board.is_empty())
            .map(|p| p.board.clone());
        let called_numbers = game
            .map(|g| g.called_numbers().to_vec())
            .unwrap_or_default();

        self.reply(
            connection,
            &WebSocketMessage::room_state(
                RoomDetails::from(&attached.room),
                payload.player_id.clone(),
                board,
                called_numbers,
            ),
        )
        .await;

        info!(
            became_host = attached.became_host,
            reconnected = attached.reconnected,
            "Player joined over websocket"
        );
        Ok(())
    }

    async fn leave(&self, connection: ConnectionId, binding: &PlayerBinding) -> Result<(), AppError> {
        self.state.connection_manager.unbind_player(connection).await;

        let detached = self
            .state
            .room_service
            .detach_connection(&binding.room_code, &binding.player_id, connection)
            .await?;
        if let Some(outcome) = detached {
            if !outcome.room_deleted {
                self.state
                    .game_service
                    .remove_player(&binding.room_code, &binding.player_id)
                    .await;
            }
        }
        Ok(())
    }

    async fn chat(&self, connection: ConnectionId, payload: ChatPayload) -> Result<(), AppError> {
        let binding = self.binding(connection).await?;
        let message = payload.message.trim();
        if message.is_empty() {
            return Ok(());
        }
        if message.chars().count() > MAX_CHAT_LEN {
            return Err(AppError::BadRequest(format!(
                "chat messages are limited to {} characters",
                MAX_CHAT_LEN
            )));
        }

        self.state
            .event_bus
            .emit_to_room(
                &binding.room_code,
                RoomEvent::Chat {
                    sender_id: binding.player_id.clone(),
                    sender_name: binding.player_name.clone(),
                    message: message.to_string(),
                },
            )
            .await;
        Ok(())
    }

    async fn credit_winner(&self, room_code: &str, record: &WinRecord) {
        if let Err(e) = self
            .state
            .room_service
            .credit_score(room_code, &record.player_id, record.score)
            .await
        {
            warn!(room_code = %room_code, player_id = %record.player_id, error = %e, "Could not credit winner");
        }
    }
}

fn parse<T: for<'de> serde::Deserialize<'de>>(message: &WebSocketMessage) -> Result<T, AppError> {
    message
        .parse_payload()
        .map_err(|e| AppError::BadRequest(format!("invalid payload: {}", e)))
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection: ConnectionId, message: String) {
        let parsed = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(connection = %connection, error = %e, "Failed to parse WebSocket message");
                self.reply_error(connection, &AppError::BadRequest("invalid message".to_string()))
                    .await;
                return;
            }
        };

        debug!(
            connection = %connection,
            message_type = ?parsed.message_type,
            "Received message"
        );

        if let Err(e) = self.dispatch(connection, parsed).await {
            self.reply_error(connection, &e).await;
        }
    }

    async fn handle_disconnect(&self, connection: ConnectionId) {
        if let Some(binding) = self.state.connection_manager.get_binding(connection).await {
            if let Err(e) = self.leave(connection, &binding).await {
                debug!(connection = %connection, error = %e, "Disconnect after room was gone");
            }
        }
        self.state
            .connection_manager
            .remove_connection(connection)
            .await;
        info!(connection = %connection, "WebSocket connection cleaned up");
    }
}

/// WebSocket endpoint. The connection is anonymous until its first `join`.
///
/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: WebSocket, app_state: AppState) {
    let connection_id = ConnectionId::new();
    info!(connection = %connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id, outbound_sender)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state));
    let connection = Connection::new(
        connection_id,
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => info!(connection = %connection_id, "WebSocket connection closed cleanly"),
        Err(e) => warn!(connection = %connection_id, error = %e, "WebSocket connection error"),
    }
}
