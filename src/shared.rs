use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::event::{EventBus, RoomSubscription};
use crate::game::GameService;
use crate::room::codes::PetNameCodeGenerator;
use crate::room::repository::InMemoryRoomRepository;
use crate::room::service::RoomService;
use crate::websockets::{ConnectionManager, InMemoryConnectionManager, WebSocketRoomSubscriber};

/// Opaque handle for a live connection. The connection layer owns the
/// transport behind it; rooms only keep the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<RoomService>,
    pub game_service: Arc<GameService>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub event_bus: EventBus,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(
        room_service: Arc<RoomService>,
        game_service: Arc<GameService>,
        connection_manager: Arc<dyn ConnectionManager>,
        event_bus: EventBus,
        config: ServerConfig,
    ) -> Self {
        Self {
            room_service,
            game_service,
            connection_manager,
            event_bus,
            config,
        }
    }

    /// Wires the in-memory services for a server run.
    pub fn from_config(config: ServerConfig) -> Self {
        let event_bus = EventBus::new(config.event_channel_capacity);
        let game_service = Arc::new(GameService::new(event_bus.clone()));
        let room_service = Arc::new(RoomService::new(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(PetNameCodeGenerator::new()),
            game_service.clone(),
            event_bus.clone(),
        ));

        Self::new(
            room_service,
            game_service,
            Arc::new(InMemoryConnectionManager::new()),
            event_bus,
            config,
        )
    }

    /// Starts the task that fans a room's events out to its connections.
    pub async fn subscribe_room(&self, room_code: &str) {
        let subscriber = WebSocketRoomSubscriber::new(
            Arc::clone(&self.room_service),
            Arc::clone(&self.connection_manager),
        );
        RoomSubscription::new(
            room_code.to_string(),
            Arc::new(subscriber),
            self.event_bus.clone(),
        )
        .start()
        .await;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Need at least 2 players to start")]
    InsufficientPlayers,

    #[error("Game not found")]
    GameNotFound,

    #[error("Game has not started")]
    GameNotStarted,

    #[error("Game has ended")]
    GameEnded,

    #[error("Invalid room configuration: {0}")]
    InvalidConfig(String),

    #[error("Only the host can do that")]
    NotHost,

    #[error("Player is not in this room")]
    PlayerNotInRoom,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RoomNotFound | AppError::GameNotFound | AppError::PlayerNotInRoom => {
                StatusCode::NOT_FOUND
            }
            AppError::RoomFull
            | AppError::GameAlreadyStarted
            | AppError::InsufficientPlayers
            | AppError::GameNotStarted
            | AppError::GameEnded => StatusCode::CONFLICT,
            AppError::InvalidConfig(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotHost => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}
