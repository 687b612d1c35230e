// Library crate for the bingo session server
// This file exposes the public API for integration tests

pub mod config;
pub mod event;
pub mod game;
pub mod room;
pub mod shared;
pub mod websockets;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use event::{EventBus, RoomEvent, RoomSubscription};
pub use game::{Game, GameService, GameType, MarkOutcome, WinPattern, WinRecord};
pub use room::{models::RoomModel, repository::RoomRepository, RoomService};
pub use shared::{AppError, AppState, ConnectionId};
pub use websockets::{
    ConnectionManager, MessageHandler, MessageType, PlayerBinding, WebSocketMessage,
    WebSocketRoomSubscriber, WebsocketReceiveHandler,
};

/// All HTTP and websocket routes over the given state
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/room", post(room::create_room))
        .route("/rooms", get(room::list_rooms))
        .route("/room/:code", get(room::get_room))
        .route("/room/:code/join", post(room::join_room))
        .route("/room/:code/start", post(game::start_game))
        .route("/ws", get(websockets::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
