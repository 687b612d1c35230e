use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{
    CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse, RoomDetails,
    RoomSummary,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new room
///
/// POST /room
/// Returns the room code plus the identity the creator connects with
#[instrument(name = "create_room", skip(state, request))]
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    info!(
        host_name = %request.host_name,
        game_type = %request.game_type,
        "Creating new room"
    );

    let response = state.room_service.create_room(request).await?;
    state.subscribe_room(&response.room_code).await;

    Ok(Json(response))
}

/// HTTP handler for reserving a seat in a room
///
/// POST /room/:code/join
#[instrument(name = "join_room", skip(state, request))]
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    let response = state
        .room_service
        .join_room(&room_code, &request.player_name)
        .await?;

    info!(
        room_code = %room_code,
        player_id = %response.player_id,
        "Seat reserved over HTTP"
    );

    Ok(Json(response))
}

/// HTTP handler for listing joinable rooms
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    let rooms = state.room_service.list_available_rooms().await;
    info!(room_count = rooms.len(), "Rooms listed successfully");
    Json(rooms)
}

/// HTTP handler for looking a room up by code
///
/// GET /room/:code
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<Json<RoomDetails>, AppError> {
    let room = state
        .room_service
        .get_room(&room_code)
        .await
        .ok_or(AppError::RoomNotFound)?;

    Ok(Json(RoomDetails::from(&room)))
}
