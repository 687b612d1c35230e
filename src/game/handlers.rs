use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{service::StartedRound, variant::GameType};
use crate::shared::{AppError, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBoard {
    pub player_id: String,
    pub board: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub success: bool,
    pub game_id: String,
    pub game_type: GameType,
    pub boards: Vec<PlayerBoard>,
}

impl From<StartedRound> for StartGameResponse {
    fn from(started: StartedRound) -> Self {
        Self {
            success: true,
            game_id: started.game_id,
            game_type: started.game_type,
            boards: started
                .boards
                .into_iter()
                .map(|(player_id, board)| PlayerBoard { player_id, board })
                .collect(),
        }
    }
}

/// Closes the room to new players and opens its round. The room is
/// reopened if the round refuses to start.
pub(crate) async fn start_room_round(
    state: &AppState,
    room_code: &str,
) -> Result<StartedRound, AppError> {
    state.room_service.mark_started(room_code).await?;

    match state.game_service.start_game(room_code).await {
        Ok(started) => Ok(started),
        Err(e) => {
            warn!(room_code = %room_code, error = %e, "Round failed to start, reopening room");
            state.room_service.clear_started(room_code).await;
            Err(e)
        }
    }
}

/// HTTP handler for starting a room's round
///
/// POST /room/:code/start
#[instrument(name = "start_game", skip(state))]
pub async fn start_game(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<Json<StartGameResponse>, AppError> {
    let started = start_room_round(&state, &room_code).await?;

    info!(
        room_code = %room_code,
        game_id = %started.game_id,
        "Round started over HTTP"
    );

    Ok(Json(started.into()))
}
