use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{PlayerModel, RoomModel, RoomSettings};
use crate::game::GameType;

/// Request payload for creating a new room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub host_name: String,
    #[serde(default)]
    pub room_name: String,
    pub max_players: i64,
    pub game_type: GameType,
    #[serde(default)]
    pub stake: i64,
    #[serde(default)]
    pub settings: Option<RoomSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub success: bool,
    pub room_code: String,
    pub room_id: String,
    /// Identity the creator connects with
    pub player_id: String,
}

/// Request payload for reserving a seat before connecting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub success: bool,
    pub room_code: String,
    pub player_id: String,
    pub player_name: String,
}

/// One entry of the lobby listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: String,
    pub name: String,
    pub host_name: Option<String>,
    pub game_type: GameType,
    pub stake: i64,
    pub player_count: usize,
    pub max_players: usize,
    pub started: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&RoomModel> for RoomSummary {
    fn from(room: &RoomModel) -> Self {
        Self {
            code: room.code.clone(),
            name: room.name.clone(),
            host_name: room.host().map(|host| host.name.clone()),
            game_type: room.game_type,
            stake: room.stake,
            player_count: room.player_count(),
            max_players: room.max_players,
            started: room.started,
            created_at: room.created_at,
        }
    }
}

/// Full room snapshot for lookups and the websocket room state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    pub code: String,
    pub id: String,
    pub name: String,
    pub host_id: Option<String>,
    pub game_type: GameType,
    pub stake: i64,
    pub max_players: usize,
    pub started: bool,
    pub created_at: DateTime<Utc>,
    pub settings: RoomSettings,
    pub players: Vec<PlayerModel>,
}

impl From<&RoomModel> for RoomDetails {
    fn from(room: &RoomModel) -> Self {
        Self {
            code: room.code.clone(),
            id: room.id.clone(),
            name: room.name.clone(),
            host_id: room.host_id.clone(),
            game_type: room.game_type,
            stake: room.stake,
            max_players: room.max_players,
            started: room.started,
            created_at: room.created_at,
            settings: room.settings.clone(),
            players: room.players.clone(),
        }
    }
}
