use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{GameType, WinPattern};
use crate::shared::{AppError, ConnectionId};

/// Largest room the server will host.
pub const MAX_ROOM_PLAYERS: i64 = 100;

/// Largest per-player stake a room accepts.
pub const MAX_STAKE: i64 = 1_000_000_000;

/// Default seconds between automatic calls.
pub const DEFAULT_CALL_INTERVAL_SECS: u64 = 5;

/// Per-room options copied into the round when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub auto_call: bool,
    pub call_interval_secs: u64,
    pub enabled_patterns: Vec<WinPattern>,
}

impl RoomSettings {
    /// Manual calling with every pattern the variant supports.
    pub fn for_game_type(game_type: GameType) -> Self {
        Self {
            auto_call: false,
            call_interval_secs: DEFAULT_CALL_INTERVAL_SECS,
            enabled_patterns: game_type.supported_patterns(),
        }
    }

    pub fn validate(&self, game_type: GameType) -> Result<(), AppError> {
        if self.auto_call && self.call_interval_secs == 0 {
            return Err(AppError::InvalidConfig(
                "call interval must be at least 1 second".to_string(),
            ));
        }
        if game_type.effective_patterns(&self.enabled_patterns).is_empty() {
            return Err(AppError::InvalidConfig(format!(
                "no enabled win pattern is playable in {}",
                game_type
            )));
        }
        Ok(())
    }
}

/// A connected participant, scoped to one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerModel {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub score: i64,
    #[serde(skip)]
    pub connection: Option<ConnectionId>,
}

impl PlayerModel {
    pub fn new(id: String, name: String, connection: ConnectionId) -> Self {
        Self {
            id,
            name,
            is_host: false,
            is_ready: false,
            score: 0,
            connection: Some(connection),
        }
    }
}

/// Result of removing a player from a room's membership.
#[derive(Debug, Clone)]
pub struct RemovedPlayer {
    pub player: PlayerModel,
    /// Set when the host left and another player took over.
    pub new_host: Option<PlayerModel>,
}

/// In-memory model of a lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: String,
    pub code: String,
    pub name: String,
    pub host_id: Option<String>,
    /// Identity handed to the creator; the creator becomes host only if
    /// they are the first to attach.
    pub creator_id: String,
    pub creator_name: String,
    pub game_type: GameType,
    pub stake: i64,
    pub max_players: usize,
    pub created_at: DateTime<Utc>,
    pub started: bool,
    pub settings: RoomSettings,
    /// Ordered by join time.
    pub players: Vec<PlayerModel>,
    /// Set once the room emptied; the repository drops closed rooms.
    #[serde(skip)]
    pub closed: bool,
}

impl RoomModel {
    pub fn new(
        code: String,
        name: String,
        creator_name: String,
        game_type: GameType,
        stake: i64,
        max_players: usize,
        settings: RoomSettings,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            name,
            host_id: None,
            creator_id: Uuid::new_v4().to_string(),
            creator_name,
            game_type,
            stake,
            max_players,
            created_at: Utc::now(),
            started: false,
            settings,
            players: Vec::new(),
            closed: false,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Open for new players: not started and not full.
    pub fn is_available(&self) -> bool {
        !self.started && !self.is_full()
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerModel> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut PlayerModel> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn host(&self) -> Option<&PlayerModel> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id.as_deref() == Some(player_id)
    }

    /// Appends a player; the first player into an empty, hostless room
    /// becomes host. Returns whether they were made host.
    pub fn add_player(&mut self, mut player: PlayerModel) -> bool {
        let becomes_host = self.players.is_empty() && self.host_id.is_none();
        player.is_host = becomes_host;
        if becomes_host {
            self.host_id = Some(player.id.clone());
        }
        self.players.push(player);
        becomes_host
    }

    /// Removes a player, handing host status to the earliest-joined
    /// survivor when the host leaves.
    pub fn remove_player(&mut self, player_id: &str) -> Option<RemovedPlayer> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let player = self.players.remove(index);

        let mut new_host = None;
        if self.is_host(player_id) {
            self.host_id = None;
            if let Some(successor) = self.players.first_mut() {
                successor.is_host = true;
                self.host_id = Some(successor.id.clone());
                new_host = Some(successor.clone());
            }
        }

        Some(RemovedPlayer { player, new_host })
    }
}
