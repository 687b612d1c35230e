use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{GameType, WinPattern};

/// Facts about a room that its members need to hear about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomEvent {
    PlayerJoined {
        player_id: String,
        player_name: String,
        player_count: usize,
    },
    PlayerLeft {
        player_id: String,
        player_name: String,
        player_count: usize,
    },
    NewHost {
        player_id: String,
        player_name: String,
    },
    Chat {
        sender_id: String,
        sender_name: String,
        message: String,
    },
    /// Each player only ever sees their own entry in `boards`.
    GameStarted {
        game_id: String,
        game_type: GameType,
        boards: Vec<(String, Vec<u8>)>,
    },
    NumberCalled {
        number: u8,
        called_numbers: Vec<u8>,
        remaining: usize,
    },
    PlayerMarked {
        player_id: String,
        number: u8,
    },
    Winner {
        player_id: String,
        player_name: String,
        pattern: WinPattern,
        score: i64,
    },
}

impl RoomEvent {
    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::PlayerJoined { .. } => "player_joined",
            RoomEvent::PlayerLeft { .. } => "player_left",
            RoomEvent::NewHost { .. } => "new_host",
            RoomEvent::Chat { .. } => "chat",
            RoomEvent::GameStarted { .. } => "game_started",
            RoomEvent::NumberCalled { .. } => "number_called",
            RoomEvent::PlayerMarked { .. } => "player_marked",
            RoomEvent::Winner { .. } => "winner",
        }
    }
}

/// An event as it travels through a room channel.
#[derive(Debug, Clone)]
pub struct RoomBroadcast {
    pub event: RoomEvent,
    /// Player who triggered the event and should not get it back.
    pub exclude: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RoomBroadcast {
    pub fn new(event: RoomEvent, exclude: Option<String>) -> Self {
        Self {
            event,
            exclude,
            timestamp: Utc::now(),
        }
    }
}
