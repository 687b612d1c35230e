use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{GameType, WinPattern};
use crate::room::types::RoomDetails;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    // Client -> Server
    Join,
    Leave,
    StartGame,
    CallNumber,
    MarkNumber,
    ClaimWin,
    Ping,

    // Both directions
    Chat,

    // Server -> Client
    RoomState,
    PlayerJoined,
    PlayerLeft,
    NewHost,
    GameStarted,
    NumberCalled,
    PlayerMarked,
    Winner,
    Pong,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub room_code: String,
    pub player_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkNumberPayload {
    pub number: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimWinPayload {
    pub pattern: WinPattern,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatePayload {
    pub room: RoomDetails,
    pub player_id: String,
    /// Present once a round has dealt this player a board
    pub board: Option<Vec<u8>>,
    pub called_numbers: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPayload {
    pub player_id: String,
    pub player_name: String,
    pub player_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHostPayload {
    pub player_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartedPayload {
    pub game_id: String,
    pub game_type: GameType,
    /// The recipient's own board
    pub board: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberCalledPayload {
    pub number: u8,
    pub called_numbers: Vec<u8>,
    pub remaining: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMarkedPayload {
    pub player_id: String,
    pub number: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerPayload {
    pub player_id: String,
    pub player_name: String,
    pub pattern: WinPattern,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    // Payload structs here are plain data; serializing them cannot fail.
    fn with_payload<T: Serialize>(message_type: MessageType, payload: &T) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Reads the payload as `T`
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Stamps the message with the time its event was committed
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.meta = Some(WebSocketMessageMeta { timestamp });
        self
    }

    pub fn room_state(
        room: RoomDetails,
        player_id: String,
        board: Option<Vec<u8>>,
        called_numbers: Vec<u8>,
    ) -> Self {
        Self::with_payload(
            MessageType::RoomState,
            &RoomStatePayload {
                room,
                player_id,
                board,
                called_numbers,
            },
        )
    }

    pub fn player_joined(player_id: String, player_name: String, player_count: usize) -> Self {
        Self::with_payload(
            MessageType::PlayerJoined,
            &MembershipPayload {
                player_id,
                player_name,
                player_count,
            },
        )
    }

    pub fn player_left(player_id: String, player_name: String, player_count: usize) -> Self {
        Self::with_payload(
            MessageType::PlayerLeft,
            &MembershipPayload {
                player_id,
                player_name,
                player_count,
            },
        )
    }

    pub fn new_host(player_id: String, player_name: String) -> Self {
        Self::with_payload(
            MessageType::NewHost,
            &NewHostPayload {
                player_id,
                player_name,
            },
        )
    }

    pub fn chat(sender_id: String, sender_name: String, message: String) -> Self {
        Self::with_payload(
            MessageType::Chat,
            &ChatMessagePayload {
                sender_id,
                sender_name,
                message,
            },
        )
    }

    pub fn game_started(game_id: String, game_type: GameType, board: Vec<u8>) -> Self {
        Self::with_payload(
            MessageType::GameStarted,
            &GameStartedPayload {
                game_id,
                game_type,
                board,
            },
        )
    }

    pub fn number_called(number: u8, called_numbers: Vec<u8>, remaining: usize) -> Self {
        Self::with_payload(
            MessageType::NumberCalled,
            &NumberCalledPayload {
                number,
                called_numbers,
                remaining,
            },
        )
    }

    pub fn player_marked(player_id: String, number: u8) -> Self {
        Self::with_payload(
            MessageType::PlayerMarked,
            &PlayerMarkedPayload { player_id, number },
        )
    }

    pub fn winner(player_id: String, player_name: String, pattern: WinPattern, score: i64) -> Self {
        Self::with_payload(
            MessageType::Winner,
            &WinnerPayload {
                player_id,
                player_name,
                pattern,
                score,
            },
        )
    }

    pub fn pong() -> Self {
        Self::new(MessageType::Pong, serde_json::json!({}))
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Self {
        Self::with_payload(
            MessageType::Error,
            &ErrorPayload {
                success: false,
                message,
            },
        )
    }
}
