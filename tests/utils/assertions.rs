//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use bingo::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all connected players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.iter().map(|s| s.0.as_str()).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    async fn parsed_messages(&self, player: &str) -> Vec<WebSocketMessage> {
        let connection = self.setup.connection_of(player);
        self.setup
            .mock_conn_manager
            .get_messages_for(connection)
            .await
            .iter()
            .map(|raw| serde_json::from_str(raw).unwrap())
            .collect()
    }

    /// Assert that players received a specific message type (consumes the message from queue)
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for player in &self.players {
            let connection = self.setup.connection_of(player);
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection)
                .await;
            assert!(
                message.is_some(),
                "{} should have received a message",
                player
            );

            let msg: WebSocketMessage = serde_json::from_str(&message.unwrap()).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                player
            );
            messages.push(msg);
        }

        // Boards differ per player, so only other types must agree on payload
        if messages.len() > 1 && expected_type != MessageType::GameStarted {
            let first_payload = &messages[0].payload;
            for (i, msg) in messages.iter().enumerate().skip(1) {
                assert_eq!(
                    &msg.payload, first_payload,
                    "Player {} payload differs from player {}",
                    self.players[i], self.players[0]
                );
            }
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that players received no messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self.parsed_messages(player).await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages.iter().map(|m| &m.message_type).collect::<Vec<_>>()
            );
        }
    }

    /// Count how many messages of a specific type a player received (non-consuming)
    pub async fn count_message_type(&self, player: &str, msg_type: MessageType) -> usize {
        self.parsed_messages(player)
            .await
            .iter()
            .filter(|msg| msg.message_type == msg_type)
            .count()
    }

    /// Payload of the last message of a type a player received (non-consuming)
    pub async fn last_of_type(&self, player: &str, msg_type: MessageType) -> Option<MessageContent> {
        self.parsed_messages(player)
            .await
            .into_iter()
            .rev()
            .find(|msg| msg.message_type == msg_type)
            .map(|msg| MessageContent {
                payload: msg.payload,
            })
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: serde_json::Value,
}

impl MessageContent {
    pub fn with_player(self, expected_player: &str) -> Self {
        assert_eq!(self.payload["playerId"], expected_player);
        self
    }

    pub fn with_player_count(self, expected: usize) -> Self {
        assert_eq!(self.payload["playerCount"], expected);
        self
    }

    pub fn with_message(self, expected: &str) -> Self {
        assert_eq!(self.payload["message"], expected);
        self
    }

    pub fn with_score(self, expected: i64) -> Self {
        assert_eq!(self.payload["score"], expected);
        self
    }

    pub fn board(&self) -> Vec<u8> {
        serde_json::from_value(self.payload["board"].clone()).unwrap()
    }
}
