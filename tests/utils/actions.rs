#![allow(dead_code)]

use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use bingo::{ConnectionId, MessageHandler, WinPattern};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

/// Gives the room subscription task time to deliver fanned-out events
pub async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

impl TestSetup {
    /// Send a raw WebSocket frame and wait for processing
    pub async fn send_raw(&self, connection: ConnectionId, frame: Value) {
        self.input_handler
            .handle_message(connection, frame.to_string())
            .await;
        settle().await;
    }

    pub async fn send_as(&self, player: &str, frame: Value) {
        self.send_raw(self.connection_of(player), frame).await;
    }

    pub async fn send_join(&self, connection: ConnectionId, player: &str) {
        self.send_raw(
            connection,
            json!({"type": "join", "payload": {
                "roomCode": self.room_code,
                "playerId": player,
                "playerName": player,
            }}),
        )
        .await;
    }

    pub async fn send_leave(&self, player: &str) {
        self.send_as(player, json!({"type": "leave"})).await;
    }

    pub async fn send_chat(&self, player: &str, message: &str) {
        self.send_as(player, json!({"type": "chat", "payload": {"message": message}}))
            .await;
    }

    pub async fn send_start_game(&self, player: &str) {
        self.send_as(player, json!({"type": "startGame"})).await;
    }

    pub async fn send_call_number(&self, player: &str) {
        self.send_as(player, json!({"type": "callNumber"})).await;
    }

    pub async fn send_mark(&self, player: &str, number: u8) {
        self.send_as(
            player,
            json!({"type": "markNumber", "payload": {"number": number}}),
        )
        .await;
    }

    pub async fn send_claim(&self, player: &str, pattern: WinPattern) {
        self.send_as(
            player,
            json!({"type": "claimWin", "payload": {"pattern": pattern}}),
        )
        .await;
    }

    /// Host calls numbers and every player marks whatever is on their board,
    /// until the round ends. Returns how many numbers were called.
    pub async fn play_until_winner(&self, host: &str) -> usize {
        let players: Vec<String> = self.players.iter().map(|(id, _)| id.clone()).collect();

        loop {
            self.send_call_number(host).await;

            let game = self
                .state
                .game_service
                .get_game(&self.room_code)
                .await
                .expect("round exists");
            let called = game.called_numbers().len();
            let Some(number) = game.current_number() else {
                panic!("no number was called");
            };

            for player in &players {
                let on_board = game
                    .player(player)
                    .map(|p| p.board.contains(&number))
                    .unwrap_or(false);
                if on_board {
                    self.send_mark(player, number).await;
                }
            }

            let game = self
                .state
                .game_service
                .get_game(&self.room_code)
                .await
                .expect("round exists");
            if game.is_ended() {
                return called;
            }
            assert!(
                called < game.game_type().max_number() as usize,
                "range exhausted without a winner"
            );
        }
    }
}
