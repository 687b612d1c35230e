use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::game::core::Game;

/// One round behind its own lock; calls and marks on it are linearizable.
pub type SharedGame = Arc<Mutex<Game>>;

pub struct GameRepository {
    /// A mapping from room code to that room's round
    games: RwLock<HashMap<String, SharedGame>>,
}

impl Default for GameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRepository {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a fresh round, replacing whatever the room had before.
    pub async fn insert_game(&self, game: Game) -> SharedGame {
        let room_code = game.room_code().to_string();
        let handle = Arc::new(Mutex::new(game));
        self.games
            .write()
            .await
            .insert(room_code, Arc::clone(&handle));
        handle
    }

    pub async fn get_game(&self, room_code: &str) -> Option<SharedGame> {
        self.games.read().await.get(room_code).cloned()
    }

    pub async fn remove_game(&self, room_code: &str) -> Option<SharedGame> {
        self.games.write().await.remove(room_code)
    }

    /// Removes the round only if `handle` is still the stored one.
    pub async fn remove_if_same(&self, room_code: &str, handle: &SharedGame) -> bool {
        let mut games = self.games.write().await;
        let is_same = games
            .get(room_code)
            .is_some_and(|stored| Arc::ptr_eq(stored, handle));
        if is_same {
            games.remove(room_code);
        }
        is_same
    }

    /// Point-in-time copy of every (code, round) pair
    pub async fn snapshot(&self) -> Vec<(String, SharedGame)> {
        self.games
            .read()
            .await
            .iter()
            .map(|(code, game)| (code.clone(), Arc::clone(game)))
            .collect()
    }

    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }
}
