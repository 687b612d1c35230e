use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    event::{EventBus, RoomEvent},
    game::{
        auto_caller,
        core::{Game, GameError, MarkOutcome, WinRecord},
        repository::{GameRepository, SharedGame},
        variant::{GameType, WinPattern},
    },
    room::{lifecycle::RoundLifecycle, models::RoomSettings},
    shared::AppError,
};

impl From<GameError> for AppError {
    fn from(error: GameError) -> Self {
        match error {
            GameError::AlreadyStarted => AppError::GameAlreadyStarted,
            GameError::InsufficientPlayers(_) => AppError::InsufficientPlayers,
            GameError::NotStarted => AppError::GameNotStarted,
            GameError::Ended => AppError::GameEnded,
            GameError::DuplicatePlayer => AppError::BadRequest(error.to_string()),
        }
    }
}

/// Result of opening a round
#[derive(Debug, Clone)]
pub struct StartedRound {
    pub game_id: String,
    pub game_type: GameType,
    /// (player id, board) in join order
    pub boards: Vec<(String, Vec<u8>)>,
}

pub struct GameService {
    game_repository: GameRepository,
    event_bus: EventBus,
}

impl GameService {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            game_repository: GameRepository::new(),
            event_bus,
        }
    }

    /// Registers a player for the room's upcoming round. Re-adding a
    /// player already in the round is a no-op, even once it has started.
    #[instrument(skip(self))]
    pub async fn add_player(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
    ) -> Result<(), AppError> {
        let handle = self.round(room_code).await?;
        let mut game = handle.lock().await;
        if game.player(player_id).is_some() {
            return Ok(());
        }
        game.add_player(player_id, player_name)?;
        Ok(())
    }

    /// Drops a player from the round. A round in progress left with no
    /// players is deleted; ended rounds wait for the sweep.
    #[instrument(skip(self))]
    pub async fn remove_player(&self, room_code: &str, player_id: &str) -> bool {
        let Some(handle) = self.game_repository.get_game(room_code).await else {
            return false;
        };

        let (removed, abandoned) = {
            let mut game = handle.lock().await;
            let removed = game.remove_player(player_id);
            (
                removed,
                game.is_started() && !game.is_ended() && game.is_empty(),
            )
        };

        if abandoned && self.game_repository.remove_if_same(room_code, &handle).await {
            info!(room_code = %room_code, "Abandoned round removed");
        }
        removed
    }

    /// Deals boards and opens the round. When the room asked for
    /// auto-calling, a caller task is spawned for it.
    #[instrument(skip(self))]
    pub async fn start_game(self: &Arc<Self>, room_code: &str) -> Result<StartedRound, AppError> {
        let handle = self.round(room_code).await?;
        let mut game = handle.lock().await;
        game.start()?;

        let started = StartedRound {
            game_id: game.id().to_string(),
            game_type: game.game_type(),
            boards: game
                .players()
                .iter()
                .map(|p| (p.id.clone(), p.board.clone()))
                .collect(),
        };

        info!(
            room_code = %room_code,
            game_id = %started.game_id,
            game_type = %started.game_type,
            player_count = started.boards.len(),
            "Round started"
        );

        self.event_bus
            .emit_to_room(
                room_code,
                RoomEvent::GameStarted {
                    game_id: started.game_id.clone(),
                    game_type: started.game_type,
                    boards: started.boards.clone(),
                },
            )
            .await;

        let settings = game.settings();
        if settings.auto_call {
            auto_caller::spawn_auto_caller(
                Arc::clone(self),
                room_code.to_string(),
                Arc::clone(&handle),
                std::time::Duration::from_secs(settings.call_interval_secs),
            );
        }

        Ok(started)
    }

    /// Draws the next number; `Ok(None)` once the range is exhausted
    #[instrument(skip(self))]
    pub async fn call_number(&self, room_code: &str) -> Result<Option<u8>, AppError> {
        let handle = self.round(room_code).await?;
        self.draw(room_code, &handle).await
    }

    /// Draws on a specific round, failing if it has been replaced or torn down
    pub(crate) async fn call_number_on(
        &self,
        room_code: &str,
        handle: &SharedGame,
    ) -> Result<Option<u8>, AppError> {
        let current = self.round(room_code).await?;
        if !Arc::ptr_eq(&current, handle) {
            return Err(AppError::GameNotFound);
        }
        self.draw(room_code, handle).await
    }

    async fn draw(&self, room_code: &str, handle: &SharedGame) -> Result<Option<u8>, AppError> {
        let mut game = handle.lock().await;
        let Some(number) = game.call_number()? else {
            debug!(room_code = %room_code, "Numbers exhausted");
            return Ok(None);
        };

        debug!(room_code = %room_code, number = number, "Number called");
        self.event_bus
            .emit_to_room(
                room_code,
                RoomEvent::NumberCalled {
                    number,
                    called_numbers: game.called_numbers().to_vec(),
                    remaining: game.remaining_numbers(),
                },
            )
            .await;

        Ok(Some(number))
    }

    /// Marks a drawn number on a player's board. Anything that cannot be
    /// applied comes back as `MarkOutcome::Rejected`.
    #[instrument(skip(self))]
    pub async fn mark_number(&self, room_code: &str, player_id: &str, number: u8) -> MarkOutcome {
        let Some(handle) = self.game_repository.get_game(room_code).await else {
            return MarkOutcome::Rejected;
        };
        let mut game = handle.lock().await;
        let outcome = game.mark_number(player_id, number);

        if matches!(outcome, MarkOutcome::Marked | MarkOutcome::Won(_)) {
            self.event_bus
                .emit_to_room_except(
                    room_code,
                    RoomEvent::PlayerMarked {
                        player_id: player_id.to_string(),
                        number,
                    },
                    player_id,
                )
                .await;
        }
        if let MarkOutcome::Won(record) = &outcome {
            self.announce_winner(room_code, record).await;
        }

        outcome
    }

    /// Checks an explicit claim for one pattern; ends the round if it holds
    #[instrument(skip(self))]
    pub async fn claim_win(
        &self,
        room_code: &str,
        player_id: &str,
        pattern: WinPattern,
    ) -> Option<WinRecord> {
        let handle = self.game_repository.get_game(room_code).await?;
        let mut game = handle.lock().await;

        let Some(record) = game.claim_win(player_id, pattern) else {
            debug!(room_code = %room_code, player_id = %player_id, pattern = %pattern, "Claim rejected");
            return None;
        };
        self.announce_winner(room_code, &record).await;
        Some(record)
    }

    async fn announce_winner(&self, room_code: &str, record: &WinRecord) {
        info!(
            room_code = %room_code,
            player_id = %record.player_id,
            pattern = %record.pattern,
            score = record.score,
            "Round won"
        );
        self.event_bus
            .emit_to_room(
                room_code,
                RoomEvent::Winner {
                    player_id: record.player_id.clone(),
                    player_name: record.player_name.clone(),
                    pattern: record.pattern,
                    score: record.score,
                },
            )
            .await;
    }

    /// Copy of the room's round state (read-only access)
    pub async fn get_game(&self, room_code: &str) -> Option<Game> {
        let handle = self.game_repository.get_game(room_code).await?;
        let game = handle.lock().await;
        Some(game.clone())
    }

    /// Removes rounds that have ended and have no players left.
    /// Returns how many were removed.
    #[instrument(skip(self))]
    pub async fn sweep_finished_rounds(&self) -> usize {
        let mut removed = 0;
        for (room_code, handle) in self.game_repository.snapshot().await {
            let finished = {
                let game = handle.lock().await;
                game.is_ended() && game.is_empty()
            };
            if finished && self.game_repository.remove_if_same(&room_code, &handle).await {
                debug!(room_code = %room_code, "Finished round swept");
                removed += 1;
            }
        }
        removed
    }

    pub async fn game_count(&self) -> usize {
        self.game_repository.game_count().await
    }

    async fn round(&self, room_code: &str) -> Result<SharedGame, AppError> {
        self.game_repository
            .get_game(room_code)
            .await
            .ok_or(AppError::GameNotFound)
    }
}

#[async_trait]
impl RoundLifecycle for GameService {
    async fn initialize_round(
        &self,
        room_code: &str,
        game_type: GameType,
        stake: i64,
        settings: RoomSettings,
    ) -> Result<(), AppError> {
        if self.game_repository.get_game(room_code).await.is_some() {
            warn!(room_code = %room_code, "Replacing a stale round context");
        }
        self.game_repository
            .insert_game(Game::new(room_code.to_string(), game_type, stake, settings))
            .await;
        debug!(room_code = %room_code, game_type = %game_type, "Round context created");
        Ok(())
    }

    async fn teardown_round(&self, room_code: &str) {
        if self.game_repository.remove_game(room_code).await.is_some() {
            debug!(room_code = %room_code, "Round context removed");
        }
    }
}
