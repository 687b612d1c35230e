// Authoritative state of one round. Everything here is synchronous; the
// repository wraps each Game in its own lock so callers never observe a
// half-applied transition.
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::board::BoardGenerator;
use super::patterns::BoardView;
use super::variant::{GameType, WinPattern};
use crate::room::models::RoomSettings;

/// Share of the pot paid to the winner, as a fraction of 5 (80%).
const WINNER_SHARE_FIFTHS: i64 = 4;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Game already started")]
    AlreadyStarted,
    #[error("Need at least 2 players to start, have {0}")]
    InsufficientPlayers(usize),
    #[error("Game has not started")]
    NotStarted,
    #[error("Game has ended")]
    Ended,
    #[error("Player already in game")]
    DuplicatePlayer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePlayer {
    pub id: String,
    pub name: String,
    pub board: Vec<u8>,
    pub marked: HashSet<u8>,
    pub has_won: bool,
    pub won_at: Option<DateTime<Utc>>,
    pub score_delta: i64,
}

impl GamePlayer {
    fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            board: Vec::new(),
            marked: HashSet::new(),
            has_won: false,
            won_at: None,
            score_delta: 0,
        }
    }
}

/// Outcome recorded when a round ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub player_id: String,
    pub player_name: String,
    pub pattern: WinPattern,
    pub score: i64,
}

/// What a mark request did to the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Not started, ended, unknown player, or a number that was never drawn
    /// or is not on the board.
    Rejected,
    /// Already marked; nothing changed.
    Unchanged,
    Marked,
    Won(WinRecord),
}

impl MarkOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, MarkOutcome::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: String,
    room_code: String,
    game_type: GameType,
    stake: i64,
    settings: RoomSettings,
    started: bool,
    ended: bool,
    winner: Option<String>,
    win_pattern: Option<WinPattern>,
    called_numbers: Vec<u8>,
    current_number: Option<u8>,
    board_seed: u64,
    players: Vec<GamePlayer>,
}

impl Game {
    pub fn new(room_code: String, game_type: GameType, stake: i64, settings: RoomSettings) -> Self {
        Self::with_seed(room_code, game_type, stake, settings, rand::random())
    }

    pub fn with_seed(
        room_code: String,
        game_type: GameType,
        stake: i64,
        settings: RoomSettings,
        board_seed: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_code,
            game_type,
            stake,
            settings,
            started: false,
            ended: false,
            winner: None,
            win_pattern: None,
            called_numbers: Vec::new(),
            current_number: None,
            board_seed,
            players: Vec::new(),
        }
    }

    pub fn add_player(&mut self, player_id: &str, player_name: &str) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.player(player_id).is_some() {
            return Err(GameError::DuplicatePlayer);
        }
        self.players
            .push(GamePlayer::new(player_id.to_string(), player_name.to_string()));
        Ok(())
    }

    /// Returns true if the player was in the round.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.players.len() != before
    }

    /// Deals every registered player a board and opens the round.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(GameError::InsufficientPlayers(self.players.len()));
        }

        let mut generator = BoardGenerator::from_seed(self.board_seed);
        for player in &mut self.players {
            player.board = generator.next_board(self.game_type);
        }
        self.started = true;
        Ok(())
    }

    /// Draws the next number, or `Ok(None)` once the whole range is used.
    pub fn call_number(&mut self) -> Result<Option<u8>, GameError> {
        self.call_number_with(&mut rand::rng())
    }

    /// Uniform draw over the full range, resampling anything already drawn.
    pub fn call_number_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<u8>, GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if self.ended {
            return Err(GameError::Ended);
        }

        let max = self.game_type.max_number();
        if self.called_numbers.len() >= max as usize {
            return Ok(None);
        }

        let number = loop {
            let candidate = rng.random_range(1..=max);
            if !self.called_numbers.contains(&candidate) {
                break candidate;
            }
        };

        self.called_numbers.push(number);
        self.current_number = Some(number);
        Ok(Some(number))
    }

    /// Records a mark and checks the enabled patterns in priority order.
    pub fn mark_number(&mut self, player_id: &str, number: u8) -> MarkOutcome {
        if !self.started || self.ended || !self.called_numbers.contains(&number) {
            return MarkOutcome::Rejected;
        }

        let layout = self.game_type.layout();
        let enabled = self.enabled_patterns();
        let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) else {
            return MarkOutcome::Rejected;
        };
        if !player.board.contains(&number) {
            return MarkOutcome::Rejected;
        }
        if !player.marked.insert(number) {
            return MarkOutcome::Unchanged;
        }

        let winning = BoardView::new(&player.board, &player.marked, layout)
            .first_winning_pattern(&enabled);
        match winning {
            Some(pattern) => MarkOutcome::Won(self.record_win(player_id, pattern)),
            None => MarkOutcome::Marked,
        }
    }

    /// Verifies a player's explicit claim for one pattern.
    pub fn claim_win(&mut self, player_id: &str, pattern: WinPattern) -> Option<WinRecord> {
        if !self.started || self.ended || !self.enabled_patterns().contains(&pattern) {
            return None;
        }

        let layout = self.game_type.layout();
        let player = self.player(player_id)?;
        let holds = BoardView::new(&player.board, &player.marked, layout).satisfies(pattern);
        holds.then(|| self.record_win(player_id, pattern))
    }

    // Callers have checked `ended` is false and that the player exists.
    fn record_win(&mut self, player_id: &str, pattern: WinPattern) -> WinRecord {
        let score = self.payout();
        let now = Utc::now();

        self.ended = true;
        self.winner = Some(player_id.to_string());
        self.win_pattern = Some(pattern);

        let mut player_name = String::new();
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.has_won = true;
            player.won_at = Some(now);
            player.score_delta += score;
            player_name = player.name.clone();
        }

        WinRecord {
            player_id: player_id.to_string(),
            player_name,
            pattern,
            score,
        }
    }

    /// floor(0.8 * stake * players), in integers. Saturates at `i64::MAX`.
    pub fn payout(&self) -> i64 {
        let pot = i128::from(self.stake) * self.players.len() as i128;
        i64::try_from(pot * i128::from(WINNER_SHARE_FIFTHS) / 5).unwrap_or(i64::MAX)
    }

    pub fn enabled_patterns(&self) -> Vec<WinPattern> {
        self.game_type
            .effective_patterns(&self.settings.enabled_patterns)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn win_pattern(&self) -> Option<WinPattern> {
        self.win_pattern
    }

    pub fn called_numbers(&self) -> &[u8] {
        &self.called_numbers
    }

    pub fn current_number(&self) -> Option<u8> {
        self.current_number
    }

    pub fn remaining_numbers(&self) -> usize {
        self.game_type.max_number() as usize - self.called_numbers.len()
    }

    pub fn players(&self) -> &[GamePlayer] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&GamePlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with(game_type: GameType, stake: i64, players: &[&str]) -> Game {
        let mut game = Game::with_seed(
            "test-room".to_string(),
            game_type,
            stake,
            RoomSettings::for_game_type(game_type),
            1234,
        );
        for player in players {
            game.add_player(player, &format!("{}-name", player)).unwrap();
        }
        game
    }

    /// Draws until every number in `wanted` has been called.
    fn call_until_drawn(game: &mut Game, wanted: &[u8]) {
        while !wanted.iter().all(|n| game.called_numbers().contains(n)) {
            game.call_number().unwrap().expect("range exhausted early");
        }
    }

    #[test]
    fn test_start_requires_two_players() {
        let mut game = game_with(GameType::Classic75, 10, &["alice"]);
        assert_eq!(game.start(), Err(GameError::InsufficientPlayers(1)));
        assert!(!game.is_started());

        game.add_player("bob", "Bob").unwrap();
        assert_eq!(game.start(), Ok(()));
        assert_eq!(game.start(), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_start_deals_boards_once() {
        let mut game = game_with(GameType::Classic75, 0, &["alice", "bob"]);
        game.start().unwrap();

        for player in game.players() {
            assert_eq!(player.board.len(), 25);
        }
        assert_eq!(game.add_player("carol", "Carol"), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_call_number_exhausts_range_without_repeats() {
        let mut game = game_with(GameType::Speed30, 0, &["alice", "bob"]);
        assert_eq!(game.call_number(), Err(GameError::NotStarted));
        game.start().unwrap();

        let mut seen = HashSet::new();
        for _ in 0..30 {
            let number = game.call_number().unwrap().unwrap();
            assert!((1..=30).contains(&number));
            assert!(seen.insert(number), "number {} drawn twice", number);
            assert_eq!(game.current_number(), Some(number));
        }

        assert_eq!(game.remaining_numbers(), 0);
        assert_eq!(game.call_number(), Ok(None));
        assert_eq!(game.call_number(), Ok(None));
    }

    #[test]
    fn test_mark_rejects_undrawn_and_foreign_numbers() {
        let mut game = game_with(GameType::Classic75, 0, &["alice", "bob"]);
        assert_eq!(game.mark_number("alice", 1), MarkOutcome::Rejected);

        game.start().unwrap();
        let board = game.player("alice").unwrap().board.clone();

        // Not drawn yet.
        assert_eq!(game.mark_number("alice", board[0]), MarkOutcome::Rejected);

        call_until_drawn(&mut game, &[board[0]]);
        assert_eq!(game.mark_number("nobody", board[0]), MarkOutcome::Rejected);
        assert_eq!(game.mark_number("alice", board[0]), MarkOutcome::Marked);
        assert_eq!(game.mark_number("alice", board[0]), MarkOutcome::Unchanged);

        let off_board = (1..=75).find(|n| !board.contains(n)).unwrap();
        call_until_drawn(&mut game, &[off_board]);
        assert_eq!(game.mark_number("alice", off_board), MarkOutcome::Rejected);
    }

    #[test]
    fn test_payout_does_not_overflow_large_stakes() {
        let stake = i64::MAX / 4;
        let game = game_with(GameType::Classic75, stake, &["alice", "bob"]);
        assert_eq!(
            i128::from(game.payout()),
            i128::from(stake) * 2 * 4 / 5
        );

        let game = game_with(GameType::Classic75, i64::MAX, &["alice", "bob"]);
        assert_eq!(game.payout(), i64::MAX);
    }

    #[test]
    fn test_row_win_ends_round_with_payout() {
        let mut game = game_with(GameType::Classic75, 100, &["alice", "bob"]);
        game.start().unwrap();

        let top_row: Vec<u8> = game.player("alice").unwrap().board[0..5].to_vec();
        call_until_drawn(&mut game, &top_row);

        for number in &top_row[..4] {
            assert_eq!(game.mark_number("alice", *number), MarkOutcome::Marked);
        }
        let outcome = game.mark_number("alice", top_row[4]);

        let expected = WinRecord {
            player_id: "alice".to_string(),
            player_name: "alice-name".to_string(),
            pattern: WinPattern::Row,
            score: 160,
        };
        assert_eq!(outcome, MarkOutcome::Won(expected));
        assert!(game.is_ended());
        assert_eq!(game.winner(), Some("alice"));
        assert_eq!(game.win_pattern(), Some(WinPattern::Row));
        assert_eq!(game.player("alice").unwrap().score_delta, 160);
        assert!(game.player("alice").unwrap().won_at.is_some());
    }

    #[test]
    fn test_no_second_win_after_end() {
        let mut game = game_with(GameType::Classic75, 10, &["alice", "bob"]);
        game.start().unwrap();

        let alice_row: Vec<u8> = game.player("alice").unwrap().board[0..5].to_vec();
        let bob_board = game.player("bob").unwrap().board.clone();
        call_until_drawn(&mut game, &alice_row);
        for number in &alice_row {
            game.mark_number("alice", *number);
        }
        assert!(game.is_ended());

        assert_eq!(game.call_number(), Err(GameError::Ended));
        for number in bob_board {
            assert_eq!(game.mark_number("bob", number), MarkOutcome::Rejected);
        }
        assert_eq!(game.claim_win("bob", WinPattern::Row), None);
        assert_eq!(game.winner(), Some("alice"));
        assert_eq!(game.win_pattern(), Some(WinPattern::Row));
    }

    #[test]
    fn test_full_house_only_after_every_cell() {
        let mut settings = RoomSettings::for_game_type(GameType::Classic75);
        settings.enabled_patterns = vec![WinPattern::FullHouse];
        let mut game = Game::with_seed("room".to_string(), GameType::Classic75, 0, settings, 5);
        game.add_player("alice", "Alice").unwrap();
        game.add_player("bob", "Bob").unwrap();
        game.start().unwrap();

        let board = game.player("alice").unwrap().board.clone();
        let cells: Vec<u8> = board
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != 12)
            .map(|(_, n)| *n)
            .collect();
        call_until_drawn(&mut game, &cells);

        for number in &cells[..cells.len() - 1] {
            assert_eq!(game.mark_number("alice", *number), MarkOutcome::Marked);
            // Repeat marks are idempotent.
            assert_eq!(game.mark_number("alice", *number), MarkOutcome::Unchanged);
        }
        assert!(!game.is_ended());

        let outcome = game.mark_number("alice", cells[cells.len() - 1]);
        assert!(matches!(
            outcome,
            MarkOutcome::Won(WinRecord {
                pattern: WinPattern::FullHouse,
                ..
            })
        ));
    }

    #[test]
    fn test_claim_win_verifies_marks() {
        let mut game = game_with(GameType::Speed30, 50, &["alice", "bob", "carol"]);
        game.start().unwrap();
        assert_eq!(game.claim_win("alice", WinPattern::Row), None);

        let row: Vec<u8> = game.player("alice").unwrap().board[0..3].to_vec();
        call_until_drawn(&mut game, &row);
        // Mark the first two directly so the win is left to the claim.
        game.mark_number("alice", row[0]);
        game.mark_number("alice", row[1]);
        assert_eq!(game.claim_win("alice", WinPattern::Row), None);

        game.players
            .iter_mut()
            .find(|p| p.id == "alice")
            .unwrap()
            .marked
            .insert(row[2]);
        assert_eq!(game.claim_win("alice", WinPattern::FourCorners), None);

        let record = game.claim_win("alice", WinPattern::Row).unwrap();
        assert_eq!(record.score, 120);
        assert!(game.is_ended());
    }

    #[test]
    fn test_remove_player_and_empty() {
        let mut game = game_with(GameType::Classic75, 0, &["alice", "bob"]);
        assert!(game.remove_player("alice"));
        assert!(!game.remove_player("alice"));
        assert!(!game.is_empty());
        assert!(game.remove_player("bob"));
        assert!(game.is_empty());
    }
}
