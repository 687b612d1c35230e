// Public API
pub use self::core::{Game, GameError, GamePlayer, MarkOutcome, WinRecord};
pub use handlers::start_game;
pub use service::{GameService, StartedRound};
pub use variant::{BoardLayout, GameType, WinPattern};

pub(crate) use handlers::start_room_round;

// Internal modules
mod auto_caller;
pub mod board;
mod core;
mod handlers;
pub mod patterns;
mod repository;
mod service;
mod variant;
