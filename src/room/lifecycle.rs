use async_trait::async_trait;

use crate::game::GameType;
use crate::shared::AppError;

use super::models::RoomSettings;

/// The only view the registry has of the round engine: it can open a round
/// context for a new room and drop it when the room goes away.
#[async_trait]
pub trait RoundLifecycle: Send + Sync {
    async fn initialize_round(
        &self,
        room_code: &str,
        game_type: GameType,
        stake: i64,
        settings: RoomSettings,
    ) -> Result<(), AppError>;

    async fn teardown_round(&self, room_code: &str);
}
