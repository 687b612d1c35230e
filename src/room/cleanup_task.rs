use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::service::RoomService;
use crate::game::GameService;

/// Configuration for the cleanup task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    /// How often to run the sweep
    pub cleanup_interval: Duration,
    /// How long a room may sit empty before it is destroyed
    pub room_idle_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
            room_idle_threshold: Duration::from_secs(10 * 60),
        }
    }
}

/// What one sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub rounds_removed: usize,
    pub rooms_removed: usize,
}

/// Starts the background task that periodically prunes finished rounds and
/// idle rooms. Runs until the runtime shuts down.
#[instrument(skip(room_service, game_service))]
pub async fn start_cleanup_task(
    room_service: Arc<RoomService>,
    game_service: Arc<GameService>,
    config: CleanupConfig,
) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        room_idle_threshold_secs = config.room_idle_threshold.as_secs(),
        "Starting cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let report = sweep(&room_service, &game_service, config.room_idle_threshold).await;
        if report == SweepReport::default() {
            debug!("Cleanup found nothing to remove");
        } else {
            info!(
                rounds_removed = report.rounds_removed,
                rooms_removed = report.rooms_removed,
                "Cleanup completed"
            );
        }
    }
}

/// One pass: ended rounds with nobody left, then rooms empty for too long
pub async fn sweep(
    room_service: &RoomService,
    game_service: &GameService,
    room_idle_threshold: Duration,
) -> SweepReport {
    SweepReport {
        rounds_removed: game_service.sweep_finished_rounds().await,
        rooms_removed: room_service.remove_idle_rooms(room_idle_threshold).await,
    }
}
