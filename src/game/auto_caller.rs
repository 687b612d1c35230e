use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::{repository::SharedGame, service::GameService};

/// Calls a number on `round` every `period` until it ends, runs dry or is
/// torn down. Each draw is broadcast exactly like a manual call.
pub fn spawn_auto_caller(
    games: Arc<GameService>,
    room_code: String,
    round: SharedGame,
    period: Duration,
) -> JoinHandle<()> {
    info!(
        room_code = %room_code,
        interval_secs = period.as_secs(),
        "Starting auto caller"
    );

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match games.call_number_on(&room_code, &round).await {
                Ok(Some(_)) => continue,
                Ok(None) => {
                    debug!(room_code = %room_code, "Auto caller stopping, numbers exhausted");
                    break;
                }
                Err(e) => {
                    debug!(room_code = %room_code, reason = %e, "Auto caller stopping");
                    break;
                }
            }
        }
    })
}
