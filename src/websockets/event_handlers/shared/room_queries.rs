use std::sync::Arc;
use tracing::debug;

use crate::room::{models::RoomModel, service::RoomService};

pub struct RoomQueryUtils;

impl RoomQueryUtils {
    /// Current room snapshot. A room destroyed before its events drained
    /// has nobody left to notify, so absence is not an error.
    pub async fn get_room_if_exists(
        room_service: &Arc<RoomService>,
        room_code: &str,
    ) -> Option<RoomModel> {
        let room = room_service.get_room(room_code).await;
        if room.is_none() {
            debug!(room_code = %room_code, "Room was deleted, no notifications needed");
        }
        room
    }
}
