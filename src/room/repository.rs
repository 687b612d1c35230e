use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use super::models::RoomModel;

/// A live room behind its own lock. Operations on different rooms never
/// contend on the same mutex.
pub type SharedRoom = Arc<Mutex<RoomModel>>;

/// Result of attempting to register a new room
#[derive(Debug)]
pub enum CreateRoomResult {
    /// Stored; returns the room's handle
    Created(SharedRoom),
    /// Another live room already owns this code
    CodeTaken,
}

/// Store of live rooms keyed by code.
///
/// Lock order is always map, then room: implementations must not take the
/// map lock while a caller could be holding a room lock they are waiting on.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Inserts the room unless its code is already live
    async fn create_room(&self, room: RoomModel) -> CreateRoomResult;

    async fn get_room(&self, room_code: &str) -> Option<SharedRoom>;

    /// Point-in-time copy of every room handle
    async fn list_rooms(&self) -> Vec<SharedRoom>;

    /// Removes the room if `handle` is still the one stored under the code
    /// and it has been marked closed. Returns whether it was removed.
    async fn remove_closed_room(&self, room_code: &str, handle: &SharedRoom) -> bool;

    async fn room_count(&self) -> usize;
}

/// In-memory implementation of RoomRepository
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, SharedRoom>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room), fields(room_code = %room.code))]
    async fn create_room(&self, room: RoomModel) -> CreateRoomResult {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.code) {
            debug!("Room code already live");
            return CreateRoomResult::CodeTaken;
        }

        let code = room.code.clone();
        let handle = Arc::new(Mutex::new(room));
        rooms.insert(code, Arc::clone(&handle));

        debug!("Room stored in memory");
        CreateRoomResult::Created(handle)
    }

    async fn get_room(&self, room_code: &str) -> Option<SharedRoom> {
        self.rooms.read().await.get(room_code).cloned()
    }

    async fn list_rooms(&self) -> Vec<SharedRoom> {
        self.rooms.read().await.values().cloned().collect()
    }

    #[instrument(skip(self, handle))]
    async fn remove_closed_room(&self, room_code: &str, handle: &SharedRoom) -> bool {
        let mut rooms = self.rooms.write().await;

        let is_same = rooms
            .get(room_code)
            .is_some_and(|stored| Arc::ptr_eq(stored, handle));
        if !is_same || !handle.lock().await.closed {
            return false;
        }

        rooms.remove(room_code);
        debug!("Closed room removed from memory");
        true
    }

    async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
