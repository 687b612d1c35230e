// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use handlers::{create_room, get_room, join_room, list_rooms};
pub use service::{AttachOutcome, DetachOutcome, RoomService};

// Internal modules
pub mod cleanup_task;
pub mod codes;
mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
