pub mod chat_events;
pub mod game_events;
pub mod room_events;
pub mod shared;

pub use chat_events::ChatEventHandlers;
pub use game_events::GameEventHandlers;
pub use room_events::RoomEventHandlers;
