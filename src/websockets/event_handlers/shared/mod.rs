pub mod message_broadcast;
pub mod room_queries;

pub use message_broadcast::{Delivery, MessageBroadcaster};
pub use room_queries::RoomQueryUtils;
