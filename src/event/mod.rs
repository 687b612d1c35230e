// Per-room event distribution
//
// Services publish a RoomEvent while they still hold the lock that made the
// change, so every room's channel carries events in commit order.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::{RoomBroadcast, RoomEvent};
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

// Internal modules
mod bus;
mod events;
mod room_handler;
mod room_subscription;
