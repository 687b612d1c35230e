use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::shared::ConnectionId;

/// Which room seat a connection speaks for, once it has joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBinding {
    pub room_code: String,
    pub player_id: String,
    pub player_name: String,
}

/// Lookup table from connection ids to live transports. Rooms only hold
/// the id; delivery goes through here.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection: ConnectionId, sender: mpsc::UnboundedSender<String>);

    /// Forgets the transport and any binding
    async fn remove_connection(&self, connection: ConnectionId);

    /// Best-effort send. Returns false when the connection is gone.
    async fn send_to_connection(&self, connection: ConnectionId, message: &str) -> bool;

    async fn bind_player(&self, connection: ConnectionId, binding: PlayerBinding);

    async fn unbind_player(&self, connection: ConnectionId) -> Option<PlayerBinding>;

    async fn get_binding(&self, connection: ConnectionId) -> Option<PlayerBinding>;
}

struct ConnectionEntry {
    sender: mpsc::UnboundedSender<String>,
    binding: Option<PlayerBinding>,
}

pub struct InMemoryConnectionManager {
    connections: Arc<RwLock<HashMap<ConnectionId, ConnectionEntry>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(
            connection,
            ConnectionEntry {
                sender,
                binding: None,
            },
        );
        debug!(connection = %connection, "Connection registered");
    }

    async fn remove_connection(&self, connection: ConnectionId) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection).is_some() {
            debug!(connection = %connection, "Connection removed");
        }
    }

    async fn send_to_connection(&self, connection: ConnectionId, message: &str) -> bool {
        let connections = self.connections.read().await;
        let Some(entry) = connections.get(&connection) else {
            warn!(connection = %connection, "Send to unknown connection dropped");
            return false;
        };
        if entry.sender.send(message.to_string()).is_err() {
            warn!(connection = %connection, "Send failed, connection closing");
            return false;
        }
        true
    }

    async fn bind_player(&self, connection: ConnectionId, binding: PlayerBinding) {
        let mut connections = self.connections.write().await;
        if let Some(entry) = connections.get_mut(&connection) {
            entry.binding = Some(binding);
        }
    }

    async fn unbind_player(&self, connection: ConnectionId) -> Option<PlayerBinding> {
        let mut connections = self.connections.write().await;
        connections
            .get_mut(&connection)
            .and_then(|entry| entry.binding.take())
    }

    async fn get_binding(&self, connection: ConnectionId) -> Option<PlayerBinding> {
        let connections = self.connections.read().await;
        connections
            .get(&connection)
            .and_then(|entry| entry.binding.clone())
    }
}
