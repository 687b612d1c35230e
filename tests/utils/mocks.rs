#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use bingo::{ConnectionId, ConnectionManager, PlayerBinding};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, VecDeque<String>>>>,
    bindings: Arc<RwLock<HashMap<ConnectionId, PlayerBinding>>>,
    connected: Arc<RwLock<Vec<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_messages_for(&self, connection: ConnectionId) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(&connection)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pops the oldest undelivered message for a connection
    pub async fn consume_message_for(&self, connection: ConnectionId) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(&connection)
            .and_then(VecDeque::pop_front)
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }

    pub async fn is_connected(&self, connection: ConnectionId) -> bool {
        self.connected.read().await.contains(&connection)
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection: ConnectionId, _sender: mpsc::UnboundedSender<String>) {
        self.connected.write().await.push(connection);
    }

    async fn remove_connection(&self, connection: ConnectionId) {
        self.connected.write().await.retain(|c| *c != connection);
        self.bindings.write().await.remove(&connection);
    }

    async fn send_to_connection(&self, connection: ConnectionId, message: &str) -> bool {
        self.sent_messages
            .write()
            .await
            .entry(connection)
            .or_default()
            .push_back(message.to_string());
        true
    }

    async fn bind_player(&self, connection: ConnectionId, binding: PlayerBinding) {
        self.bindings.write().await.insert(connection, binding);
    }

    async fn unbind_player(&self, connection: ConnectionId) -> Option<PlayerBinding> {
        self.bindings.write().await.remove(&connection)
    }

    async fn get_binding(&self, connection: ConnectionId) -> Option<PlayerBinding> {
        self.bindings.read().await.get(&connection).cloned()
    }
}
