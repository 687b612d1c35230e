use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::room::CleanupConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 100;

/// Server settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    pub cleanup: CleanupConfig,
    /// Backlog each room's broadcast channel can hold
    pub event_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cleanup: CleanupConfig::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("BINGO_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "BINGO_CLEANUP_INTERVAL_SECS") {
            config.cleanup.cleanup_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "BINGO_ROOM_IDLE_SECS") {
            config.cleanup.room_idle_threshold = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, "BINGO_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.max(1);
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparseable setting, using default");
            None
        }
    }
}
