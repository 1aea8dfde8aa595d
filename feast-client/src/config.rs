//! Client configuration

use std::time::Duration;

/// Default delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Default cap on one protocol line, matches the server default
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Client configuration for connecting to the feast server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (e.g., "127.0.0.1:7070")
    pub server_addr: String,

    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,

    /// Max bytes of one response line
    pub max_line_bytes: usize,
}

impl ClientConfig {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Set the reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the max line size
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }
}
