//! Live-update channels.
//!
//! A channel is the registry's dispatch handle for one open connection. The
//! transport owns the connection; the channel only enqueues outgoing payloads
//! for the connection's writer task.

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one open connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The connection's writer has gone away.
    #[error("channel closed")]
    Closed,

    #[error("send failed: {0}")]
    Send(String),
}

/// Push side of a live connection.
///
/// `send` must not block on network I/O: it is called for every subscriber of
/// a topic from inside the vote request path.
pub trait LiveChannel: Send + Sync {
    fn id(&self) -> ChannelId;

    fn send(&self, payload: &str) -> Result<(), ChannelError>;
}

/// Channel backed by an unbounded queue drained by the connection's writer task.
#[derive(Debug)]
pub struct ConnectionChannel {
    id: ChannelId,
    tx: mpsc::UnboundedSender<String>,
}

impl ConnectionChannel {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: ChannelId::new(),
            tx,
        }
    }

    /// Create a channel and the receiver its writer task should drain.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl LiveChannel for ConnectionChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn send(&self, payload: &str) -> Result<(), ChannelError> {
        self.tx
            .send(payload.to_string())
            .map_err(|_| ChannelError::Closed)
    }
}
