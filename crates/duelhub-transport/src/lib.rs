//! Socket layer for duelhub.
//!
//! The server only ever talks to a [`Connection`]: a full-duplex byte
//! pipe that remembers which upgrade path it was opened on, so the
//! caller can route it to the right game. [`Transport`] hands those out.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection number, used in log lines only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id. Ids are never reused.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Source of incoming connections.
pub trait Transport: Send + Sync + 'static {
    type Pending: PendingConnection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next raw connection. Returns before any protocol
    /// handshake, so one slow client never holds up the next accept.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// An accepted connection that still has to complete its handshake.
pub trait PendingConnection: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Runs the handshake. Call this from the per-connection task.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// One client socket.
///
/// `recv` and `send` lock separate halves, so a reader task parked in
/// [`recv`](Connection::recv) never delays a writer task.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one message frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Next data frame. `Ok(None)` once the peer closed. Control frames
    /// are consumed here and never returned.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a keep-alive ping.
    async fn ping(&self) -> Result<(), Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Request path of the upgrade, e.g. `/ws/tile-duel`.
    fn path(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_increase() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert!(b > a);
        assert_ne!(a.0, 0);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "C-7");
    }
}
