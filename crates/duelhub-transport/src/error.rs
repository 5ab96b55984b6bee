use std::io;
use std::time::Duration;

/// Failures on the socket side of duelhub.
///
/// Handshake problems are reported by the pending connection, never by
/// the listener.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// The client asked for a path no game is served on.
    #[error("no game is served on {0}")]
    UnknownPath(String),

    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    #[error("websocket handshake timed out")]
    HandshakeTimeout,

    #[error("send failed: {0}")]
    Send(String),

    #[error("receive failed: {0}")]
    Receive(String),

    /// The peer sent nothing, not even a pong, within the idle limit.
    #[error("no frame from peer for {0:?}")]
    IdleTimeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_the_address() {
        let err = TransportError::Bind {
            addr: "0.0.0.0:8003".into(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.to_string(), "failed to bind 0.0.0.0:8003: in use");
    }

    #[test]
    fn test_unknown_path_message() {
        let err = TransportError::UnknownPath("/ws/poker".into());
        assert_eq!(err.to_string(), "no game is served on /ws/poker");
    }

    #[test]
    fn test_idle_timeout_message() {
        let err = TransportError::IdleTimeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "no frame from peer for 60s");
    }
}
