//! Server-level error.

use duelhub_hub::HubError;
use duelhub_protocol::ProtocolError;
use duelhub_transport::TransportError;

/// Anything that can stop the server or end a connection early.
#[derive(Debug, thiserror::Error)]
pub enum DuelhubError {
    /// Bind, handshake, or socket I/O.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Frame encoding or decoding.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game hub stopped.
    #[error(transparent)]
    Hub(#[from] HubError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelhub_protocol::{Codec, JsonCodec, TileAction};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Send("broken pipe".into());
        let duelhub_err: DuelhubError = err.into();
        assert!(matches!(duelhub_err, DuelhubError::Transport(_)));
        assert_eq!(duelhub_err.to_string(), "send failed: broken pipe");
    }

    #[test]
    fn test_from_protocol_error() {
        let err = JsonCodec.decode::<TileAction>(b"{").unwrap_err();
        let duelhub_err: DuelhubError = err.into();
        assert!(matches!(duelhub_err, DuelhubError::Protocol(_)));
    }

    #[test]
    fn test_from_hub_error() {
        let err = HubError::Unavailable("tile-duel");
        let duelhub_err: DuelhubError = err.into();
        assert!(matches!(duelhub_err, DuelhubError::Hub(_)));
        assert_eq!(duelhub_err.to_string(), "tile-duel hub is unavailable");
    }
}
