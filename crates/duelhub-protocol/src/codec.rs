//! Frame encoding.
//!
//! Decoding happens once per frame in the connection task, so the hub
//! only ever handles typed actions. Browsers speak JSON, hence
//! [`JsonCodec`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts messages to frames and back.
///
/// One value is cloned into every connection task.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] for anything that is not a valid `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// `{"type": ..., "payload": {...}}` frames via `serde_json`.
///
/// Behind the `json` feature (on by default).
///
/// ## Example
///
/// ```rust
/// use duelhub_protocol::{Codec, JsonCodec, TileAction};
///
/// let codec = JsonCodec;
///
/// let action: TileAction = codec
///     .decode(br#"{"type":"play_tile","payload":{"tile":7}}"#)
///     .unwrap();
/// assert_eq!(action, TileAction::PlayTile { tile: 7 });
///
/// let bytes = codec.encode(&action).unwrap();
/// let again: TileAction = codec.decode(&bytes).unwrap();
/// assert_eq!(action, again);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
