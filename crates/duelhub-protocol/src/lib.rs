//! Wire protocol for duelhub.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ParticipantId`], [`MatchId`], [`Side`], [`SideMap`],
//!   [`PerSide`], [`Recipient`]): identities and per-side containers.
//! - **Vocabularies** ([`TileAction`] / [`TileEvent`],
//!   [`BlockAction`] / [`BlockEvent`]): one tagged union per direction
//!   per game, decoded once at the connection boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (typed actions) → Hub (matches)
//! ```

mod block;
mod codec;
mod error;
mod tile;
mod types;

pub use block::{BlockAction, BlockEvent, GameOverReason, Team};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use tile::{TileAction, TileColor, TileEvent};
pub use types::{
    MatchId, ParticipantId, PerSide, Recipient, Side, SideMap, lenient_side,
};
