//! # duelhub
//!
//! WebSocket server for two-party, turn-based duels.
//!
//! Two games run side by side, each behind its own hub: a single Tokio
//! task that owns every match of that game and applies participant
//! actions one at a time.
//!
//! ```text
//! connection actors → hub event loop → match registry / rule engine
//!        ↑                                    │
//!        └──────── bounded outbound queues ───┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duelhub::prelude::*;
//!
//! # async fn run() -> Result<(), DuelhubError> {
//! let server = DuelServerBuilder::new().bind("0.0.0.0:8003").build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConnectionSettings, ServerConfig};
pub use error::DuelhubError;
pub use server::{DuelServer, DuelServerBuilder};

/// Common imports for running and talking to a duelhub server.
pub mod prelude {
    pub use crate::{ConnectionSettings, DuelServer, DuelServerBuilder, DuelhubError, ServerConfig};
    pub use duelhub_games::{
        BlockExchange, BlockExchangeConfig, BlockExchangeError, TileDuel, TileDuelConfig,
        TileDuelError,
    };
    pub use duelhub_hub::{DuelGame, HubConfig, HubError, HubHandle, HubInfo};
    pub use duelhub_protocol::{
        BlockAction, BlockEvent, Codec, GameOverReason, JsonCodec, MatchId, ParticipantId,
        ProtocolError, Team, TileAction, TileColor, TileEvent,
    };
    pub use duelhub_transport::TransportError;
}
