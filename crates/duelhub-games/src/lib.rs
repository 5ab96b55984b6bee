//! Rule engines for the two duelhub games.
//!
//! - [`TileDuel`]: nine numbered tiles each, one per round, first to
//!   five round wins.
//! - [`BlockExchange`]: two blocks per round from an inventory, the
//!   larger total scores. Each team then receives the larger of the
//!   opponent's two blocks, or the one it picked when the opponent
//!   played its once-per-match hidden chance.
//!
//! Both implement [`duelhub_hub::DuelGame`] and are driven by a hub.

mod block_exchange;
mod error;
mod tile_duel;

pub use block_exchange::{
    BlockExchange, BlockExchangeConfig, BlockExchangeState, BlockMove, RoundRecord, Submission,
};
pub use error::{BlockExchangeError, TileDuelError};
pub use tile_duel::{TileDuel, TileDuelConfig, TileDuelState, round_winner};
