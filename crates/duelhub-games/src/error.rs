//! Rule violations reported by the game engines.
//!
//! A rejected move leaves match state untouched; the message goes back
//! to the acting participant only.

/// Errors from [`TileDuel`](crate::TileDuel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileDuelError {
    #[error("tile must be between 1 and 9, got {0}")]
    InvalidValue(i32),

    #[error("tile {0} has already been used")]
    ValueReused(i32),

    #[error("you already played a tile this round")]
    AlreadySubmitted,

    #[error("it is not your turn")]
    OutOfTurn,
}

/// Errors from [`BlockExchange`](crate::BlockExchange).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockExchangeError {
    /// A submitted block is not in the inventory (counting duplicates).
    #[error("block {0} is not in your inventory")]
    UnownedBlock(i32),

    #[error("hidden chance already used")]
    HiddenAlreadyUsed,

    #[error("invalid block choice {0} (must be 1 or 2)")]
    InvalidSelection(i32),

    #[error("no pending submission to select for")]
    NoPendingSubmission,
}
