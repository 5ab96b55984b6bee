//! Wire vocabulary for the tile duel.
//!
//! Every frame is an adjacently tagged object:
//!
//! ```text
//! { "type": "play_tile", "payload": { "tile": 7 } }
//! ```
//!
//! `rename_all = "snake_case"` shapes the `type` tag,
//! `rename_all_fields = "camelCase"` shapes the payload keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{MatchId, Side, lenient_side};

/// The two seats of a tile duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    Blue,
    Red,
}

impl Side for TileColor {
    const BOTH: [Self; 2] = [Self::Blue, Self::Red];
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blue => write!(f, "blue"),
            Self::Red => write!(f, "red"),
        }
    }
}

impl FromStr for TileColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            other => Err(format!("unknown color {other:?}")),
        }
    }
}

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum TileAction {
    /// Ask to be seated. `color` is a preference, honoured only when
    /// opening a new match.
    JoinGame {
        #[serde(default)]
        player_name: String,
        #[serde(default, deserialize_with = "lenient_side")]
        color: Option<TileColor>,
    },

    /// Play one tile. Kept as a wide integer so out-of-range values
    /// reach the rule engine and get a proper error back.
    PlayTile { tile: i32 },
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum TileEvent {
    /// Sent to the joiner only.
    PlayerJoined {
        your_color: TileColor,
        game_id: MatchId,
    },

    /// Sent to the first joiner of a match.
    WaitingPlayer { message: String },

    /// Sent to both participants when the second one is seated.
    GameStart {
        first_player: TileColor,
        your_color: TileColor,
        blue_name: String,
        red_name: String,
    },

    /// Broadcast after every accepted tile.
    TilePlayed {
        color: TileColor,
        tile: i32,
        round: u32,
        next_player: TileColor,
        waiting_for: TileColor,
        blue_tile_played: bool,
        red_tile_played: bool,
    },

    /// Broadcast when both tiles of a round are in.
    RoundResult {
        round: u32,
        blue_tile: i32,
        red_tile: i32,
        /// `None` for a drawn round.
        winner: Option<TileColor>,
        blue_wins: u32,
        red_wins: u32,
        next_player: TileColor,
    },

    /// Broadcast once, right after the deciding round result.
    GameOver {
        /// `None` for a drawn match.
        winner: Option<TileColor>,
        blue_wins: u32,
        red_wins: u32,
    },

    /// Sent to a single participant.
    Error { message: String },
}
