//! Wire vocabulary for the block exchange.
//!
//! Same envelope shape as the tile duel: `{ "type", "payload" }`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{MatchId, Side, lenient_side};

/// The two seats of a block exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Team1,
    Team2,
}

impl Side for Team {
    const BOTH: [Self; 2] = [Self::Team1, Self::Team2];
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team1 => write!(f, "team1"),
            Self::Team2 => write!(f, "team2"),
        }
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team1" => Ok(Self::Team1),
            "team2" => Ok(Self::Team2),
            other => Err(format!("unknown team {other:?}")),
        }
    }
}

/// Why a block exchange ended.
///
/// `RoundsComplete` is reported for decisive and tied finishes alike;
/// read the scores in [`BlockEvent::GameOver`] to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    ScoreLimit,
    RoundsComplete,
}

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum BlockAction {
    JoinGame {
        #[serde(default)]
        player_name: String,
        #[serde(default, deserialize_with = "lenient_side")]
        team: Option<Team>,
    },

    /// Submit two blocks for this round. `selected_block_choice` is
    /// 0 when no pick of the opponent's blocks is made yet.
    SubmitBlocks {
        block1: i32,
        block2: i32,
        #[serde(default)]
        use_hidden: bool,
        #[serde(default)]
        selected_block_choice: i32,
    },

    /// Pick which of the opponent's two blocks to receive, after the
    /// opponent revealed a hidden-chance submission.
    SelectBlock { selected_block_choice: i32 },
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum BlockEvent {
    PlayerJoined {
        your_team: Team,
        game_id: MatchId,
    },

    WaitingPlayer { message: String },

    GameStart {
        your_team: Team,
        first_team: Team,
        team1_name: String,
        team2_name: String,
    },

    /// Broadcast after an accepted submission. Values stay secret
    /// until the round resolves.
    BlocksSubmitted {
        team: Team,
        round: u32,
        team1_submitted: bool,
        team2_submitted: bool,
    },

    /// Sent to the opponent of a team that played its hidden chance:
    /// the opponent must now pick one of that team's blocks.
    HiddenUsed { team: Team },

    RoundResult {
        round: u32,
        team1_block1: i32,
        team1_block2: i32,
        team1_total: i32,
        team2_block1: i32,
        team2_block2: i32,
        team2_total: i32,
        /// `None` when the totals were equal.
        winner: Option<Team>,
        team1_score: u32,
        team2_score: u32,
        team1_hidden: bool,
        team2_hidden: bool,
        team1_received_block: i32,
        team2_received_block: i32,
        next_team: Team,
    },

    GameOver {
        winner: Option<Team>,
        team1_score: u32,
        team2_score: u32,
        reason: GameOverReason,
    },

    Error { message: String },
}
