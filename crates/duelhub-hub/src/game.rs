//! The `DuelGame` trait: the rule engine a hub drives.
//!
//! A hub knows how to seat two participants, route their moves and tear
//! matches down. Everything game-specific (side labels, what a move is,
//! how a round resolves, what goes on the wire) comes from an
//! implementation of this trait.

use std::fmt::Debug;

use duelhub_protocol::{MatchId, PerSide, Recipient, Side};
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};

/// Messages produced by one call into the rule engine, each addressed
/// within the match.
pub type Outbox<G> = Vec<(Recipient<<G as DuelGame>::Side>, <G as DuelGame>::Event)>;

/// A request to be seated in a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest<S> {
    pub player_name: String,
    /// Requested side. `None` when absent or unrecognised.
    pub preferred: Option<S>,
}

/// An inbound action split into the part the hub handles (joining) and
/// the part the rule engine handles (moves).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction<S, M> {
    Join(JoinRequest<S>),
    Move(M),
}

/// A two-party turn-based game.
///
/// All methods are synchronous and must not block: the hub calls them
/// from inside its event loop.
pub trait DuelGame: Send + Sync + 'static {
    /// The two side labels of a match.
    type Side: Side;

    /// Game-specific settings (round limits, score targets).
    type Config: Send + Sync + Clone + Default + 'static;

    /// Per-match rule state.
    type State: Send + 'static;

    /// The inbound wire message, decoded once by the connection actor.
    type Action: Send + Debug + DeserializeOwned + 'static;

    /// A game move, i.e. every [`DuelGame::Action`] that is not a join.
    type Move: Send + Debug + 'static;

    /// The outbound wire message.
    type Event: Send + Clone + Debug + Serialize + 'static;

    /// A rule violation. Reported to the acting participant only.
    type Error: std::error::Error + Send + 'static;

    /// Short name used in log fields.
    const NAME: &'static str;

    fn classify(action: Self::Action) -> PlayerAction<Self::Side, Self::Move>;

    /// Creates the rule state for a new match.
    fn init(config: &Self::Config) -> Self::State;

    /// Called once when the second participant is seated. Returns the
    /// side that moves first.
    fn start<R: Rng + ?Sized>(state: &mut Self::State, rng: &mut R) -> Self::Side;

    /// Validates and applies a move.
    ///
    /// On `Err` the state must be unchanged.
    fn apply(
        state: &mut Self::State,
        side: Self::Side,
        mv: Self::Move,
    ) -> Result<Outbox<Self>, Self::Error>;

    /// Returns `true` once the match has reached a terminal condition.
    /// The hub removes finished matches from its registry.
    fn is_finished(state: &Self::State) -> bool;

    /// Join acknowledgement sent to the joiner.
    fn joined(side: Self::Side, match_id: MatchId) -> Self::Event;

    /// Sent to a joiner who is still alone in their match.
    fn waiting() -> Self::Event;

    /// Sent to each participant when the match becomes ready.
    fn match_start(
        first: Self::Side,
        you: Self::Side,
        names: &PerSide<Self::Side, String>,
    ) -> Self::Event;

    /// Error envelope.
    fn error(message: String) -> Self::Event;
}
