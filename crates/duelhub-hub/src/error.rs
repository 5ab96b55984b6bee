//! Error types for the hub layer.

use duelhub_protocol::{MatchId, ParticipantId};

/// Errors raised while the hub handles a participant's action.
///
/// Every variant except [`HubError::Unavailable`] is reported back to
/// the acting participant as an error message; none of them changes
/// match state.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The participant is already seated in a live match.
    #[error("participant {0} is already in match {1}")]
    AlreadyInMatch(ParticipantId, MatchId),

    /// The participant never joined a match.
    #[error("participant {0} is not in a match")]
    NotInMatch(ParticipantId),

    /// The participant's match no longer exists (finished or abandoned).
    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    /// The match is still waiting for its second participant.
    #[error("match {0} is waiting for an opponent")]
    MatchNotReady(MatchId),

    /// The game's rule engine refused the move.
    #[error("{0}")]
    Rejected(String),

    /// The hub's event loop has stopped.
    #[error("{0} hub is unavailable")]
    Unavailable(&'static str),
}
