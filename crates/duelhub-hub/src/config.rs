//! Hub configuration and match lifecycle phases.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// HubConfig
// ---------------------------------------------------------------------------

/// Configuration for one hub instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Capacity of the inbound event channel shared by all connection
    /// actors. Producers wait when it is full; the hub never does.
    pub event_capacity: usize,

    /// Capacity of each participant's outbound queue. A participant
    /// whose queue is full when the hub delivers is disconnected.
    pub outbound_capacity: usize,

    /// Seed for the hub's random source (starting sides). `None` seeds
    /// from the operating system.
    pub rng_seed: Option<u64>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1024,
            outbound_capacity: 256,
            rng_seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a match in the registry.
///
/// ```text
/// Open → Ready → (removed)
/// ```
///
/// - **Open**: one side seated, waiting for an opponent. At most one
///   match per hub is open at any instant.
/// - **Ready**: both sides seated. No further joins; moves accepted.
///
/// A finished or abandoned match is removed from the registry rather
/// than kept in a terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Open,
    Ready,
}

impl MatchPhase {
    /// Returns `true` if the match still accepts a participant.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Ready => write!(f, "Ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_phase_is_joinable() {
        assert!(MatchPhase::Open.is_joinable());
        assert!(!MatchPhase::Ready.is_joinable());
    }

    #[test]
    fn test_match_phase_display() {
        assert_eq!(MatchPhase::Open.to_string(), "Open");
        assert_eq!(MatchPhase::Ready.to_string(), "Ready");
    }

    #[test]
    fn test_hub_config_default() {
        let config = HubConfig::default();
        assert_eq!(config.event_capacity, 1024);
        assert_eq!(config.outbound_capacity, 256);
        assert!(config.rng_seed.is_none());
    }
}
