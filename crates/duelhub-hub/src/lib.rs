//! Hub event loop and match registry for duelhub.
//!
//! One hub runs per game type as an isolated Tokio task (actor model).
//! It owns every match of that game and is the only code that mutates
//! them.
//!
//! # Key types
//!
//! - [`DuelGame`]: the rule-engine trait each game implements
//! - [`spawn_hub`] / [`HubHandle`]: start a hub and send it events
//! - [`MatchRegistry`]: live matches and the single open slot
//! - [`HubConfig`]: channel capacities and RNG seed

mod config;
mod error;
mod game;
mod hub;
mod registry;

pub use config::{HubConfig, MatchPhase};
pub use error::HubError;
pub use game::{DuelGame, JoinRequest, Outbox, PlayerAction};
pub use hub::{Hub, HubEvent, HubHandle, HubInfo, Outbound, spawn_hub};
pub use registry::{Match, MatchRegistry, Seating};
