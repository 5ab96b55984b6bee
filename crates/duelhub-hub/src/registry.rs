//! Match registry: live matches of one game type and the open slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use duelhub_protocol::{MatchId, ParticipantId, Side, SideMap};

use crate::{DuelGame, MatchPhase};

/// Counter for generating unique match IDs.
static NEXT_MATCH_ID: AtomicU64 = AtomicU64::new(1);

/// One two-party game instance.
pub struct Match<G: DuelGame> {
    id: MatchId,
    phase: MatchPhase,
    seats: SideMap<G::Side, ParticipantId>,
    state: G::State,
}

impl<G: DuelGame> Match<G> {
    fn new(id: MatchId, config: &G::Config) -> Self {
        Self {
            id,
            phase: MatchPhase::Open,
            seats: SideMap::new(),
            state: G::init(config),
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == MatchPhase::Ready
    }

    /// The participant seated on `side`, if any.
    pub fn occupant(&self, side: G::Side) -> Option<ParticipantId> {
        self.seats.get(side).copied()
    }

    /// Seated participants in seating order.
    pub fn occupants(&self) -> impl Iterator<Item = (G::Side, ParticipantId)> + '_ {
        self.seats.iter().map(|(side, pid)| (side, *pid))
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut G::State {
        &mut self.state
    }

    fn sit(&mut self, participant: ParticipantId, preferred: Option<G::Side>) -> Option<G::Side> {
        let side = preferred
            .filter(|side| !self.seats.contains(*side))
            .or_else(|| self.seats.free_side())?;
        self.seats.insert(side, participant);
        if self.seats.is_full() {
            self.phase = MatchPhase::Ready;
        }
        Some(side)
    }
}

/// Where a join request landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seating<S> {
    pub match_id: MatchId,
    pub side: S,
    /// `true` when this join filled the match.
    pub ready: bool,
}

/// All live matches of one game type.
///
/// Holds at most one open match. A joiner is always seated in the open
/// match when there is one; otherwise a new match is created and
/// becomes the open one.
pub struct MatchRegistry<G: DuelGame> {
    matches: HashMap<MatchId, Match<G>>,
    open: Option<MatchId>,
}

impl<G: DuelGame> MatchRegistry<G> {
    pub fn new() -> Self {
        Self {
            matches: HashMap::new(),
            open: None,
        }
    }

    /// Seats a participant, creating a match if none is open.
    ///
    /// In an open match the preferred side is honoured only if it is the
    /// free one. In a new match it is honoured when given, else the
    /// participant takes `Side::BOTH[0]`.
    pub fn seat(
        &mut self,
        participant: ParticipantId,
        preferred: Option<G::Side>,
        config: &G::Config,
    ) -> Seating<G::Side> {
        if let Some(match_id) = self.open.take() {
            let joinable = self
                .matches
                .get_mut(&match_id)
                .filter(|m| m.phase.is_joinable());
            if let Some(m) = joinable {
                if let Some(side) = m.sit(participant, preferred) {
                    let ready = m.is_ready();
                    if ready {
                        tracing::info!(game = G::NAME, %match_id, "match ready");
                    } else {
                        self.open = Some(match_id);
                    }
                    return Seating {
                        match_id,
                        side,
                        ready,
                    };
                }
            }
        }

        let match_id = MatchId(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed));
        let mut m = Match::new(match_id, config);
        let side = preferred.unwrap_or(G::Side::BOTH[0]);
        m.seats.insert(side, participant);
        self.matches.insert(match_id, m);
        self.open = Some(match_id);
        tracing::info!(game = G::NAME, %match_id, %participant, %side, "match created");

        Seating {
            match_id,
            side,
            ready: false,
        }
    }

    pub fn get(&self, id: MatchId) -> Option<&Match<G>> {
        self.matches.get(&id)
    }

    pub fn get_mut(&mut self, id: MatchId) -> Option<&mut Match<G>> {
        self.matches.get_mut(&id)
    }

    pub fn contains(&self, id: MatchId) -> bool {
        self.matches.contains_key(&id)
    }

    /// Removes a match, clearing the open slot if it pointed at it.
    pub fn remove(&mut self, id: MatchId) -> Option<Match<G>> {
        if self.open == Some(id) {
            self.open = None;
        }
        self.matches.remove(&id)
    }

    /// The match currently awaiting a second participant.
    pub fn open_match(&self) -> Option<MatchId> {
        self.open
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn match_ids(&self) -> Vec<MatchId> {
        self.matches.keys().copied().collect()
    }
}

impl<G: DuelGame> Default for MatchRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::str::FromStr;

    use duelhub_protocol::PerSide;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{Outbox, PlayerAction};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Seat {
        East,
        West,
    }

    impl fmt::Display for Seat {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl FromStr for Seat {
        type Err = ();
        fn from_str(s: &str) -> Result<Self, ()> {
            match s {
                "east" => Ok(Self::East),
                "west" => Ok(Self::West),
                _ => Err(()),
            }
        }
    }

    impl Side for Seat {
        const BOTH: [Self; 2] = [Self::East, Self::West];
    }

    #[derive(Debug, thiserror::Error)]
    #[error("never")]
    struct Never;

    struct Noop;

    impl DuelGame for Noop {
        type Side = Seat;
        type Config = ();
        type State = ();
        type Action = ();
        type Move = ();
        type Event = ();
        type Error = Never;
        const NAME: &'static str = "noop";

        fn classify(_: ()) -> PlayerAction<Seat, ()> {
            PlayerAction::Move(())
        }
        fn init(_: &()) {}
        fn start<R: rand::Rng + ?Sized>(_: &mut (), _: &mut R) -> Seat {
            Seat::East
        }
        fn apply(_: &mut (), _: Seat, _: ()) -> Result<Outbox<Self>, Never> {
            Ok(Vec::new())
        }
        fn is_finished(_: &()) -> bool {
            false
        }
        fn joined(_: Seat, _: MatchId) {}
        fn waiting() {}
        fn match_start(_: Seat, _: Seat, _: &PerSide<Seat, String>) {}
        fn error(_: String) {}
    }

    #[test]
    fn test_first_join_creates_open_match() {
        let mut reg = MatchRegistry::<Noop>::new();
        let seating = reg.seat(ParticipantId(1), None, &());

        assert_eq!(seating.side, Seat::East);
        assert!(!seating.ready);
        assert_eq!(reg.open_match(), Some(seating.match_id));
        assert_eq!(reg.get(seating.match_id).unwrap().phase(), MatchPhase::Open);
    }

    #[test]
    fn test_second_join_fills_open_match_and_clears_slot() {
        let mut reg = MatchRegistry::<Noop>::new();
        let first = reg.seat(ParticipantId(1), Some(Seat::West), &());
        let second = reg.seat(ParticipantId(2), Some(Seat::West), &());

        assert_eq!(first.side, Seat::West);
        assert_eq!(second.match_id, first.match_id);
        assert_eq!(second.side, Seat::East, "taken preference falls back to free side");
        assert!(second.ready);
        assert_eq!(reg.open_match(), None);

        let m = reg.get(first.match_id).unwrap();
        assert!(m.is_ready());
        assert_eq!(m.occupant(Seat::East), Some(ParticipantId(2)));
        assert_eq!(m.occupant(Seat::West), Some(ParticipantId(1)));
    }

    #[test]
    fn test_third_join_opens_a_new_match() {
        let mut reg = MatchRegistry::<Noop>::new();
        let a = reg.seat(ParticipantId(1), None, &());
        reg.seat(ParticipantId(2), None, &());
        let c = reg.seat(ParticipantId(3), None, &());

        assert_ne!(a.match_id, c.match_id);
        assert_eq!(reg.open_match(), Some(c.match_id));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_remove_open_match_clears_slot() {
        let mut reg = MatchRegistry::<Noop>::new();
        let a = reg.seat(ParticipantId(1), None, &());

        assert!(reg.remove(a.match_id).is_some());
        assert_eq!(reg.open_match(), None);
        assert!(reg.is_empty());

        let b = reg.seat(ParticipantId(2), None, &());
        assert_ne!(a.match_id, b.match_id);
        assert!(!b.ready);
    }

    #[test]
    fn test_stale_open_slot_on_ready_match_is_not_joined() {
        let mut reg = MatchRegistry::<Noop>::new();
        let a = reg.seat(ParticipantId(1), None, &());
        reg.seat(ParticipantId(2), None, &());
        reg.open = Some(a.match_id);

        let c = reg.seat(ParticipantId(3), None, &());
        assert_ne!(c.match_id, a.match_id);
        assert!(!c.ready);
        assert_eq!(reg.open_match(), Some(c.match_id));

        let full = reg.get(a.match_id).unwrap();
        assert_eq!(full.occupant(Seat::East), Some(ParticipantId(1)));
        assert_eq!(full.occupant(Seat::West), Some(ParticipantId(2)));
    }
}
