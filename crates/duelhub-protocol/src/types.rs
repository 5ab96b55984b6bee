//! Core identity and seating types shared by both games.
//!
//! Everything here is game-agnostic: opaque ids, the two-valued
//! [`Side`] label abstraction, and the fixed two-slot containers used
//! to hold per-side state.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected participant.
///
/// A newtype over `u64` so it can't be confused with a [`MatchId`].
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a match (one two-party game instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Side: the two seats of a match
// ---------------------------------------------------------------------------

/// A two-valued side label (a color, a team).
///
/// Every match has exactly these two labels, fixed per game type.
/// Implementors only provide [`Side::BOTH`]; indexing and the opponent
/// relation follow from it.
pub trait Side:
    Copy
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Display
    + FromStr
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Both labels in seating order. `BOTH[0]` is the default seat for
    /// a participant who expressed no (valid) preference.
    const BOTH: [Self; 2];

    /// Position of this label in [`Side::BOTH`].
    fn index(self) -> usize {
        if self == Self::BOTH[0] { 0 } else { 1 }
    }

    /// The other label.
    fn opponent(self) -> Self {
        Self::BOTH[1 - self.index()]
    }
}

/// Deserializes an optional side label, mapping unknown strings to `None`.
///
/// A join request with `"color": "green"` is not malformed, it just
/// expresses no usable preference.
pub fn lenient_side<'de, D, S>(deserializer: D) -> Result<Option<S>, D::Error>
where
    D: Deserializer<'de>,
    S: Side,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|label| label.parse().ok()))
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Addresses an outbound message within one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient<S> {
    /// Both seated participants.
    All,
    /// Only the participant seated on this side.
    Only(S),
}

// ---------------------------------------------------------------------------
// Per-side containers
// ---------------------------------------------------------------------------

/// A fixed two-slot map from [`Side`] to an optional value.
///
/// Used wherever a side may or may not have something yet: seats,
/// pending submissions. "Both sides present" is a count over two slots,
/// not a lookup in a sparse map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideMap<S, T> {
    slots: [Option<T>; 2],
    _side: PhantomData<S>,
}

impl<S: Side, T> SideMap<S, T> {
    /// Creates a map with both slots empty.
    pub fn new() -> Self {
        Self {
            slots: [None, None],
            _side: PhantomData,
        }
    }

    pub fn get(&self, side: S) -> Option<&T> {
        self.slots[side.index()].as_ref()
    }

    pub fn get_mut(&mut self, side: S) -> Option<&mut T> {
        self.slots[side.index()].as_mut()
    }

    /// Stores a value, returning the one it replaced.
    pub fn insert(&mut self, side: S, value: T) -> Option<T> {
        self.slots[side.index()].replace(value)
    }

    pub fn take(&mut self, side: S) -> Option<T> {
        self.slots[side.index()].take()
    }

    pub fn contains(&self, side: S) -> bool {
        self.slots[side.index()].is_some()
    }

    /// Number of occupied slots (0, 1 or 2).
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == 2
    }

    /// The first unoccupied side in seating order, if any.
    pub fn free_side(&self) -> Option<S> {
        S::BOTH.into_iter().find(|side| !self.contains(*side))
    }

    /// Empties both slots.
    pub fn clear(&mut self) {
        self.slots = [None, None];
    }

    /// Iterates occupied slots in seating order.
    pub fn iter(&self) -> impl Iterator<Item = (S, &T)> {
        S::BOTH
            .into_iter()
            .filter_map(|side| self.get(side).map(|value| (side, value)))
    }

    /// Returns both values when both slots are occupied.
    pub fn both(&self) -> Option<(&T, &T)> {
        match &self.slots {
            [Some(first), Some(second)] => Some((first, second)),
            _ => None,
        }
    }
}

impl<S: Side, T> Default for SideMap<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed pair holding one value for each [`Side`] (scores, inventories).
///
/// Indexable by side: `scores[TileColor::Blue] += 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerSide<S, T> {
    values: [T; 2],
    _side: PhantomData<S>,
}

impl<S: Side, T> PerSide<S, T> {
    /// Builds the pair by calling `init` once per side, in seating order.
    pub fn from_fn(mut init: impl FnMut(S) -> T) -> Self {
        Self {
            values: [init(S::BOTH[0]), init(S::BOTH[1])],
            _side: PhantomData,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (S, &T)> {
        S::BOTH.into_iter().zip(self.values.iter())
    }
}

impl<S: Side, T: Default> Default for PerSide<S, T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<S: Side, T> Index<S> for PerSide<S, T> {
    type Output = T;

    fn index(&self, side: S) -> &T {
        &self.values[side.index()]
    }
}

impl<S: Side, T> IndexMut<S> for PerSide<S, T> {
    fn index_mut(&mut self, side: S) -> &mut T {
        &mut self.values[side.index()]
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Team, TileColor};

    #[test]
    fn test_participant_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ParticipantId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ParticipantId(7).to_string(), "P-7");
        assert_eq!(MatchId(3).to_string(), "M-3");
    }

    #[test]
    fn test_match_id_deserializes_from_plain_number() {
        let id: MatchId = serde_json::from_str("99").unwrap();
        assert_eq!(id, MatchId(99));
    }

    #[test]
    fn test_side_opponent_and_index() {
        assert_eq!(TileColor::Blue.opponent(), TileColor::Red);
        assert_eq!(TileColor::Red.opponent(), TileColor::Blue);
        assert_eq!(Team::Team1.index(), 0);
        assert_eq!(Team::Team2.index(), 1);
    }

    #[test]
    fn test_side_map_insert_take_and_len() {
        let mut map: SideMap<TileColor, u32> = SideMap::new();
        assert!(map.is_empty());
        assert_eq!(map.free_side(), Some(TileColor::Blue));

        assert_eq!(map.insert(TileColor::Blue, 1), None);
        assert_eq!(map.free_side(), Some(TileColor::Red));
        assert_eq!(map.insert(TileColor::Blue, 2), Some(1));
        assert_eq!(map.len(), 1);

        map.insert(TileColor::Red, 9);
        assert!(map.is_full());
        assert_eq!(map.free_side(), None);
        assert_eq!(map.both(), Some((&2, &9)));

        assert_eq!(map.take(TileColor::Blue), Some(2));
        assert_eq!(map.both(), None);
        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_side_map_iter_follows_seating_order() {
        let mut map: SideMap<Team, &str> = SideMap::new();
        map.insert(Team::Team2, "b");
        map.insert(Team::Team1, "a");
        let seen: Vec<_> = map.iter().collect();
        assert_eq!(seen, vec![(Team::Team1, &"a"), (Team::Team2, &"b")]);
    }

    #[test]
    fn test_per_side_indexing() {
        let mut scores: PerSide<TileColor, u32> = PerSide::default();
        scores[TileColor::Red] += 2;
        assert_eq!(scores[TileColor::Blue], 0);
        assert_eq!(scores[TileColor::Red], 2);
    }
}
