//! Tile duel: each side holds tiles 1 to 9 and spends one per round.
//!
//! The larger tile takes the round, except that a 1 beats a 9. The round
//! winner leads the next round. First to five round wins takes the
//! match; after nine rounds the higher score wins and equal scores draw.

use duelhub_hub::{DuelGame, JoinRequest, Outbox, PlayerAction};
use duelhub_protocol::{
    MatchId, PerSide, Recipient, Side, SideMap, TileAction, TileColor, TileEvent,
};
use rand::Rng;

use crate::TileDuelError;

const LOWEST_TILE: i32 = 1;
const HIGHEST_TILE: i32 = 9;

/// Tile duel settings.
#[derive(Debug, Clone)]
pub struct TileDuelConfig {
    /// The match ends once this many rounds have resolved.
    pub max_rounds: u32,
    /// Round wins that end the match early.
    pub wins_needed: u32,
}

impl Default for TileDuelConfig {
    fn default() -> Self {
        Self {
            max_rounds: 9,
            wins_needed: 5,
        }
    }
}

/// Decides one round. `None` is a draw.
///
/// ```
/// use duelhub_games::round_winner;
/// use duelhub_protocol::TileColor;
///
/// assert_eq!(round_winner(1, 9), Some(TileColor::Blue));
/// assert_eq!(round_winner(8, 9), Some(TileColor::Red));
/// assert_eq!(round_winner(5, 5), None);
/// ```
pub fn round_winner(blue: i32, red: i32) -> Option<TileColor> {
    if blue == red {
        None
    } else if blue == LOWEST_TILE && red == HIGHEST_TILE {
        Some(TileColor::Blue)
    } else if red == LOWEST_TILE && blue == HIGHEST_TILE {
        Some(TileColor::Red)
    } else if blue > red {
        Some(TileColor::Blue)
    } else {
        Some(TileColor::Red)
    }
}

/// Per-match tile duel state.
#[derive(Debug, Clone)]
pub struct TileDuelState {
    config: TileDuelConfig,
    round: u32,
    wins: PerSide<TileColor, u32>,
    used: PerSide<TileColor, Vec<i32>>,
    pending: SideMap<TileColor, i32>,
    current: TileColor,
    /// `Some(winner)` once the match is over; the inner `None` is a draw.
    outcome: Option<Option<TileColor>>,
}

struct Resolved {
    round: u32,
    blue: i32,
    red: i32,
    winner: Option<TileColor>,
}

impl TileDuelState {
    pub fn new(config: TileDuelConfig) -> Self {
        Self {
            config,
            round: 1,
            wins: PerSide::default(),
            used: PerSide::default(),
            pending: SideMap::new(),
            current: TileColor::Blue,
            outcome: None,
        }
    }

    /// The round currently accepting tiles, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn wins(&self, color: TileColor) -> u32 {
        self.wins[color]
    }

    pub fn used(&self, color: TileColor) -> &[i32] {
        &self.used[color]
    }

    /// The side that leads the current round.
    pub fn current_turn(&self) -> TileColor {
        self.current
    }

    pub fn has_played(&self, color: TileColor) -> bool {
        self.pending.contains(color)
    }

    /// `Some(winner)` once the match is over.
    pub fn outcome(&self) -> Option<Option<TileColor>> {
        self.outcome
    }

    /// Validates and records a tile. Nothing changes on error.
    pub fn play(&mut self, color: TileColor, tile: i32) -> Result<(), TileDuelError> {
        if !(LOWEST_TILE..=HIGHEST_TILE).contains(&tile) {
            return Err(TileDuelError::InvalidValue(tile));
        }
        if self.used[color].contains(&tile) {
            return Err(TileDuelError::ValueReused(tile));
        }
        if self.pending.contains(color) {
            return Err(TileDuelError::AlreadySubmitted);
        }
        if self.current != color && !self.pending.contains(color.opponent()) {
            return Err(TileDuelError::OutOfTurn);
        }

        self.pending.insert(color, tile);
        self.used[color].push(tile);
        Ok(())
    }

    /// The side expected to play next within this round.
    pub fn next_player(&self) -> TileColor {
        if self.pending.contains(self.current) {
            self.current.opponent()
        } else {
            self.current
        }
    }

    fn resolve(&mut self) -> Option<Resolved> {
        let (&blue, &red) = self.pending.both()?;
        let winner = round_winner(blue, red);
        if let Some(color) = winner {
            self.wins[color] += 1;
            self.current = color;
        }
        let round = self.round;
        self.round += 1;
        self.pending.clear();

        if self.outcome.is_none() {
            self.outcome = self.check_over();
        }
        Some(Resolved {
            round,
            blue,
            red,
            winner,
        })
    }

    fn check_over(&self) -> Option<Option<TileColor>> {
        if let Some((color, _)) = self
            .wins
            .iter()
            .find(|(_, wins)| **wins >= self.config.wins_needed)
        {
            return Some(Some(color));
        }
        if self.round > self.config.max_rounds {
            let (blue, red) = (self.wins[TileColor::Blue], self.wins[TileColor::Red]);
            return Some(match blue.cmp(&red) {
                std::cmp::Ordering::Greater => Some(TileColor::Blue),
                std::cmp::Ordering::Less => Some(TileColor::Red),
                std::cmp::Ordering::Equal => None,
            });
        }
        None
    }
}

/// The tile duel game.
pub struct TileDuel;

impl DuelGame for TileDuel {
    type Side = TileColor;
    type Config = TileDuelConfig;
    type State = TileDuelState;
    type Action = TileAction;
    type Move = i32;
    type Event = TileEvent;
    type Error = TileDuelError;

    const NAME: &'static str = "tile-duel";

    fn classify(action: TileAction) -> PlayerAction<TileColor, i32> {
        match action {
            TileAction::JoinGame { player_name, color } => PlayerAction::Join(JoinRequest {
                player_name,
                preferred: color,
            }),
            TileAction::PlayTile { tile } => PlayerAction::Move(tile),
        }
    }

    fn init(config: &TileDuelConfig) -> TileDuelState {
        TileDuelState::new(config.clone())
    }

    /// Blue always leads the first round.
    fn start<R: Rng + ?Sized>(state: &mut TileDuelState, _rng: &mut R) -> TileColor {
        state.current
    }

    fn apply(
        state: &mut TileDuelState,
        color: TileColor,
        tile: i32,
    ) -> Result<Outbox<Self>, TileDuelError> {
        state.play(color, tile)?;
        tracing::debug!(%color, tile, round = state.round, "tile played");

        let next = state.next_player();
        let mut out = vec![(
            Recipient::All,
            TileEvent::TilePlayed {
                color,
                tile,
                round: state.round,
                next_player: next,
                waiting_for: next,
                blue_tile_played: state.has_played(TileColor::Blue),
                red_tile_played: state.has_played(TileColor::Red),
            },
        )];

        let Some(resolved) = state.resolve() else {
            return Ok(out);
        };
        out.push((
            Recipient::All,
            TileEvent::RoundResult {
                round: resolved.round,
                blue_tile: resolved.blue,
                red_tile: resolved.red,
                winner: resolved.winner,
                blue_wins: state.wins[TileColor::Blue],
                red_wins: state.wins[TileColor::Red],
                next_player: state.current,
            },
        ));

        if let Some(winner) = state.outcome {
            out.push((
                Recipient::All,
                TileEvent::GameOver {
                    winner,
                    blue_wins: state.wins[TileColor::Blue],
                    red_wins: state.wins[TileColor::Red],
                },
            ));
        }
        Ok(out)
    }

    fn is_finished(state: &TileDuelState) -> bool {
        state.outcome.is_some()
    }

    fn joined(side: TileColor, match_id: MatchId) -> TileEvent {
        TileEvent::PlayerJoined {
            your_color: side,
            game_id: match_id,
        }
    }

    fn waiting() -> TileEvent {
        TileEvent::WaitingPlayer {
            message: "waiting for an opponent...".to_owned(),
        }
    }

    fn match_start(
        first: TileColor,
        you: TileColor,
        names: &PerSide<TileColor, String>,
    ) -> TileEvent {
        TileEvent::GameStart {
            first_player: first,
            your_color: you,
            blue_name: names[TileColor::Blue].clone(),
            red_name: names[TileColor::Red].clone(),
        }
    }

    fn error(message: String) -> TileEvent {
        TileEvent::Error { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use TileColor::{Blue, Red};

    fn state() -> TileDuelState {
        TileDuelState::new(TileDuelConfig::default())
    }

    fn events(out: Outbox<TileDuel>) -> Vec<TileEvent> {
        out.into_iter().map(|(_, event)| event).collect()
    }

    #[test]
    fn test_one_beats_nine() {
        let mut s = state();
        TileDuel::apply(&mut s, Blue, 1).unwrap();
        let out = events(TileDuel::apply(&mut s, Red, 9).unwrap());

        assert!(matches!(
            out[1],
            TileEvent::RoundResult {
                round: 1,
                blue_tile: 1,
                red_tile: 9,
                winner: Some(Blue),
                blue_wins: 1,
                red_wins: 0,
                next_player: Blue,
            }
        ));
        assert_eq!(s.round(), 2);
    }

    #[test]
    fn test_equal_tiles_draw_and_keep_leader() {
        let mut s = state();
        TileDuel::apply(&mut s, Blue, 5).unwrap();
        let out = events(TileDuel::apply(&mut s, Red, 5).unwrap());

        assert!(matches!(
            out[1],
            TileEvent::RoundResult {
                winner: None,
                blue_wins: 0,
                red_wins: 0,
                next_player: Blue,
                ..
            }
        ));
        assert_eq!(s.round(), 2);
        assert_eq!(s.current_turn(), Blue);
    }

    #[test]
    fn test_round_winner_leads_next_round() {
        let mut s = state();
        s.play(Blue, 3).unwrap();
        s.play(Red, 7).unwrap();
        s.resolve();

        assert_eq!(s.current_turn(), Red);
        assert_eq!(s.play(Blue, 4), Err(TileDuelError::OutOfTurn));
        s.play(Red, 2).unwrap();
        s.play(Blue, 4).unwrap();
    }

    #[test]
    fn test_validation_order() {
        let mut s = state();
        assert_eq!(s.play(Blue, 0), Err(TileDuelError::InvalidValue(0)));
        assert_eq!(s.play(Red, 10), Err(TileDuelError::InvalidValue(10)));
        assert_eq!(s.play(Red, 4), Err(TileDuelError::OutOfTurn));

        s.play(Blue, 4).unwrap();
        // Reuse is reported before the duplicate submission.
        assert_eq!(s.play(Blue, 4), Err(TileDuelError::ValueReused(4)));
        assert_eq!(s.play(Blue, 6), Err(TileDuelError::AlreadySubmitted));
    }

    #[test]
    fn test_rejected_tile_leaves_state_unchanged() {
        let mut s = state();
        assert!(TileDuel::apply(&mut s, Red, 3).is_err());
        assert!(s.used(Red).is_empty());
        assert!(!s.has_played(Red));
        assert_eq!(s.round(), 1);
    }

    #[test]
    fn test_tile_played_notice_tracks_who_played() {
        let mut s = state();
        let out = events(TileDuel::apply(&mut s, Blue, 6).unwrap());
        assert_eq!(
            out,
            vec![TileEvent::TilePlayed {
                color: Blue,
                tile: 6,
                round: 1,
                next_player: Red,
                waiting_for: Red,
                blue_tile_played: true,
                red_tile_played: false,
            }]
        );
    }

    #[test]
    fn test_fifth_win_ends_match() {
        let mut s = state();
        for (blue, red) in [(9, 8), (8, 7), (7, 6), (6, 5)] {
            s.play(Blue, blue).unwrap();
            s.play(Red, red).unwrap();
            s.resolve();
        }
        assert!(!TileDuel::is_finished(&s));

        TileDuel::apply(&mut s, Blue, 5).unwrap();
        let out = events(TileDuel::apply(&mut s, Red, 4).unwrap());
        assert_eq!(
            out.last(),
            Some(&TileEvent::GameOver {
                winner: Some(Blue),
                blue_wins: 5,
                red_wins: 0,
            })
        );
        assert!(TileDuel::is_finished(&s));
    }

    #[test]
    fn test_nine_rounds_of_draws_end_in_a_draw() {
        let mut s = state();
        for tile in 1..=9 {
            s.play(Blue, tile).unwrap();
            s.play(Red, tile).unwrap();
            s.resolve();
        }
        assert_eq!(s.outcome(), Some(None));
    }

    #[test]
    fn test_match_start_carries_both_names() {
        let names = PerSide::from_fn(|color: TileColor| color.to_string().to_uppercase());
        let event = TileDuel::match_start(Blue, Red, &names);
        assert_eq!(
            event,
            TileEvent::GameStart {
                first_player: Blue,
                your_color: Red,
                blue_name: "BLUE".into(),
                red_name: "RED".into(),
            }
        );
    }
}
