//! Block exchange: both teams commit two blocks a round, the larger sum
//! scores, and each team receives one of the other's blocks.
//!
//! Normally a team receives the larger of the opponent's two blocks.
//! Once per match a team may play its hidden chance, which lets the
//! opponent choose which of the two blocks it receives instead. A round
//! that involves a hidden chance waits until that choice is made.

use duelhub_hub::{DuelGame, JoinRequest, Outbox, PlayerAction};
use duelhub_protocol::{
    BlockAction, BlockEvent, GameOverReason, MatchId, PerSide, Recipient, Side, SideMap, Team,
};
use rand::Rng;

use crate::BlockExchangeError;

/// Block exchange settings.
#[derive(Debug, Clone)]
pub struct BlockExchangeConfig {
    /// The match ends once this many rounds have resolved.
    pub max_rounds: u32,
    /// Points that end the match early.
    pub score_limit: u32,
    /// Every team's inventory at match start.
    pub starting_blocks: Vec<i32>,
}

impl Default for BlockExchangeConfig {
    fn default() -> Self {
        Self {
            max_rounds: 12,
            score_limit: 7,
            starting_blocks: (1..=7).chain(1..=7).collect(),
        }
    }
}

/// The non-join moves of a block exchange match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMove {
    Submit {
        block1: i32,
        block2: i32,
        use_hidden: bool,
        /// `0` for no choice yet, else `1` or `2`.
        selection: i32,
    },
    Select(i32),
}

/// One team's pending commitment for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub block1: i32,
    pub block2: i32,
    pub use_hidden: bool,
    /// Which of the opponent's blocks to receive if the opponent played
    /// its hidden chance.
    pub selection: Option<u8>,
}

impl Submission {
    fn total(&self) -> i32 {
        self.block1 + self.block2
    }

    /// The block the other team receives from this submission.
    fn handed_over(&self, chooser: Option<u8>) -> i32 {
        if self.use_hidden {
            match chooser {
                Some(2) => self.block2,
                _ => self.block1,
            }
        } else {
            self.block1.max(self.block2)
        }
    }
}

/// A resolved round, kept for the lifetime of the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub round: u32,
    pub submissions: PerSide<Team, Submission>,
    pub winner: Option<Team>,
    pub received: PerSide<Team, i32>,
}

/// Per-match block exchange state.
#[derive(Debug, Clone)]
pub struct BlockExchangeState {
    config: BlockExchangeConfig,
    round: u32,
    scores: PerSide<Team, u32>,
    inventory: PerSide<Team, Vec<i32>>,
    hidden_used: PerSide<Team, bool>,
    pending: SideMap<Team, Submission>,
    current: Team,
    history: Vec<RoundRecord>,
    outcome: Option<(Option<Team>, GameOverReason)>,
}

fn parse_selection(raw: i32) -> Result<u8, BlockExchangeError> {
    match raw {
        1 => Ok(1),
        2 => Ok(2),
        other => Err(BlockExchangeError::InvalidSelection(other)),
    }
}

impl BlockExchangeState {
    pub fn new(config: BlockExchangeConfig) -> Self {
        let inventory = PerSide::from_fn(|_| config.starting_blocks.clone());
        Self {
            config,
            round: 1,
            scores: PerSide::default(),
            inventory,
            hidden_used: PerSide::default(),
            pending: SideMap::new(),
            current: Team::Team1,
            history: Vec::new(),
            outcome: None,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self, team: Team) -> u32 {
        self.scores[team]
    }

    pub fn inventory(&self, team: Team) -> &[i32] {
        &self.inventory[team]
    }

    pub fn hidden_used(&self, team: Team) -> bool {
        self.hidden_used[team]
    }

    pub fn pending(&self, team: Team) -> Option<&Submission> {
        self.pending.get(team)
    }

    /// Informational turn marker. Flips every resolved round.
    pub fn current_team(&self) -> Team {
        self.current
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn outcome(&self) -> Option<(Option<Team>, GameOverReason)> {
        self.outcome
    }

    fn owns(&self, team: Team, block1: i32, block2: i32) -> Result<(), BlockExchangeError> {
        let count = |value: i32| self.inventory[team].iter().filter(|b| **b == value).count();
        if count(block1) == 0 {
            return Err(BlockExchangeError::UnownedBlock(block1));
        }
        if block1 == block2 && count(block1) < 2 {
            return Err(BlockExchangeError::UnownedBlock(block2));
        }
        if count(block2) == 0 {
            return Err(BlockExchangeError::UnownedBlock(block2));
        }
        Ok(())
    }

    /// Validates and stores a submission, replacing any earlier one from
    /// the same team this round.
    pub fn submit(
        &mut self,
        team: Team,
        block1: i32,
        block2: i32,
        use_hidden: bool,
        selection: i32,
    ) -> Result<(), BlockExchangeError> {
        self.owns(team, block1, block2)?;
        if use_hidden && self.hidden_used[team] {
            return Err(BlockExchangeError::HiddenAlreadyUsed);
        }
        let selection = match selection {
            0 => None,
            raw => Some(parse_selection(raw)?),
        };

        self.pending.insert(
            team,
            Submission {
                block1,
                block2,
                use_hidden,
                selection,
            },
        );
        Ok(())
    }

    /// Sets the block choice on the team's pending submission.
    pub fn select(&mut self, team: Team, selection: i32) -> Result<(), BlockExchangeError> {
        let pending = self
            .pending
            .get_mut(team)
            .ok_or(BlockExchangeError::NoPendingSubmission)?;
        pending.selection = Some(parse_selection(selection)?);
        Ok(())
    }

    /// `true` when both teams have submitted and every team facing a
    /// hidden chance has chosen a block.
    pub fn can_resolve(&self) -> bool {
        let Some((first, second)) = self.pending.both() else {
            return false;
        };
        let chosen = |own: &Submission, other: &Submission| !other.use_hidden || own.selection.is_some();
        chosen(first, second) && chosen(second, first)
    }

    fn resolve(&mut self) -> Option<RoundRecord> {
        if !self.can_resolve() {
            return None;
        }
        let (Some(one), Some(two)) = (self.pending.take(Team::Team1), self.pending.take(Team::Team2))
        else {
            return None;
        };
        let submissions = PerSide::from_fn(|team| if team == Team::Team1 { one } else { two });

        let winner = match one.total().cmp(&two.total()) {
            std::cmp::Ordering::Greater => Some(Team::Team1),
            std::cmp::Ordering::Less => Some(Team::Team2),
            std::cmp::Ordering::Equal => None,
        };
        if let Some(team) = winner {
            self.scores[team] += 1;
        }

        let received: PerSide<Team, i32> = PerSide::from_fn(|team: Team| {
            let own = &submissions[team];
            submissions[team.opponent()].handed_over(own.selection)
        });

        for team in Team::BOTH {
            let submitted = submissions[team];
            let blocks = &mut self.inventory[team];
            for value in [submitted.block1, submitted.block2] {
                if let Some(pos) = blocks.iter().position(|b| *b == value) {
                    blocks.remove(pos);
                }
            }
            blocks.push(received[team]);
            if submitted.use_hidden {
                self.hidden_used[team] = true;
            }
        }

        let record = RoundRecord {
            round: self.round,
            submissions,
            winner,
            received,
        };
        self.history.push(record.clone());
        self.round += 1;
        self.current = self.current.opponent();

        if self.outcome.is_none() {
            self.outcome = self.check_over();
        }
        Some(record)
    }

    fn check_over(&self) -> Option<(Option<Team>, GameOverReason)> {
        if let Some((team, _)) = self
            .scores
            .iter()
            .find(|(_, score)| **score >= self.config.score_limit)
        {
            return Some((Some(team), GameOverReason::ScoreLimit));
        }
        if self.round > self.config.max_rounds {
            let (one, two) = (self.scores[Team::Team1], self.scores[Team::Team2]);
            let winner = match one.cmp(&two) {
                std::cmp::Ordering::Greater => Some(Team::Team1),
                std::cmp::Ordering::Less => Some(Team::Team2),
                std::cmp::Ordering::Equal => None,
            };
            return Some((winner, GameOverReason::RoundsComplete));
        }
        None
    }

    fn resolution_events(&mut self, out: &mut Outbox<BlockExchange>) {
        let Some(record) = self.resolve() else {
            return;
        };
        tracing::debug!(round = record.round, winner = ?record.winner, "block round resolved");

        let (one, two) = (&record.submissions[Team::Team1], &record.submissions[Team::Team2]);
        out.push((
            Recipient::All,
            BlockEvent::RoundResult {
                round: record.round,
                team1_block1: one.block1,
                team1_block2: one.block2,
                team1_total: one.total(),
                team2_block1: two.block1,
                team2_block2: two.block2,
                team2_total: two.total(),
                winner: record.winner,
                team1_score: self.scores[Team::Team1],
                team2_score: self.scores[Team::Team2],
                team1_hidden: one.use_hidden,
                team2_hidden: two.use_hidden,
                team1_received_block: record.received[Team::Team1],
                team2_received_block: record.received[Team::Team2],
                next_team: self.current,
            },
        ));

        if let Some((winner, reason)) = self.outcome {
            out.push((
                Recipient::All,
                BlockEvent::GameOver {
                    winner,
                    team1_score: self.scores[Team::Team1],
                    team2_score: self.scores[Team::Team2],
                    reason,
                },
            ));
        }
    }
}

/// The block exchange game.
pub struct BlockExchange;

impl DuelGame for BlockExchange {
    type Side = Team;
    type Config = BlockExchangeConfig;
    type State = BlockExchangeState;
    type Action = BlockAction;
    type Move = BlockMove;
    type Event = BlockEvent;
    type Error = BlockExchangeError;

    const NAME: &'static str = "block-exchange";

    fn classify(action: BlockAction) -> PlayerAction<Team, BlockMove> {
        match action {
            BlockAction::JoinGame { player_name, team } => PlayerAction::Join(JoinRequest {
                player_name,
                preferred: team,
            }),
            BlockAction::SubmitBlocks {
                block1,
                block2,
                use_hidden,
                selected_block_choice,
            } => PlayerAction::Move(BlockMove::Submit {
                block1,
                block2,
                use_hidden,
                selection: selected_block_choice,
            }),
            BlockAction::SelectBlock {
                selected_block_choice,
            } => PlayerAction::Move(BlockMove::Select(selected_block_choice)),
        }
    }

    fn init(config: &BlockExchangeConfig) -> BlockExchangeState {
        BlockExchangeState::new(config.clone())
    }

    /// The starting team is drawn at random.
    fn start<R: Rng + ?Sized>(state: &mut BlockExchangeState, rng: &mut R) -> Team {
        state.current = if rng.random_bool(0.5) {
            Team::Team1
        } else {
            Team::Team2
        };
        state.current
    }

    fn apply(
        state: &mut BlockExchangeState,
        team: Team,
        mv: BlockMove,
    ) -> Result<Outbox<Self>, BlockExchangeError> {
        let mut out = Vec::new();
        match mv {
            BlockMove::Submit {
                block1,
                block2,
                use_hidden,
                selection,
            } => {
                state.submit(team, block1, block2, use_hidden, selection)?;
                tracing::debug!(%team, block1, block2, use_hidden, "blocks submitted");

                if use_hidden {
                    out.push((
                        Recipient::Only(team.opponent()),
                        BlockEvent::HiddenUsed { team },
                    ));
                }
                out.push((
                    Recipient::All,
                    BlockEvent::BlocksSubmitted {
                        team,
                        round: state.round,
                        team1_submitted: state.pending.contains(Team::Team1),
                        team2_submitted: state.pending.contains(Team::Team2),
                    },
                ));
            }
            BlockMove::Select(selection) => {
                state.select(team, selection)?;
                tracing::debug!(%team, selection, "block selected");
            }
        }

        state.resolution_events(&mut out);
        Ok(out)
    }

    fn is_finished(state: &BlockExchangeState) -> bool {
        state.outcome.is_some()
    }

    fn joined(side: Team, match_id: MatchId) -> BlockEvent {
        BlockEvent::PlayerJoined {
            your_team: side,
            game_id: match_id,
        }
    }

    fn waiting() -> BlockEvent {
        BlockEvent::WaitingPlayer {
            message: "waiting for an opponent...".to_owned(),
        }
    }

    fn match_start(first: Team, you: Team, names: &PerSide<Team, String>) -> BlockEvent {
        BlockEvent::GameStart {
            your_team: you,
            first_team: first,
            team1_name: names[Team::Team1].clone(),
            team2_name: names[Team::Team2].clone(),
        }
    }

    fn error(message: String) -> BlockEvent {
        BlockEvent::Error { message }
    }
}
