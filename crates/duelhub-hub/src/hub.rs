//! Hub actor: the single task that owns every match of one game type.
//!
//! Connection actors talk to the hub only through a bounded `mpsc`
//! channel of [`HubEvent`]s. The hub drains it one event at a time and
//! never awaits while handling one, so match state has exactly one
//! writer and needs no locks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use duelhub_protocol::{MatchId, ParticipantId, PerSide, Recipient, Side};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::{DuelGame, HubConfig, HubError, JoinRequest, MatchRegistry, PlayerAction};

/// Counter for generating unique participant IDs.
static NEXT_PARTICIPANT_ID: AtomicU64 = AtomicU64::new(1);

/// Channel sender for delivering outbound events to one participant.
pub type Outbound<G> = mpsc::Sender<<G as DuelGame>::Event>;

/// Events consumed by the hub loop.
pub enum HubEvent<G: DuelGame> {
    /// A connection opened. No game effect.
    Connect {
        participant: ParticipantId,
        outbound: Outbound<G>,
    },

    /// A connection closed.
    Disconnect { participant: ParticipantId },

    /// A decoded inbound message.
    Action {
        participant: ParticipantId,
        action: G::Action,
    },

    /// Request a snapshot of hub metadata.
    Inspect { reply: oneshot::Sender<HubInfo> },
}

/// A snapshot of hub metadata (not game state).
#[derive(Debug, Clone)]
pub struct HubInfo {
    pub game: &'static str,
    /// Number of live participants.
    pub participants: usize,
    /// Number of live matches, open or ready.
    pub matches: usize,
    pub open_match: Option<MatchId>,
    pub match_ids: Vec<MatchId>,
}

struct Participant<G: DuelGame> {
    name: String,
    /// Last match this participant was seated in. The match may since
    /// have been removed.
    seat: Option<(MatchId, G::Side)>,
    outbound: Outbound<G>,
}

/// The hub's owned state. Lives inside the task started by [`spawn_hub`].
pub struct Hub<G: DuelGame> {
    game_config: G::Config,
    participants: HashMap<ParticipantId, Participant<G>>,
    registry: MatchRegistry<G>,
    rng: StdRng,
    /// Participants whose outbound queue overflowed or closed while the
    /// current event was handled.
    evicted: Vec<ParticipantId>,
}

impl<G: DuelGame> Hub<G> {
    pub fn new(config: &HubConfig, game_config: G::Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            game_config,
            participants: HashMap::new(),
            registry: MatchRegistry::new(),
            rng,
            evicted: Vec::new(),
        }
    }

    /// Applies one event, then processes any evictions it caused.
    pub fn handle(&mut self, event: HubEvent<G>) {
        match event {
            HubEvent::Connect {
                participant,
                outbound,
            } => {
                tracing::info!(game = G::NAME, %participant, "participant connected");
                self.participants.insert(
                    participant,
                    Participant {
                        name: String::new(),
                        seat: None,
                        outbound,
                    },
                );
            }
            HubEvent::Disconnect { participant } => self.handle_disconnect(participant),
            HubEvent::Action {
                participant,
                action,
            } => self.handle_action(participant, action),
            HubEvent::Inspect { reply } => {
                let _ = reply.send(self.info());
            }
        }

        // Eviction can cascade (the opponent's queue may be full too), so
        // drain until nothing new was queued.
        while let Some(participant) = self.evicted.pop() {
            self.handle_disconnect(participant);
        }
    }

    pub fn info(&self) -> HubInfo {
        HubInfo {
            game: G::NAME,
            participants: self.participants.len(),
            matches: self.registry.len(),
            open_match: self.registry.open_match(),
            match_ids: self.registry.match_ids(),
        }
    }

    fn handle_action(&mut self, participant: ParticipantId, action: G::Action) {
        if !self.participants.contains_key(&participant) {
            tracing::debug!(game = G::NAME, %participant, "action from unknown participant dropped");
            return;
        }

        let result = match G::classify(action) {
            PlayerAction::Join(request) => self.handle_join(participant, request),
            PlayerAction::Move(mv) => self.handle_move(participant, mv),
        };

        if let Err(e) = result {
            tracing::debug!(game = G::NAME, %participant, error = %e, "action rejected");
            self.send(participant, G::error(e.to_string()));
        }
    }

    fn handle_join(
        &mut self,
        participant: ParticipantId,
        request: JoinRequest<G::Side>,
    ) -> Result<(), HubError> {
        if let Some((match_id, _)) = self.participants.get(&participant).and_then(|p| p.seat) {
            if self.registry.contains(match_id) {
                return Err(HubError::AlreadyInMatch(participant, match_id));
            }
        }

        let seating = self
            .registry
            .seat(participant, request.preferred, &self.game_config);
        if let Some(p) = self.participants.get_mut(&participant) {
            p.name = request.player_name;
            p.seat = Some((seating.match_id, seating.side));
        }
        tracing::info!(
            game = G::NAME,
            %participant,
            match_id = %seating.match_id,
            side = %seating.side,
            "participant seated"
        );

        self.send(participant, G::joined(seating.side, seating.match_id));
        if seating.ready {
            self.start_match(seating.match_id);
        } else {
            self.send(participant, G::waiting());
        }
        Ok(())
    }

    fn start_match(&mut self, match_id: MatchId) {
        let Some(m) = self.registry.get_mut(match_id) else {
            return;
        };
        let first = G::start(m.state_mut(), &mut self.rng);
        let seated: Vec<_> = m.occupants().collect();

        let names: PerSide<G::Side, String> = PerSide::from_fn(|side| {
            seated
                .iter()
                .find(|(s, _)| *s == side)
                .and_then(|(_, pid)| self.participants.get(pid))
                .map(|p| p.name.clone())
                .unwrap_or_default()
        });

        tracing::info!(game = G::NAME, %match_id, first = %first, "match started");
        for (side, pid) in seated {
            self.send(pid, G::match_start(first, side, &names));
        }
    }

    fn handle_move(&mut self, participant: ParticipantId, mv: G::Move) -> Result<(), HubError> {
        let (match_id, side) = self
            .participants
            .get(&participant)
            .and_then(|p| p.seat)
            .ok_or(HubError::NotInMatch(participant))?;

        let m = self
            .registry
            .get_mut(match_id)
            .ok_or(HubError::MatchNotFound(match_id))?;
        if !m.is_ready() {
            return Err(HubError::MatchNotReady(match_id));
        }

        let outbox =
            G::apply(m.state_mut(), side, mv).map_err(|e| HubError::Rejected(e.to_string()))?;
        let finished = G::is_finished(m.state());
        let seated: Vec<_> = m.occupants().collect();

        for (recipient, event) in outbox {
            match recipient {
                Recipient::All => {
                    for (_, pid) in &seated {
                        self.send(*pid, event.clone());
                    }
                }
                Recipient::Only(target) => {
                    if let Some((_, pid)) = seated.iter().find(|(s, _)| *s == target) {
                        self.send(*pid, event);
                    }
                }
            }
        }

        if finished {
            self.registry.remove(match_id);
            tracing::info!(game = G::NAME, %match_id, "match finished");
        }
        Ok(())
    }

    fn handle_disconnect(&mut self, participant: ParticipantId) {
        // Dropping the record drops the outbound sender, which ends the
        // connection's writer pump.
        let Some(record) = self.participants.remove(&participant) else {
            return;
        };
        tracing::info!(game = G::NAME, %participant, "participant disconnected");

        let Some((match_id, side)) = record.seat else {
            return;
        };
        let Some(m) = self.registry.remove(match_id) else {
            return;
        };
        tracing::info!(game = G::NAME, %match_id, %participant, "match abandoned");

        if let Some(opponent) = m.occupant(side.opponent()) {
            self.send(opponent, G::error("opponent left the match".to_owned()));
        }
    }

    /// Non-blocking delivery. A full or closed queue schedules the
    /// participant for eviction.
    fn send(&mut self, participant: ParticipantId, event: G::Event) {
        let Some(record) = self.participants.get(&participant) else {
            return;
        };
        match record.outbound.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(game = G::NAME, %participant, "outbound queue full, evicting");
                self.evicted.push(participant);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(game = G::NAME, %participant, "outbound queue closed, evicting");
                self.evicted.push(participant);
            }
        }
    }
}

/// Starts a hub task and returns a handle to it.
///
/// The task runs until every [`HubHandle`] is dropped.
pub fn spawn_hub<G: DuelGame>(config: HubConfig, game_config: G::Config) -> HubHandle<G> {
    let (tx, mut rx) = mpsc::channel(config.event_capacity.max(1));
    let mut hub = Hub::<G>::new(&config, game_config);

    tokio::spawn(async move {
        tracing::info!(game = G::NAME, "hub started");
        while let Some(event) = rx.recv().await {
            hub.handle(event);
        }
        tracing::info!(game = G::NAME, "hub stopped");
    });

    HubHandle {
        sender: tx,
        outbound_capacity: config.outbound_capacity.max(1),
    }
}

/// Handle to a running hub. Cheap to clone.
pub struct HubHandle<G: DuelGame> {
    sender: mpsc::Sender<HubEvent<G>>,
    outbound_capacity: usize,
}

impl<G: DuelGame> Clone for HubHandle<G> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            outbound_capacity: self.outbound_capacity,
        }
    }
}

impl<G: DuelGame> HubHandle<G> {
    /// Registers a new participant and returns its id together with the
    /// receiving end of its outbound queue.
    pub async fn connect(&self) -> Result<(ParticipantId, mpsc::Receiver<G::Event>), HubError> {
        let participant = ParticipantId(NEXT_PARTICIPANT_ID.fetch_add(1, Ordering::Relaxed));
        let (outbound, rx) = mpsc::channel(self.outbound_capacity);
        self.submit(HubEvent::Connect {
            participant,
            outbound,
        })
        .await?;
        Ok((participant, rx))
    }

    pub async fn disconnect(&self, participant: ParticipantId) -> Result<(), HubError> {
        self.submit(HubEvent::Disconnect { participant }).await
    }

    /// Forwards a decoded inbound message (fire-and-forget).
    pub async fn act(&self, participant: ParticipantId, action: G::Action) -> Result<(), HubError> {
        self.submit(HubEvent::Action {
            participant,
            action,
        })
        .await
    }

    pub async fn info(&self) -> Result<HubInfo, HubError> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubEvent::Inspect { reply }).await?;
        rx.await.map_err(|_| HubError::Unavailable(G::NAME))
    }

    async fn submit(&self, event: HubEvent<G>) -> Result<(), HubError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| HubError::Unavailable(G::NAME))
    }
}
