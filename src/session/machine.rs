//! The match state machine.
//!
//! `MatchSession` is the single authoritative owner of a match: the player
//! registry, the current round's barrier, the countdown timer, and the round
//! counter. All mutation goes through its methods, one call at a time. It
//! performs no I/O and never sleeps; the caller moves time forward with
//! [`MatchSession::advance_time`].

use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::core::error::{ConfigResult, MatchError, MatchResult, SubmitError, SubmitResult};
use crate::core::{MatchConfig, Player, PlayerId, PlayerProfile, PlayerRegistry, RegistryView};
use crate::events::{CountdownPhase, EventBus, MatchEvent, SubscriberId};
use crate::record::{MatchRecord, RoundRecord};
use crate::round::{BarrierResponse, RoundTimer, SubmissionBarrier};
use crate::rules::{RoundOutcome, RuleEngine, StandardRuleEngine};

use super::phase::MatchPhase;

/// Why a well-formed submission had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The player already submitted this round.
    AlreadySubmitted,
    /// Negative sentinel; any staged value was cleared.
    Cleared,
    /// No round is collecting (late or early submission).
    NotCollecting,
    /// The player is not part of the current round.
    NotInRound,
}

/// Result of a submission that passed boundary validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitResponse {
    /// Value collected for the current round.
    Accepted,
    /// No-op. Not an error for the match.
    Ignored(IgnoreReason),
}

/// Authoritative match driver.
#[derive(Debug)]
pub struct MatchSession<E = StandardRuleEngine> {
    config: MatchConfig,
    engine: E,
    registry: PlayerRegistry,
    phase: MatchPhase,
    round: u32,
    barrier: Option<SubmissionBarrier>,
    timer: RoundTimer,
    last_submitted: FxHashMap<PlayerId, i32>,
    staged: FxHashMap<PlayerId, i32>,
    last_outcome: Option<RoundOutcome>,
    winner: Option<PlayerId>,
    record: MatchRecord,
    events: EventBus,
}

impl MatchSession<StandardRuleEngine> {
    /// Create a session with the standard rule engine.
    ///
    /// Fails if the configuration cannot resolve rounds.
    pub fn new(config: MatchConfig) -> ConfigResult<Self> {
        let engine = StandardRuleEngine::new(config.rules.clone(), config.max_value)?;
        Self::with_engine(config, engine)
    }
}

impl<E: RuleEngine> MatchSession<E> {
    /// Create a session with a custom rule engine.
    pub fn with_engine(config: MatchConfig, engine: E) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            record: MatchRecord::new(config.clone(), Vec::new()),
            config,
            engine,
            registry: PlayerRegistry::new(),
            phase: MatchPhase::WaitingForStart,
            round: 0,
            barrier: None,
            timer: RoundTimer::new(),
            last_submitted: FxHashMap::default(),
            staged: FxHashMap::default(),
            last_outcome: None,
            winner: None,
            events: EventBus::new(),
        })
    }

    // === Setup ===

    /// Add a player before the match starts.
    ///
    /// Returns `Ok(false)` if the id was already registered. A profile whose
    /// starting score is not positive is rejected.
    pub fn register_player(&mut self, profile: &PlayerProfile) -> MatchResult<bool> {
        if self.phase != MatchPhase::WaitingForStart {
            warn!(player = %profile.id, phase = %self.phase, "registration after start rejected");
            return Err(if self.phase.is_terminal() {
                MatchError::MatchOver
            } else {
                MatchError::AlreadyStarted
            });
        }
        let player = Player::from_profile(profile, self.config.starting_score);
        if player.score <= 0 {
            warn!(player = %profile.id, score = player.score, "non-positive starting score rejected");
            return Err(MatchError::InvalidStartingScore {
                player: profile.id,
                score: player.score,
            });
        }
        Ok(self.registry.register(player))
    }

    /// Add or replace an event subscriber.
    pub fn subscribe(&mut self, id: SubscriberId, handler: impl FnMut(&MatchEvent) + Send + 'static) -> bool {
        self.events.subscribe(id, handler)
    }

    /// Remove an event subscriber.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Begin round 1.
    pub fn start_match(&mut self) -> MatchResult<()> {
        match self.phase {
            MatchPhase::WaitingForStart => {}
            phase if phase.is_terminal() => return Err(MatchError::MatchOver),
            _ => return Err(MatchError::AlreadyStarted),
        }
        let registered = self.registry.len();
        if registered < self.config.min_players {
            return Err(MatchError::NotEnoughPlayers {
                required: self.config.min_players,
                registered,
            });
        }

        self.record = MatchRecord::new(self.config.clone(), self.registry.view().into_iter().collect());
        info!(players = registered, "match started");
        self.begin_round();
        Ok(())
    }

    /// Stop the match. Timers are cancelled and no further deltas apply.
    pub fn abort(&mut self) -> MatchResult<()> {
        if self.phase.is_terminal() {
            return Err(MatchError::MatchOver);
        }
        self.timer.cancel();
        self.barrier = None;
        self.phase = MatchPhase::Aborted;
        self.record.finish(None, self.registry.scores());
        warn!(round = self.round, "match aborted");
        self.events.publish(&MatchEvent::MatchAborted { round: self.round });
        Ok(())
    }

    // === Commands ===

    /// Submit a value for the current round.
    ///
    /// Out-of-range values, unknown players, and eliminated players are
    /// rejected. A negative value clears the player's staged value. Late and
    /// repeat submissions are ignored.
    pub fn submit(&mut self, player: PlayerId, value: i32) -> SubmitResult<SubmitResponse> {
        self.check_submitter(player)?;
        if value < 0 {
            self.staged.remove(&player);
            return Ok(SubmitResponse::Ignored(IgnoreReason::Cleared));
        }
        self.check_range(value)?;

        let Some(barrier) = self.barrier.as_mut() else {
            debug!(%player, round = self.round, phase = %self.phase, "submission outside collection ignored");
            return Ok(SubmitResponse::Ignored(IgnoreReason::NotCollecting));
        };

        match barrier.submit(player, value) {
            BarrierResponse::Collected => {}
            BarrierResponse::AlreadyCollected => {
                return Ok(SubmitResponse::Ignored(IgnoreReason::AlreadySubmitted));
            }
            BarrierResponse::NotRequired => {
                return Ok(SubmitResponse::Ignored(IgnoreReason::NotInRound));
            }
            BarrierResponse::Cleared => return Ok(SubmitResponse::Ignored(IgnoreReason::Cleared)),
        }

        let complete = barrier.is_complete();
        self.last_submitted.insert(player, value);
        self.staged.remove(&player);
        debug!(%player, round = self.round, "submission accepted");
        self.events.publish(&MatchEvent::SubmissionAccepted {
            round: self.round,
            player,
        });

        if complete {
            self.resolve();
        }
        Ok(SubmitResponse::Accepted)
    }

    /// Record a pending (not yet submitted) value from the player's input.
    ///
    /// Used instead of the last submitted value if the player times out.
    /// A negative value clears it.
    pub fn stage(&mut self, player: PlayerId, value: i32) -> SubmitResult<()> {
        self.check_submitter(player)?;
        if value < 0 {
            self.staged.remove(&player);
            return Ok(());
        }
        self.check_range(value)?;
        self.staged.insert(player, value);
        Ok(())
    }

    /// Move the clock forward, firing countdown ticks and phase transitions.
    pub fn advance_time(&mut self, elapsed: Duration) {
        let phase = match self.phase {
            MatchPhase::CountingDown => CountdownPhase::PreRound,
            MatchPhase::CollectingSubmissions => CountdownPhase::Submission,
            MatchPhase::RoundComplete => CountdownPhase::Reveal,
            _ => return,
        };

        let update = self.timer.advance(elapsed);
        for seconds_remaining in update.ticks {
            self.events.publish(&MatchEvent::CountdownTick {
                phase,
                seconds_remaining,
            });
        }
        if !update.expired {
            return;
        }

        match phase {
            CountdownPhase::PreRound => self.open_collection(),
            CountdownPhase::Submission => self.on_submission_timeout(),
            CountdownPhase::Reveal => self.begin_round(),
        }
    }

    // === Queries ===

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Current round number. 0 before the match starts.
    #[must_use]
    pub fn current_round_number(&self) -> u32 {
        self.round
    }

    /// Read-only snapshot of every player.
    #[must_use]
    pub fn registry_view(&self) -> RegistryView {
        self.registry.view()
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// Most recently resolved round.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.last_outcome.as_ref()
    }

    /// Winner, once the match has ended with one.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Whole seconds left on the running countdown.
    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.timer.seconds_remaining()
    }

    /// Has `player` submitted in the current round?
    #[must_use]
    pub fn has_submitted(&self, player: PlayerId) -> bool {
        self.barrier.as_ref().is_some_and(|b| b.has_submitted(player))
    }

    /// Match configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Record of all resolved rounds so far.
    #[must_use]
    pub fn record(&self) -> &MatchRecord {
        &self.record
    }

    /// Consume the session, keeping its record.
    #[must_use]
    pub fn into_record(self) -> MatchRecord {
        self.record
    }

    /// Ended or aborted.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    // === Transitions ===

    fn check_submitter(&self, player: PlayerId) -> SubmitResult<()> {
        match self.registry.get(player) {
            None => {
                warn!(%player, "command from unknown player rejected");
                Err(SubmitError::UnknownPlayer(player))
            }
            Some(p) if !p.is_active() => Err(SubmitError::Eliminated(player)),
            Some(_) => Ok(()),
        }
    }

    fn check_range(&self, value: i32) -> SubmitResult<()> {
        if self.config.in_range(value) {
            Ok(())
        } else {
            Err(SubmitError::OutOfRange {
                value,
                max: self.config.max_value,
            })
        }
    }

    /// Increment the round counter and enter the pre-round countdown.
    fn begin_round(&mut self) {
        self.round += 1;
        self.phase = MatchPhase::CountingDown;
        self.timer.cancel();

        let countdown = self.config.pre_round_countdown();
        if countdown.is_zero() {
            self.open_collection();
        } else {
            self.timer.start(countdown);
        }
    }

    fn open_collection(&mut self) {
        let required = self.registry.active_ids();
        info!(round = self.round, players = required.len(), "round started");

        self.staged.clear();
        self.barrier = Some(SubmissionBarrier::open(self.round, required.clone()));
        self.phase = MatchPhase::CollectingSubmissions;
        self.timer.start(self.config.submission_window());
        self.events.publish(&MatchEvent::RoundStarted {
            round: self.round,
            required,
        });
    }

    /// Fill every missing value, then resolve.
    fn on_submission_timeout(&mut self) {
        let Some(barrier) = self.barrier.as_mut() else {
            return;
        };
        for player in barrier.missing() {
            let value = self
                .staged
                .get(&player)
                .or_else(|| self.last_submitted.get(&player))
                .copied()
                .unwrap_or(0);
            barrier.force(player, value);
            self.last_submitted.insert(player, value);
            info!(%player, round = self.round, value, "submission forced at timeout");
        }
        self.resolve();
    }

    fn resolve(&mut self) {
        let Some(barrier) = self.barrier.as_ref() else {
            return;
        };
        if barrier.collected().is_empty() {
            // Nobody left to submit. Stay collecting until aborted.
            warn!(round = self.round, "round stalled with no submissions");
            return;
        }

        self.phase = MatchPhase::Resolving;
        self.timer.cancel();
        let Some(barrier) = self.barrier.take() else {
            return;
        };
        let submissions = barrier.collected().clone();
        let outcome = self.engine.resolve_round(self.round, &submissions);

        info!(
            round = self.round,
            target = ?outcome.target,
            winners = ?outcome.winner_ids,
            duel = outcome.final_duel_triggered,
            "round resolved"
        );
        self.events.publish(&MatchEvent::RoundResolved {
            round: self.round,
            outcome: outcome.clone(),
        });

        for (&player, &delta) in &outcome.point_deltas {
            let Some(change) = self.registry.apply_delta(player, delta) else {
                continue;
            };
            if delta != 0 {
                self.events.publish(&MatchEvent::ScoreChanged {
                    player,
                    score: change.score,
                });
            }
            if change.eliminated {
                info!(%player, round = self.round, "player eliminated");
                self.events.publish(&MatchEvent::PlayerEliminated {
                    player,
                    round: self.round,
                });
            }
        }

        self.record.push_round(RoundRecord {
            round: self.round,
            submissions,
            forced: barrier.forced_players().clone(),
            outcome: outcome.clone(),
        });
        self.last_outcome = Some(outcome);
        self.phase = MatchPhase::RoundComplete;

        let active = self.registry.active_ids();
        if active.len() <= 1 {
            self.end_match(active.first().copied());
            return;
        }

        let reveal = self.config.reveal_pause();
        if reveal.is_zero() {
            self.begin_round();
        } else {
            self.timer.start(reveal);
        }
    }

    fn end_match(&mut self, winner: Option<PlayerId>) {
        self.timer.cancel();
        self.phase = MatchPhase::MatchEnded;
        self.winner = winner;
        self.record.finish(winner, self.registry.scores());
        match winner {
            Some(player) => info!(%player, round = self.round, "match won"),
            None => warn!(round = self.round, "match ended with no players left"),
        }
        self.events.publish(&MatchEvent::MatchEnded { winner });
    }
}
