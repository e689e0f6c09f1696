//! Simulated players.
//!
//! Bots pick values through the same `submit` path as real players, so a
//! simulated match exercises the full session: barrier, timeouts, scoring,
//! elimination. Each bot draws from its own forked [`GameRng`] stream and
//! the session clock is synthetic, so a seed fully determines the match.

use std::time::Duration;

use tracing::debug;

use crate::core::error::ConfigResult;
use crate::core::{GameRng, MatchConfig, PlayerId, PlayerProfile, PlayerState};
use crate::record::MatchRecord;
use crate::rules::RoundOutcome;
use crate::session::{MatchPhase, MatchSession};

/// What a bot can see when choosing.
#[derive(Clone, Copy, Debug)]
pub struct RoundView<'a> {
    /// Round being played.
    pub round: u32,
    /// Largest legal value.
    pub max_value: i32,
    /// Target multiplier in effect.
    pub multiplier: f64,
    /// Players still in.
    pub active_players: usize,
    /// Previous round, if any.
    pub previous: Option<&'a RoundOutcome>,
}

/// Strategy for a simulated player.
pub trait Guesser: Send {
    /// Pick a value, or `None` to sit the round out and let the timeout fill it.
    fn guess(&mut self, view: &RoundView<'_>, rng: &mut GameRng) -> Option<i32>;
}

/// Uniformly random picks.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomGuesser;

impl Guesser for RandomGuesser {
    fn guess(&mut self, view: &RoundView<'_>, rng: &mut GameRng) -> Option<i32> {
        Some(rng.gen_value(view.max_value))
    }
}

/// Assumes everyone else reasons `depth - 1` levels deep.
///
/// Level 0 guesses the midpoint; each level multiplies by the target
/// multiplier. A small jitter keeps equal-depth bots from colliding.
#[derive(Clone, Copy, Debug)]
pub struct LevelKGuesser {
    /// Reasoning depth.
    pub depth: u32,
    /// Maximum random offset.
    pub spread: i32,
}

impl LevelKGuesser {
    /// Create a level-k bot.
    #[must_use]
    pub fn new(depth: u32, spread: i32) -> Self {
        Self { depth, spread }
    }
}

impl Guesser for LevelKGuesser {
    fn guess(&mut self, view: &RoundView<'_>, rng: &mut GameRng) -> Option<i32> {
        let exponent = i32::try_from(self.depth).unwrap_or(i32::MAX);
        let base = f64::from(view.max_value) / 2.0 * view.multiplier.powi(exponent);
        let max = f64::from(view.max_value);
        // In 0..=max_value after the float clamp, so the cast is exact.
        let base = base.round().min(max).max(0.0) as i32;
        let value = base.saturating_add(rng.gen_jitter(self.spread));
        Some(value.clamp(0, view.max_value))
    }
}

/// Wraps another bot and skips rounds with some probability.
#[derive(Clone, Debug)]
pub struct Absentee<G> {
    inner: G,
    miss_probability: f64,
}

impl<G: Guesser> Absentee<G> {
    /// Miss a round with probability `miss_probability`.
    #[must_use]
    pub fn new(inner: G, miss_probability: f64) -> Self {
        Self {
            inner,
            miss_probability,
        }
    }
}

impl<G: Guesser> Guesser for Absentee<G> {
    fn guess(&mut self, view: &RoundView<'_>, rng: &mut GameRng) -> Option<i32> {
        if rng.gen_bool(self.miss_probability) {
            return None;
        }
        self.inner.guess(view, rng)
    }
}

/// Simulation settings.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Match configuration.
    pub match_config: MatchConfig,
    /// Seed for every bot's stream.
    pub seed: u64,
    /// Abort after this many rounds.
    pub max_rounds: u32,
}

impl SimulationConfig {
    /// Create simulation settings.
    #[must_use]
    pub fn new(match_config: MatchConfig, seed: u64) -> Self {
        Self {
            match_config,
            seed,
            max_rounds: 200,
        }
    }

    /// Set the round limit.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

/// Run a full match between bots. Player ids are `1..=guessers.len()`.
///
/// Time advances one second at a time outside the collection phase and
/// jumps to the deadline inside it.
pub fn simulate(config: &SimulationConfig, guessers: Vec<Box<dyn Guesser>>) -> ConfigResult<MatchRecord> {
    let mut session = MatchSession::new(config.match_config.clone())?;
    let mut root = GameRng::new(config.seed);
    let mut bots: Vec<(PlayerId, Box<dyn Guesser>, GameRng)> = Vec::with_capacity(guessers.len());

    for (i, guesser) in guessers.into_iter().enumerate() {
        let id = PlayerId::new(u32::try_from(i + 1).unwrap_or(u32::MAX));
        // Registration before start cannot fail.
        let _ = session.register_player(&PlayerProfile::new(id, format!("Bot {}", i + 1)));
        bots.push((id, guesser, root.fork()));
    }

    if session.start_match().is_err() {
        return Ok(session.into_record());
    }

    while !session.is_over() {
        if session.current_round_number() > config.max_rounds {
            let _ = session.abort();
            break;
        }
        match session.phase() {
            MatchPhase::CollectingSubmissions => play_round(&mut session, &mut bots),
            _ => session.advance_time(Duration::from_secs(1)),
        }
    }

    debug!(
        rounds = session.record().rounds.len(),
        winner = ?session.winner(),
        "simulation finished"
    );
    Ok(session.into_record())
}

fn play_round(session: &mut MatchSession, bots: &mut [(PlayerId, Box<dyn Guesser>, GameRng)]) {
    let round = session.current_round_number();
    let active = session.registry().active_count();
    let config = session.config().clone();
    let previous = session.last_outcome().cloned();
    let view = RoundView {
        round,
        max_value: config.max_value,
        multiplier: config.rules.target_multiplier(round, active).unwrap_or(1.0),
        active_players: active,
        previous: previous.as_ref(),
    };

    for (id, guesser, rng) in bots.iter_mut() {
        if session.current_round_number() != round || session.phase() != MatchPhase::CollectingSubmissions {
            return;
        }
        if session.registry().state_of(*id) != Some(PlayerState::Active) {
            continue;
        }
        if let Some(value) = guesser.guess(&view, rng) {
            let _ = session.submit(*id, value);
        }
    }

    if session.current_round_number() == round && session.phase() == MatchPhase::CollectingSubmissions {
        session.advance_time(config.submission_window());
    }
}
