//! # pick-or-perish
//!
//! Authoritative match engine for a multiplayer elimination number-guessing
//! game. Each round every active player secretly picks an integer in
//! `0..=max_value`; the target is the average pick times a multiplier, the
//! closest player wins the round and everyone else loses a point. Players
//! at zero are out, and the last one standing wins the match.
//!
//! ## Design Principles
//!
//! 1. **One Owner**: [`MatchSession`] owns every piece of match state and
//!    applies commands one at a time. Nothing else mutates scores or phases.
//!
//! 2. **Pure Resolution**: [`RuleEngine::resolve_round`] is a function of the
//!    round number and the submission set. Arrival order never matters.
//!
//! 3. **Explicit Time**: the session never sleeps. Callers advance its clock,
//!    which keeps tests and simulations deterministic.
//!
//! ## Modules
//!
//! - `core`: Player ids and profiles, the registry, configuration, errors, RNG
//! - `rules`: Rule catalog, target computation, round resolution
//! - `round`: Submission barrier and countdown timer
//! - `events`: Match events and subscriber delivery
//! - `session`: The match state machine
//! - `record`: Serializable match history with replay verification
//! - `bots`: Simulated players and whole-match simulation
//! - `host`: Tokio task owning a session behind command channels

pub mod bots;
pub mod core;
pub mod events;
pub mod host;
pub mod record;
pub mod round;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, MatchConfig, MatchError, Player, PlayerId, PlayerProfile, PlayerRegistry, PlayerState,
    RecordError, RegistryView, SubmitError,
};

pub use crate::rules::{RoundOutcome, RuleConfig, RuleDescriptor, RuleEngine, RuleType, StandardRuleEngine, Submissions};

pub use crate::events::{CountdownPhase, EventBus, MatchEvent, SubscriberId};

pub use crate::session::{IgnoreReason, MatchPhase, MatchSession, SubmitResponse};

pub use crate::record::{MatchRecord, RoundRecord};

pub use crate::bots::{simulate, Guesser, LevelKGuesser, RandomGuesser, SimulationConfig};

pub use crate::host::{HostConfig, HostHandle, HostSnapshot, MatchHost};
