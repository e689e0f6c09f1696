//! Core types: players, the registry, configuration, errors, RNG.

pub mod config;
pub mod error;
pub mod player;
pub mod registry;
pub mod rng;

pub use config::MatchConfig;
pub use error::{
    ConfigError, ConfigResult, MatchError, MatchResult, RecordError, RecordResult, SubmitError,
    SubmitResult,
};
pub use player::{Player, PlayerId, PlayerProfile, PlayerState};
pub use registry::{PlayerRegistry, RegistryView, ScoreChange};
pub use rng::GameRng;
