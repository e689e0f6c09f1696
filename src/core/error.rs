//! Error types.
//!
//! Only configuration errors are fatal, and they surface at match setup.
//! Everything that can go wrong during play is recovered locally and
//! reported to the caller as a rejected command.

use thiserror::Error;

use super::player::PlayerId;

/// Invalid match or rule configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No target modifier rule, so no target can ever be computed.
    #[error("rule config has no target modifier")]
    MissingTargetModifier,

    /// Target multiplier is zero, negative, or not finite.
    #[error("rule '{rule}' has invalid multiplier {multiplier}")]
    InvalidMultiplier {
        /// Offending rule name.
        rule: String,
        /// The multiplier value.
        multiplier: f64,
    },

    /// Player-count bounds are inverted.
    #[error("rule '{rule}' has min_players {min} > max_players {max}")]
    InvalidPlayerBounds {
        /// Offending rule name.
        rule: String,
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },

    /// A rule amount is negative.
    #[error("rule '{rule}' has negative amount {amount}")]
    NegativeAmount {
        /// Offending rule name.
        rule: String,
        /// The amount.
        amount: i32,
    },

    /// A rule amount exceeds the allowed cap.
    #[error("rule '{rule}' amount {amount} exceeds {max}")]
    AmountTooLarge {
        /// Offending rule name.
        rule: String,
        /// The amount.
        amount: i32,
        /// Largest accepted amount.
        max: i32,
    },

    /// `max_value` must be positive.
    #[error("max_value must be positive, got {0}")]
    InvalidMaxValue(i32),

    /// `starting_score` must be positive.
    #[error("starting_score must be positive, got {0}")]
    InvalidStartingScore(i32),

    /// At least two players are needed for an elimination match.
    #[error("min_players must be at least 2, got {0}")]
    InvalidMinPlayers(usize),

    /// TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A submission rejected at the boundary. Round state is untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Value outside `[0, max_value]`.
    #[error("value {value} out of range 0..={max}")]
    OutOfRange {
        /// Submitted value.
        value: i32,
        /// Configured maximum.
        max: i32,
    },

    /// Player id not in the registry.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Player was eliminated and no longer submits.
    #[error("{0} is eliminated")]
    Eliminated(PlayerId),
}

/// Result type for submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// A match command that cannot be applied in the current state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    /// `start_match` called twice.
    #[error("match already started")]
    AlreadyStarted,

    /// Not enough registered players to start.
    #[error("need at least {required} players, have {registered}")]
    NotEnoughPlayers {
        /// Configured minimum.
        required: usize,
        /// Currently registered.
        registered: usize,
    },

    /// Match has ended or was aborted.
    #[error("match is over")]
    MatchOver,

    /// A profile's starting score would register the player already out.
    #[error("{player} has non-positive starting score {score}")]
    InvalidStartingScore {
        /// Offending player.
        player: PlayerId,
        /// The requested score.
        score: i32,
    },
}

/// Result type for match commands.
pub type MatchResult<T> = Result<T, MatchError>;

/// Persisted match record could not be encoded or decoded.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Binary encoding failure.
    #[error("record encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Result type for match records.
pub type RecordResult<T> = Result<T, RecordError>;
