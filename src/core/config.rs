//! Match configuration.
//!
//! Loaded once at match setup (usually from TOML) and read-only afterwards.
//! Validation happens here so that a config which cannot produce a target
//! fails before the first round, never during resolution.
//!
//! ```
//! use pick_or_perish::core::MatchConfig;
//!
//! let config = MatchConfig::from_toml_str(r#"
//!     starting_score = 5
//!     submission_secs = 10
//!
//!     [[rules]]
//!     name = "Average"
//!     rule_type = "target_modifier"
//!     multiplier = 0.5
//! "#).unwrap();
//!
//! assert_eq!(config.starting_score, 5);
//! assert_eq!(config.max_value, 100);
//! assert_eq!(config.rules.target_multiplier(1, 3), Some(0.5));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::rules::RuleConfig;

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Largest value a player may submit. Submissions are in `0..=max_value`.
    pub max_value: i32,

    /// Score every player starts with unless their profile overrides it.
    pub starting_score: i32,

    /// Players required before the match can start.
    pub min_players: usize,

    /// Countdown before each round's collection phase. 0 starts immediately.
    pub pre_round_countdown_secs: u32,

    /// Time players have to submit.
    pub submission_secs: u32,

    /// Pause after a round resolves before the next one starts.
    pub reveal_secs: u32,

    /// Rule catalog for this match.
    pub rules: RuleConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_value: 100,
            starting_score: 3,
            min_players: 2,
            pre_round_countdown_secs: 0,
            submission_secs: 25,
            reveal_secs: 3,
            rules: RuleConfig::standard(),
        }
    }
}

impl MatchConfig {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum submission value.
    #[must_use]
    pub fn with_max_value(mut self, max_value: i32) -> Self {
        self.max_value = max_value;
        self
    }

    /// Set the starting score.
    #[must_use]
    pub fn with_starting_score(mut self, score: i32) -> Self {
        self.starting_score = score;
        self
    }

    /// Set the minimum player count.
    #[must_use]
    pub fn with_min_players(mut self, count: usize) -> Self {
        self.min_players = count;
        self
    }

    /// Set all three phase durations, in seconds.
    #[must_use]
    pub fn with_timings(mut self, pre_round: u32, submission: u32, reveal: u32) -> Self {
        self.pre_round_countdown_secs = pre_round;
        self.submission_secs = submission;
        self.reveal_secs = reveal;
        self
    }

    /// Replace the rule catalog.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Check every field. Called by the session before a match is created.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_value <= 0 {
            return Err(ConfigError::InvalidMaxValue(self.max_value));
        }
        if self.starting_score <= 0 {
            return Err(ConfigError::InvalidStartingScore(self.starting_score));
        }
        if self.min_players < 2 {
            return Err(ConfigError::InvalidMinPlayers(self.min_players));
        }
        self.rules.validate()
    }

    /// Is `value` a legal submission?
    #[must_use]
    pub fn in_range(&self, value: i32) -> bool {
        (0..=self.max_value).contains(&value)
    }

    /// Pre-round countdown length.
    #[must_use]
    pub fn pre_round_countdown(&self) -> Duration {
        Duration::from_secs(u64::from(self.pre_round_countdown_secs))
    }

    /// Submission window length.
    #[must_use]
    pub fn submission_window(&self) -> Duration {
        Duration::from_secs(u64::from(self.submission_secs))
    }

    /// Reveal pause length.
    #[must_use]
    pub fn reveal_pause(&self) -> Duration {
        Duration::from_secs(u64::from(self.reveal_secs))
    }
}
