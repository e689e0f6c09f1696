//! Player identification and per-player match data.
//!
//! ## PlayerId
//!
//! Stable participant identifier. Ids are assigned by the session layer
//! (typically the transport's client id) and never reused within a match.
//!
//! ## Player
//!
//! Score and active/eliminated state for one participant. Players are owned
//! by the [`PlayerRegistry`](super::PlayerRegistry) and only mutated by the
//! scoring step.

use serde::{Deserialize, Serialize};

/// Stable player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Whether a player still takes part in rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Submits every round.
    #[default]
    Active,
    /// Score reached zero or below. Permanent.
    Eliminated,
}

/// Setup-time profile data supplied by the catalog loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Player identifier.
    pub id: PlayerId,

    /// Name shown by the presentation layer.
    pub display_name: String,

    /// Overrides the match's starting score when set.
    #[serde(default)]
    pub starting_score: Option<i32>,
}

impl PlayerProfile {
    /// Create a profile using the match's default starting score.
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            starting_score: None,
        }
    }

    /// Set a per-player starting score.
    #[must_use]
    pub fn with_starting_score(mut self, score: i32) -> Self {
        self.starting_score = Some(score);
        self
    }
}

/// A participant in the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,

    /// Display name (for logs and views).
    pub name: String,

    /// Current score. Starts at the configured value and only decreases.
    pub score: i32,

    /// Active or eliminated.
    pub state: PlayerState,
}

impl Player {
    /// Create an active player with the given score.
    pub fn new(id: PlayerId, name: impl Into<String>, score: i32) -> Self {
        Self {
            id,
            name: name.into(),
            score,
            state: PlayerState::Active,
        }
    }

    /// Build a player from a profile, falling back to `default_score`.
    #[must_use]
    pub fn from_profile(profile: &PlayerProfile, default_score: i32) -> Self {
        Self::new(
            profile.id,
            profile.display_name.clone(),
            profile.starting_score.unwrap_or(default_score),
        )
    }

    /// Is this player still in the match?
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PlayerState::Active
    }
}
