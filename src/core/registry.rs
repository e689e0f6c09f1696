//! Player registry.
//!
//! Tracks every participant's score and state in registration order.
//! Eliminated players stay in the registry for score display; they are
//! only filtered out of [`PlayerRegistry::active_players`].
//!
//! Storage is an `im::Vector` so read-only snapshots handed to the
//! presentation layer are O(1) clones.

use im::Vector;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::player::{Player, PlayerId, PlayerState};

/// Result of applying a score delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreChange {
    /// Score after the delta.
    pub score: i32,

    /// True only on the delta that moved the player from active to eliminated.
    pub eliminated: bool,
}

/// Read-only registry snapshot.
pub type RegistryView = Vector<Player>;

/// Ordered store of match participants.
#[derive(Clone, Debug, Default)]
pub struct PlayerRegistry {
    players: Vector<Player>,
    index: FxHashMap<PlayerId, usize>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player. Returns `false` if the id is already known.
    pub fn register(&mut self, player: Player) -> bool {
        if self.index.contains_key(&player.id) {
            debug!(player = %player.id, "duplicate registration ignored");
            return false;
        }
        self.index.insert(player.id, self.players.len());
        self.players.push_back(player);
        true
    }

    /// Number of registered players (active and eliminated).
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True if nobody has registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Is this id registered?
    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a player.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.index.get(&id).and_then(|&i| self.players.get(i))
    }

    /// Active players in registration order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    /// Ids of active players in registration order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.active_players().map(|p| p.id).collect()
    }

    /// Number of active players.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    /// Add `delta` to a player's score.
    ///
    /// Unknown ids are ignored and return `None`. A player whose score ends
    /// at or below zero is eliminated; `eliminated` is reported only on the
    /// transition.
    pub fn apply_delta(&mut self, id: PlayerId, delta: i32) -> Option<ScoreChange> {
        let Some(&i) = self.index.get(&id) else {
            warn!(player = %id, delta, "delta for unknown player ignored");
            return None;
        };
        let player = self.players.get_mut(i)?;
        player.score = player.score.saturating_add(delta);

        let eliminated = player.is_active() && player.score <= 0;
        if eliminated {
            player.state = PlayerState::Eliminated;
        }

        Some(ScoreChange {
            score: player.score,
            eliminated,
        })
    }

    /// Current score of a player.
    #[must_use]
    pub fn score_of(&self, id: PlayerId) -> Option<i32> {
        self.get(id).map(|p| p.score)
    }

    /// Current state of a player.
    #[must_use]
    pub fn state_of(&self, id: PlayerId) -> Option<PlayerState> {
        self.get(id).map(|p| p.state)
    }

    /// O(1) snapshot of all players.
    #[must_use]
    pub fn view(&self) -> RegistryView {
        self.players.clone()
    }

    /// `(id, score)` for every registered player, in registration order.
    #[must_use]
    pub fn scores(&self) -> Vec<(PlayerId, i32)> {
        self.players.iter().map(|p| (p.id, p.score)).collect()
    }
}
