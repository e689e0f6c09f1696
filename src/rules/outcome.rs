//! Round outcome produced by the rule engine.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// A completed round's submissions, keyed by player.
///
/// Ordered by id so everything derived from it is independent of arrival
/// order.
pub type Submissions = BTreeMap<PlayerId, i32>;

/// Result of resolving one round. Never mutated once scoring is applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Round number (1-based).
    pub round: u32,

    /// Computed target. `None` when no submissions or the duel short-circuited.
    pub target: Option<f64>,

    /// Closest eligible players. Empty if everyone was penalized.
    pub winner_ids: BTreeSet<PlayerId>,

    /// Duplicate choosers.
    pub penalized_player_ids: BTreeSet<PlayerId>,

    /// A winner hit the target exactly (within tolerance).
    pub precision_hit: bool,

    /// The 0 vs max duel decided the round.
    pub final_duel_triggered: bool,

    /// Signed score change for every submitting player, and nobody else.
    pub point_deltas: BTreeMap<PlayerId, i32>,
}

impl RoundOutcome {
    /// Outcome of a round nobody submitted in.
    #[must_use]
    pub fn empty(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }

    /// True if nothing was resolved (no submissions).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.point_deltas.is_empty()
    }

    /// Did the round produce at least one winner?
    #[must_use]
    pub fn has_winner(&self) -> bool {
        !self.winner_ids.is_empty()
    }

    /// Check if a player won the round.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winner_ids.contains(&player)
    }

    /// Score change for a player, if they submitted.
    #[must_use]
    pub fn delta_of(&self, player: PlayerId) -> Option<i32> {
        self.point_deltas.get(&player).copied()
    }

    /// Players who lost points, in id order.
    pub fn losers(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.point_deltas
            .iter()
            .filter(|&(_, &delta)| delta < 0)
            .map(|(&player, _)| player)
    }
}
