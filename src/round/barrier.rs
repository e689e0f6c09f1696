//! Submission barrier.
//!
//! Collects one value per required player for a single round. The set of
//! required players is snapshotted when the barrier opens; later
//! eliminations do not change it.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::PlayerId;
use crate::rules::Submissions;

/// How the barrier handled a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarrierResponse {
    /// Value recorded.
    Collected,
    /// Player already submitted this round; first value kept.
    AlreadyCollected,
    /// Negative sentinel: nothing recorded.
    Cleared,
    /// Player is not part of this round.
    NotRequired,
}

/// Per-round submission collector.
#[derive(Clone, Debug)]
pub struct SubmissionBarrier {
    round: u32,
    required: Vec<PlayerId>,
    collected: Submissions,
    forced: BTreeSet<PlayerId>,
}

impl SubmissionBarrier {
    /// Open a barrier for `round` expecting one value from each of `required`.
    #[must_use]
    pub fn open(round: u32, required: Vec<PlayerId>) -> Self {
        Self {
            round,
            required,
            collected: Submissions::new(),
            forced: BTreeSet::new(),
        }
    }

    /// Round this barrier belongs to.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Number of submissions needed to complete.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.required.len()
    }

    /// Is `player` expected to submit?
    #[must_use]
    pub fn is_required(&self, player: PlayerId) -> bool {
        self.required.contains(&player)
    }

    /// Has `player` submitted (organically or forced)?
    #[must_use]
    pub fn has_submitted(&self, player: PlayerId) -> bool {
        self.collected.contains_key(&player)
    }

    /// Record a player's value. The first value wins.
    pub fn submit(&mut self, player: PlayerId, value: i32) -> BarrierResponse {
        if value < 0 {
            return BarrierResponse::Cleared;
        }
        if !self.is_required(player) {
            return BarrierResponse::NotRequired;
        }
        if self.has_submitted(player) {
            debug!(round = self.round, %player, "repeat submission ignored");
            return BarrierResponse::AlreadyCollected;
        }
        self.collected.insert(player, value);
        BarrierResponse::Collected
    }

    /// Fill in a value for a player who did not submit before the deadline.
    /// Returns `false` if the player already had a value or is not required.
    pub fn force(&mut self, player: PlayerId, value: i32) -> bool {
        if self.submit(player, value) != BarrierResponse::Collected {
            return false;
        }
        self.forced.insert(player);
        true
    }

    /// Required players with no value yet, in snapshot order.
    #[must_use]
    pub fn missing(&self) -> Vec<PlayerId> {
        self.required
            .iter()
            .copied()
            .filter(|p| !self.collected.contains_key(p))
            .collect()
    }

    /// All required players have a value, and at least one is required.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.required.is_empty() && self.collected.len() == self.required.len()
    }

    /// Values collected so far.
    #[must_use]
    pub fn collected(&self) -> &Submissions {
        &self.collected
    }

    /// Players whose value was filled at timeout.
    #[must_use]
    pub fn forced_players(&self) -> &BTreeSet<PlayerId> {
        &self.forced
    }
}
