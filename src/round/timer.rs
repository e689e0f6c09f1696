//! Cancellable countdown.
//!
//! The timer is driven by explicit [`RoundTimer::advance`] calls rather than
//! a frame loop or a sleeping task, so the session stays synchronous and
//! tests can move time forward deterministically. The async host feeds it
//! from a `tokio` interval.

use std::time::Duration;

use smallvec::SmallVec;

/// What happened during one [`RoundTimer::advance`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimerUpdate {
    /// Whole seconds remaining after each second boundary crossed, descending.
    /// Never contains 0; reaching zero is reported by `expired`.
    pub ticks: SmallVec<[u32; 4]>,

    /// The countdown reached zero during this call. Reported exactly once.
    pub expired: bool,
}

/// Single-shot countdown with per-second ticks.
#[derive(Clone, Debug, Default)]
pub struct RoundTimer {
    remaining: Option<Duration>,
}

fn whole_seconds_ceil(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

impl RoundTimer {
    /// Create an idle timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `duration`, replacing any running countdown.
    ///
    /// A zero duration expires on the next `advance`, even `advance(ZERO)`.
    pub fn start(&mut self, duration: Duration) {
        self.remaining = Some(duration);
    }

    /// Stop without expiring. Returns whether a countdown was running.
    /// Safe to call when idle or after expiry.
    pub fn cancel(&mut self) -> bool {
        self.remaining.take().is_some()
    }

    /// Is a countdown in progress?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// Time left, if running.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// Whole seconds left, rounded up. 0 when idle.
    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.remaining
            .map_or(0, |d| u32::try_from(whole_seconds_ceil(d)).unwrap_or(u32::MAX))
    }

    /// Move time forward by `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> TimerUpdate {
        let Some(remaining) = self.remaining else {
            return TimerUpdate::default();
        };

        let left = remaining.saturating_sub(elapsed);
        let before = whole_seconds_ceil(remaining);
        let after = whole_seconds_ceil(left);

        let ticks = (after.max(1)..before)
            .rev()
            .map(|s| u32::try_from(s).unwrap_or(u32::MAX))
            .collect();

        let expired = left.is_zero();
        self.remaining = if expired { None } else { Some(left) };

        TimerUpdate { ticks, expired }
    }
}
