//! Notifications emitted by the match session.
//!
//! These are what the presentation and transport layers consume: round
//! starts, countdown ticks, results, eliminations, and the match result.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::rules::RoundOutcome;

/// Which countdown a tick belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountdownPhase {
    /// Before the collection phase opens.
    PreRound,
    /// Time left to submit.
    Submission,
    /// Result display before the next round.
    Reveal,
}

/// Something that happened in the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A round's collection phase opened.
    RoundStarted {
        /// Round number.
        round: u32,
        /// Players expected to submit.
        required: Vec<PlayerId>,
    },

    /// One second passed on a running countdown.
    CountdownTick {
        /// Countdown kind.
        phase: CountdownPhase,
        /// Whole seconds left.
        seconds_remaining: u32,
    },

    /// A player's value was collected. The value itself stays hidden.
    SubmissionAccepted {
        /// Round number.
        round: u32,
        /// Submitting player.
        player: PlayerId,
    },

    /// A round was resolved and scored.
    RoundResolved {
        /// Round number.
        round: u32,
        /// Full outcome.
        outcome: RoundOutcome,
    },

    /// A player's score changed.
    ScoreChanged {
        /// Player.
        player: PlayerId,
        /// New score.
        score: i32,
    },

    /// A player's score reached zero or below.
    PlayerEliminated {
        /// Player.
        player: PlayerId,
        /// Round in which it happened.
        round: u32,
    },

    /// The match is over. `None` if the last players were eliminated together.
    MatchEnded {
        /// Last player standing.
        winner: Option<PlayerId>,
    },

    /// The match was stopped before a winner was found.
    MatchAborted {
        /// Round in progress when aborted.
        round: u32,
    },
}

impl MatchEvent {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MatchEvent::RoundStarted { .. } => "round_started",
            MatchEvent::CountdownTick { .. } => "countdown_tick",
            MatchEvent::SubmissionAccepted { .. } => "submission_accepted",
            MatchEvent::RoundResolved { .. } => "round_resolved",
            MatchEvent::ScoreChanged { .. } => "score_changed",
            MatchEvent::PlayerEliminated { .. } => "player_eliminated",
            MatchEvent::MatchEnded { .. } => "match_ended",
            MatchEvent::MatchAborted { .. } => "match_aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = MatchEvent::PlayerEliminated {
            player: PlayerId::new(2),
            round: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"PlayerEliminated":{"player":2,"round":3}}"#);

        let back: MatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "player_eliminated");
    }
}
