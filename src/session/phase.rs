//! Match phases.

use serde::{Deserialize, Serialize};

/// Where the match is in its lifecycle.
///
/// ```text
/// WaitingForStart -> CountingDown -> CollectingSubmissions -> Resolving
///                        ^                                       |
///                        +------------ RoundComplete <-----------+
///                                           |
///                                       MatchEnded
/// ```
///
/// `Aborted` is reachable from every non-terminal phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Players are joining.
    #[default]
    WaitingForStart,
    /// Pre-round countdown running.
    CountingDown,
    /// Barrier open, submission timer running.
    CollectingSubmissions,
    /// Rule engine and scoring in progress.
    Resolving,
    /// Round scored; reveal timer running.
    RoundComplete,
    /// One player (or nobody) left.
    MatchEnded,
    /// Stopped before a winner was found.
    Aborted,
}

impl MatchPhase {
    /// No further transitions possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::MatchEnded | MatchPhase::Aborted)
    }

    /// Between `start_match` and the end of the match.
    #[must_use]
    pub fn is_in_progress(self) -> bool {
        !self.is_terminal() && self != MatchPhase::WaitingForStart
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchPhase::WaitingForStart => "waiting_for_start",
            MatchPhase::CountingDown => "counting_down",
            MatchPhase::CollectingSubmissions => "collecting_submissions",
            MatchPhase::Resolving => "resolving",
            MatchPhase::RoundComplete => "round_complete",
            MatchPhase::MatchEnded => "match_ended",
            MatchPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
