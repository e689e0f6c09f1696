//! Match record for persistence and audit.
//!
//! The record is the minimal durable trace of a match: the configuration,
//! the starting roster, every round's submissions and outcome, and the
//! final scores. That is enough to replay the match deterministically and
//! check that nothing was altered.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigResult, RecordResult};
use crate::core::{MatchConfig, Player, PlayerId};
use crate::rules::{RoundOutcome, RuleEngine, StandardRuleEngine, Submissions};

/// One resolved round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number.
    pub round: u32,

    /// Values the rule engine saw, forced ones included.
    pub submissions: Submissions,

    /// Players whose value was filled at timeout.
    pub forced: BTreeSet<PlayerId>,

    /// What the rule engine produced.
    pub outcome: RoundOutcome,
}

/// Where a replay disagreed with the record.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplayMismatch {
    /// Re-resolving this round gave a different outcome.
    Outcome {
        /// Round number.
        round: u32,
    },
    /// Summing the deltas does not give the recorded final score.
    FinalScore {
        /// Player.
        player: PlayerId,
        /// Recorded score.
        recorded: i32,
        /// Score from replay.
        replayed: i32,
    },
}

/// Complete record of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Configuration the match ran with.
    pub config: MatchConfig,

    /// Roster at match start, with starting scores.
    pub players: Vec<Player>,

    /// Resolved rounds in order.
    pub rounds: Vec<RoundRecord>,

    /// Scores when the match ended or was aborted.
    pub final_scores: Vec<(PlayerId, i32)>,

    /// Last player standing, if any.
    pub winner: Option<PlayerId>,

    /// Set once the match has ended or been aborted.
    pub finished: bool,
}

impl MatchRecord {
    /// Start a record for a match about to begin.
    #[must_use]
    pub fn new(config: MatchConfig, players: Vec<Player>) -> Self {
        Self {
            config,
            players,
            rounds: Vec::new(),
            final_scores: Vec::new(),
            winner: None,
            finished: false,
        }
    }

    /// Append a resolved round.
    pub fn push_round(&mut self, round: RoundRecord) {
        self.rounds.push(round);
    }

    /// Close the record.
    pub fn finish(&mut self, winner: Option<PlayerId>, final_scores: Vec<(PlayerId, i32)>) {
        self.winner = winner;
        self.final_scores = final_scores;
        self.finished = true;
    }

    /// Outcomes in round order.
    pub fn outcomes(&self) -> impl Iterator<Item = &RoundOutcome> {
        self.rounds.iter().map(|r| &r.outcome)
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> RecordResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode.
    pub fn from_bytes(bytes: &[u8]) -> RecordResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Scores obtained by applying every recorded delta to the roster.
    #[must_use]
    pub fn replayed_scores(&self) -> Vec<(PlayerId, i32)> {
        let mut scores: FxHashMap<PlayerId, i32> = self.players.iter().map(|p| (p.id, p.score)).collect();
        for outcome in self.outcomes() {
            for (player, delta) in &outcome.point_deltas {
                if let Some(score) = scores.get_mut(player) {
                    *score = score.saturating_add(*delta);
                }
            }
        }
        self.players
            .iter()
            .map(|p| (p.id, scores.get(&p.id).copied().unwrap_or(p.score)))
            .collect()
    }

    /// Re-resolve every round with the standard engine and re-add the deltas.
    ///
    /// Returns the first disagreement, or `None` if the record is consistent.
    /// Fails only if the recorded configuration itself is invalid. Records
    /// from a session with a custom engine go through [`Self::verify_with`].
    pub fn verify(&self) -> ConfigResult<Option<ReplayMismatch>> {
        let engine = StandardRuleEngine::new(self.config.rules.clone(), self.config.max_value)?;
        Ok(self.verify_with(&engine))
    }

    /// Like [`Self::verify`], re-resolving with `engine`.
    #[must_use]
    pub fn verify_with<E: RuleEngine>(&self, engine: &E) -> Option<ReplayMismatch> {
        for round in &self.rounds {
            if engine.resolve_round(round.round, &round.submissions) != round.outcome {
                return Some(ReplayMismatch::Outcome { round: round.round });
            }
        }

        if self.finished {
            let replayed: FxHashMap<_, _> = self.replayed_scores().into_iter().collect();
            for &(player, recorded) in &self.final_scores {
                let replayed = replayed.get(&player).copied().unwrap_or(recorded);
                if replayed != recorded {
                    return Some(ReplayMismatch::FinalScore {
                        player,
                        recorded,
                        replayed,
                    });
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchRecord {
        let config = MatchConfig::default();
        let players = vec![
            Player::new(PlayerId::new(1), "A", 3),
            Player::new(PlayerId::new(2), "B", 3),
        ];
        let engine = StandardRuleEngine::new(config.rules.clone(), config.max_value).unwrap();
        let submissions: Submissions = [(PlayerId::new(1), 10), (PlayerId::new(2), 90)].into_iter().collect();
        let outcome = engine.resolve_round(1, &submissions);

        let mut record = MatchRecord::new(config, players);
        record.push_round(RoundRecord {
            round: 1,
            submissions,
            forced: BTreeSet::new(),
            outcome,
        });
        record.finish(None, vec![(PlayerId::new(1), 3), (PlayerId::new(2), 2)]);
        record
    }

    #[test]
    fn test_bincode_roundtrip() {
        let record = sample();
        let bytes = record.to_bytes().unwrap();
        assert_eq!(MatchRecord::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn test_corrupt_bytes() {
        assert!(MatchRecord::from_bytes(&[0xff, 0x01]).is_err());
    }

    #[test]
    fn test_verify_consistent_record() {
        assert_eq!(sample().verify().unwrap(), None);
    }

    #[test]
    fn test_verify_detects_tampered_outcome() {
        let mut record = sample();
        record.rounds[0].outcome.point_deltas.insert(PlayerId::new(2), 0);
        assert_eq!(
            record.verify().unwrap(),
            Some(ReplayMismatch::Outcome { round: 1 })
        );
    }

    #[test]
    fn test_verify_detects_tampered_score() {
        let mut record = sample();
        record.final_scores[1].1 = 3;
        assert_eq!(
            record.verify().unwrap(),
            Some(ReplayMismatch::FinalScore {
                player: PlayerId::new(2),
                recorded: 3,
                replayed: 2,
            })
        );
    }

    /// Flat loss for everyone, whatever they pick.
    struct FlatLoss;

    impl RuleEngine for FlatLoss {
        fn resolve_round(&self, round: u32, submissions: &Submissions) -> RoundOutcome {
            RoundOutcome {
                point_deltas: submissions.keys().map(|&p| (p, -1)).collect(),
                ..RoundOutcome::empty(round)
            }
        }
    }

    #[test]
    fn test_verify_with_custom_engine() {
        let mut record = sample();
        let outcome = FlatLoss.resolve_round(1, &record.rounds[0].submissions);
        record.rounds[0].outcome = outcome;
        record.final_scores = vec![(PlayerId::new(1), 2), (PlayerId::new(2), 2)];

        assert_eq!(record.verify_with(&FlatLoss), None);
        assert_eq!(record.verify().unwrap(), Some(ReplayMismatch::Outcome { round: 1 }));
    }

    #[test]
    fn test_replay_saturates() {
        let mut record = sample();
        record.players[0].score = i32::MIN + 1;
        record.rounds[0].outcome.point_deltas.insert(PlayerId::new(1), -5);
        assert_eq!(record.replayed_scores()[0], (PlayerId::new(1), i32::MIN));
    }
}
