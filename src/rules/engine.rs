//! Round resolution.
//!
//! Rules are evaluated in a fixed order, independent of declaration order:
//!
//! 1. Final duel (short-circuits everything else)
//! 2. Target = average of all submissions × multiplier
//! 3. Duplicate detection
//! 4. Winners = closest non-penalized submissions, ties included
//! 5. Precision check
//! 6. Point deltas
//!
//! Penalty and precision losses stack additively. A penalized player can
//! never win, even if their value is closest to the target.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::core::error::ConfigResult;
use crate::core::PlayerId;

use super::descriptor::{RuleConfig, RuleType};
use super::outcome::{RoundOutcome, Submissions};

/// Distance to the target under which a winner counts as an exact hit.
pub const PRECISION_TOLERANCE: f64 = 1e-4;

/// Distances closer than this are treated as a tie.
const TIE_EPSILON: f64 = 1e-9;

/// Only reachable with an unvalidated config.
const DEFAULT_MULTIPLIER: f64 = 0.8;

/// Loss for a non-winner when no precision bonus applies.
const BASE_LOSS: i32 = 1;

/// Rule engine trait.
///
/// Implementations must be pure: same round and submissions, same outcome.
/// The engine never sees the registry; the session applies the deltas.
pub trait RuleEngine {
    /// Resolve a completed round.
    fn resolve_round(&self, round: u32, submissions: &Submissions) -> RoundOutcome;
}

/// The standard rule catalog.
#[derive(Clone, Debug)]
pub struct StandardRuleEngine {
    rules: RuleConfig,
    max_value: i32,
}

impl StandardRuleEngine {
    /// Create an engine. Fails if the rules cannot produce a target.
    pub fn new(rules: RuleConfig, max_value: i32) -> ConfigResult<Self> {
        rules.validate()?;
        Ok(Self { rules, max_value })
    }

    /// The configured rules.
    #[must_use]
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Largest value a player may submit.
    #[must_use]
    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    fn final_duel(&self, round: u32, submissions: &Submissions) -> Option<RoundOutcome> {
        if submissions.len() != 2 {
            return None;
        }
        self.rules.active(RuleType::WinCondition, round, 2)?;

        let mut entries = submissions.iter().map(|(&p, &v)| (p, v));
        let (a, b) = (entries.next()?, entries.next()?);
        let (winner, loser) = match (a.1, b.1) {
            (0, v) if v == self.max_value => (b.0, a.0),
            (v, 0) if v == self.max_value => (a.0, b.0),
            _ => return None,
        };

        debug!(round, %winner, %loser, "final duel triggered");
        Some(RoundOutcome {
            round,
            target: None,
            winner_ids: BTreeSet::from([winner]),
            penalized_player_ids: BTreeSet::new(),
            precision_hit: false,
            final_duel_triggered: true,
            point_deltas: BTreeMap::from([(winner, 0), (loser, -BASE_LOSS)]),
        })
    }
}

impl RuleEngine for StandardRuleEngine {
    fn resolve_round(&self, round: u32, submissions: &Submissions) -> RoundOutcome {
        if submissions.is_empty() {
            return RoundOutcome::empty(round);
        }
        if let Some(outcome) = self.final_duel(round, submissions) {
            return outcome;
        }

        let count = submissions.len();
        let multiplier = self
            .rules
            .target_multiplier(round, count)
            .unwrap_or(DEFAULT_MULTIPLIER);
        let target = compute_target(submissions, multiplier);

        let penalty = self.rules.active(RuleType::ChoicePenalty, round, count);
        let penalized = match penalty {
            Some(_) => duplicate_choosers(submissions),
            None => BTreeSet::new(),
        };

        let winners = closest_to(target, submissions, &penalized);
        let precision_hit = winners
            .iter()
            .filter_map(|p| submissions.get(p))
            .any(|&v| (f64::from(v) - target).abs() < PRECISION_TOLERANCE);

        let base_loss = match self.rules.active(RuleType::SpecialEffect, round, count) {
            Some(rule) if precision_hit => rule.bonus_amount,
            _ => BASE_LOSS,
        };
        let penalty_amount = penalty.map_or(0, |rule| rule.penalty_amount);

        let point_deltas = submissions
            .keys()
            .map(|&player| {
                let mut delta: i32 = 0;
                if !winners.contains(&player) {
                    delta = delta.saturating_sub(base_loss);
                }
                if penalized.contains(&player) {
                    delta = delta.saturating_sub(penalty_amount);
                }
                (player, delta)
            })
            .collect();

        debug!(
            round,
            target,
            winners = winners.len(),
            penalized = penalized.len(),
            precision_hit,
            "round resolved"
        );

        RoundOutcome {
            round,
            target: Some(target),
            winner_ids: winners,
            penalized_player_ids: penalized,
            precision_hit,
            final_duel_triggered: false,
            point_deltas,
        }
    }
}

/// Average of all submitted values times `multiplier`.
#[must_use]
pub fn compute_target(submissions: &Submissions, multiplier: f64) -> f64 {
    if submissions.is_empty() {
        return 0.0;
    }
    let sum: i64 = submissions.values().map(|&v| i64::from(v)).sum();
    // Submission counts and value sums are far below f64's exact integer range.
    (sum as f64 / submissions.len() as f64) * multiplier
}

/// Every player whose value was also chosen by someone else.
#[must_use]
pub fn duplicate_choosers(submissions: &Submissions) -> BTreeSet<PlayerId> {
    let mut groups: FxHashMap<i32, SmallVec<[PlayerId; 4]>> = FxHashMap::default();
    for (&player, &value) in submissions {
        groups.entry(value).or_default().push(player);
    }
    groups
        .into_values()
        .filter(|group| group.len() > 1)
        .flatten()
        .collect()
}

/// Non-excluded players at minimum distance from `target`.
fn closest_to(target: f64, submissions: &Submissions, excluded: &BTreeSet<PlayerId>) -> BTreeSet<PlayerId> {
    let eligible: SmallVec<[(PlayerId, f64); 8]> = submissions
        .iter()
        .filter(|&(p, _)| !excluded.contains(p))
        .map(|(&p, &v)| (p, (f64::from(v) - target).abs()))
        .collect();

    let Some(best) = eligible.iter().map(|&(_, d)| d).reduce(f64::min) else {
        return BTreeSet::new();
    };

    eligible
        .iter()
        .filter(|&&(_, d)| d - best <= TIE_EPSILON)
        .map(|&(p, _)| p)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleDescriptor, MAX_RULE_AMOUNT};

    fn subs(pairs: &[(u32, i32)]) -> Submissions {
        pairs.iter().map(|&(p, v)| (PlayerId::new(p), v)).collect()
    }

    fn ids(raw: &[u32]) -> BTreeSet<PlayerId> {
        raw.iter().copied().map(PlayerId::new).collect()
    }

    fn standard() -> StandardRuleEngine {
        StandardRuleEngine::new(RuleConfig::standard(), 100).unwrap()
    }

    #[test]
    fn test_compute_target() {
        let target = compute_target(&subs(&[(1, 40), (2, 40), (3, 60)]), 0.8);
        assert!((target - 140.0 / 3.0 * 0.8).abs() < 1e-9);
        assert_eq!(compute_target(&Submissions::new(), 0.8), 0.0);
    }

    #[test]
    fn test_largest_amounts_stack() {
        let rules = RuleConfig::new(vec![
            RuleDescriptor::average(1.0),
            RuleDescriptor::duplicate_penalty(MAX_RULE_AMOUNT),
            RuleDescriptor::precision_bonus(MAX_RULE_AMOUNT),
        ])
        .unwrap();
        let engine = StandardRuleEngine::new(rules, 100).unwrap();

        // avg 20 hit exactly by 5; 1-4 are duplicates
        let outcome = engine.resolve_round(1, &subs(&[(1, 10), (2, 10), (3, 30), (4, 30), (5, 20)]));
        assert!(outcome.precision_hit);
        assert_eq!(outcome.winner_ids, ids(&[5]));
        assert_eq!(outcome.delta_of(PlayerId::new(5)), Some(0));
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(-2 * MAX_RULE_AMOUNT));
    }

    #[test]
    fn test_duplicate_choosers() {
        let penalized = duplicate_choosers(&subs(&[(1, 5), (2, 5), (3, 7), (4, 9), (5, 9), (6, 9)]));
        assert_eq!(penalized, ids(&[1, 2, 4, 5, 6]));
        assert!(duplicate_choosers(&subs(&[(1, 1), (2, 2)])).is_empty());
    }

    #[test]
    fn test_empty_round() {
        let outcome = standard().resolve_round(1, &Submissions::new());
        assert_eq!(outcome, RoundOutcome::empty(1));
    }

    #[test]
    fn test_single_winner() {
        // target = 40 * 0.8 = 32; closest is 30
        let outcome = standard().resolve_round(1, &subs(&[(1, 10), (2, 30), (3, 80)]));
        assert_eq!(outcome.winner_ids, ids(&[2]));
        assert_eq!(outcome.delta_of(PlayerId::new(2)), Some(0));
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(-1));
        assert_eq!(outcome.delta_of(PlayerId::new(3)), Some(-1));
        assert!(!outcome.precision_hit);
    }

    #[test]
    fn test_tie_produces_multiple_winners() {
        // sum 100 / 4 = 25 * 0.8 = 20; 18 and 22 tie at distance 2
        let outcome = standard().resolve_round(1, &subs(&[(1, 18), (2, 22), (3, 0), (4, 60)]));
        assert_eq!(outcome.winner_ids, ids(&[1, 2]));
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(0));
        assert_eq!(outcome.delta_of(PlayerId::new(2)), Some(0));
        assert_eq!(outcome.delta_of(PlayerId::new(3)), Some(-1));
    }

    #[test]
    fn test_penalized_player_cannot_win() {
        // target = 37.33; 40s are closest but duplicated
        let outcome = standard().resolve_round(1, &subs(&[(1, 40), (2, 40), (3, 60)]));
        assert_eq!(outcome.penalized_player_ids, ids(&[1, 2]));
        assert_eq!(outcome.winner_ids, ids(&[3]));
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(-2));
        assert_eq!(outcome.delta_of(PlayerId::new(3)), Some(0));
    }

    #[test]
    fn test_everyone_penalized_means_no_winner() {
        let outcome = standard().resolve_round(1, &subs(&[(1, 50), (2, 50), (3, 50)]));
        assert!(!outcome.has_winner());
        for p in 1..=3 {
            assert_eq!(outcome.delta_of(PlayerId::new(p)), Some(-2));
        }
    }

    #[test]
    fn test_precision_and_penalty_stack() {
        let engine = StandardRuleEngine::new(
            RuleConfig::new(vec![
                RuleDescriptor::average(1.0),
                RuleDescriptor::duplicate_penalty(1),
                RuleDescriptor::precision_bonus(2),
            ])
            .unwrap(),
            100,
        )
        .unwrap();
        // avg = (10 + 10 + 30 + 30 + 20) / 5 = 20; 20 hits exactly
        let outcome = engine.resolve_round(1, &subs(&[(1, 10), (2, 10), (3, 30), (4, 30), (5, 20)]));
        assert!(outcome.precision_hit);
        assert_eq!(outcome.winner_ids, ids(&[5]));
        assert_eq!(outcome.delta_of(PlayerId::new(5)), Some(0));
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(-3));
        assert_eq!(outcome.delta_of(PlayerId::new(4)), Some(-3));
    }

    #[test]
    fn test_disabled_penalty_lets_duplicates_win() {
        let engine = StandardRuleEngine::new(RuleConfig::average_only(0.8), 100).unwrap();
        let outcome = engine.resolve_round(1, &subs(&[(1, 40), (2, 40), (3, 60)]));
        assert!(outcome.penalized_player_ids.is_empty());
        assert_eq!(outcome.winner_ids, ids(&[1, 2]));
        assert_eq!(outcome.delta_of(PlayerId::new(3)), Some(-1));
    }

    #[test]
    fn test_precision_without_rule_keeps_base_loss() {
        let engine = StandardRuleEngine::new(RuleConfig::average_only(1.0), 100).unwrap();
        // avg 20, player 2 exact
        let outcome = engine.resolve_round(1, &subs(&[(1, 10), (2, 20), (3, 30)]));
        assert!(outcome.precision_hit);
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(-1));
    }

    #[test]
    fn test_final_duel() {
        let outcome = standard().resolve_round(5, &subs(&[(1, 0), (2, 100)]));
        assert!(outcome.final_duel_triggered);
        assert_eq!(outcome.target, None);
        assert_eq!(outcome.winner_ids, ids(&[2]));
        assert_eq!(outcome.delta_of(PlayerId::new(1)), Some(-1));
        assert_eq!(outcome.delta_of(PlayerId::new(2)), Some(0));

        let flipped = standard().resolve_round(5, &subs(&[(1, 100), (2, 0)]));
        assert_eq!(flipped.winner_ids, ids(&[1]));
    }

    #[test]
    fn test_final_duel_needs_exactly_two() {
        let outcome = standard().resolve_round(1, &subs(&[(1, 0), (2, 100), (3, 50)]));
        assert!(!outcome.final_duel_triggered);
        assert!(outcome.target.is_some());
    }

    #[test]
    fn test_final_duel_disabled() {
        let engine = StandardRuleEngine::new(RuleConfig::average_only(0.8), 100).unwrap();
        // target = 40; 0 is closer
        let outcome = engine.resolve_round(1, &subs(&[(1, 0), (2, 100)]));
        assert!(!outcome.final_duel_triggered);
        assert_eq!(outcome.winner_ids, ids(&[1]));
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let reordered = StandardRuleEngine::new(
            RuleConfig::new(vec![
                RuleDescriptor::final_duel(),
                RuleDescriptor::precision_bonus(2),
                RuleDescriptor::duplicate_penalty(1),
                RuleDescriptor::average(0.8),
            ])
            .unwrap(),
            100,
        )
        .unwrap();
        let submissions = subs(&[(1, 40), (2, 40), (3, 60), (4, 12)]);
        assert_eq!(
            reordered.resolve_round(2, &submissions),
            standard().resolve_round(2, &submissions)
        );
    }
}
