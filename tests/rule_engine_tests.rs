//! Round resolution tests.
//!
//! These tests drive the standard rule engine directly with hand-built
//! submission sets, checking targets, winners, penalties and deltas.

use std::collections::BTreeSet;

use proptest::prelude::*;

use pick_or_perish::rules::{compute_target, duplicate_choosers, PRECISION_TOLERANCE};
use pick_or_perish::{PlayerId, RoundOutcome, RuleConfig, RuleDescriptor, RuleEngine, StandardRuleEngine, Submissions};

fn p(id: u32) -> PlayerId {
    PlayerId::new(id)
}

fn picks(values: &[(u32, i32)]) -> Submissions {
    values.iter().map(|&(id, v)| (p(id), v)).collect()
}

fn standard() -> StandardRuleEngine {
    StandardRuleEngine::new(RuleConfig::standard(), 100).unwrap()
}

fn ids(players: &[u32]) -> BTreeSet<PlayerId> {
    players.iter().map(|&id| p(id)).collect()
}

/// Test the basic three-player round: closest to 0.8 × average wins.
#[test]
fn test_closest_to_target_wins() {
    let outcome = standard().resolve_round(1, &picks(&[(1, 10), (2, 30), (3, 80)]));

    // avg 40 → target 32
    assert!((outcome.target.unwrap() - 32.0).abs() < 1e-9);
    assert_eq!(outcome.winner_ids, ids(&[2]));
    assert!(outcome.penalized_player_ids.is_empty());
    assert!(!outcome.precision_hit);
    assert_eq!(outcome.delta_of(p(1)), Some(-1));
    assert_eq!(outcome.delta_of(p(2)), Some(0));
    assert_eq!(outcome.delta_of(p(3)), Some(-1));
}

/// Test that duplicate choosers are penalized and cannot win,
/// even when they are closest.
#[test]
fn test_duplicates_penalized_and_excluded() {
    let outcome = standard().resolve_round(1, &picks(&[(1, 40), (2, 40), (3, 60)]));

    // avg 46.67 → target 37.33; 1 and 2 are closer but duplicated
    assert!((outcome.target.unwrap() - 112.0 / 3.0).abs() < 1e-9);
    assert_eq!(outcome.penalized_player_ids, ids(&[1, 2]));
    assert_eq!(outcome.winner_ids, ids(&[3]));
    assert_eq!(outcome.delta_of(p(1)), Some(-2));
    assert_eq!(outcome.delta_of(p(2)), Some(-2));
    assert_eq!(outcome.delta_of(p(3)), Some(0));
}

/// Test that without a penalty rule duplicates tie for the win.
#[test]
fn test_duplicates_without_penalty_rule_tie() {
    let engine = StandardRuleEngine::new(RuleConfig::average_only(0.8), 100).unwrap();
    let outcome = engine.resolve_round(1, &picks(&[(1, 40), (2, 40), (3, 60)]));

    assert!(outcome.penalized_player_ids.is_empty());
    assert_eq!(outcome.winner_ids, ids(&[1, 2]));
    assert_eq!(outcome.delta_of(p(3)), Some(-1));
}

/// Test the exact-hit bonus: everyone else loses two points.
#[test]
fn test_precision_hit_raises_losses() {
    // avg 10 → target 8, player 1 hits it exactly
    let outcome = standard().resolve_round(1, &picks(&[(1, 8), (2, 0), (3, 22)]));

    assert!(outcome.precision_hit);
    assert_eq!(outcome.winner_ids, ids(&[1]));
    assert_eq!(outcome.delta_of(p(1)), Some(0));
    assert_eq!(outcome.delta_of(p(2)), Some(-2));
    assert_eq!(outcome.delta_of(p(3)), Some(-2));
}

/// Test that an exact hit is still reported when the bonus rule is off,
/// but losses stay at one point.
#[test]
fn test_precision_hit_reported_without_bonus_rule() {
    let engine = StandardRuleEngine::new(RuleConfig::average_only(0.8), 100).unwrap();
    let outcome = engine.resolve_round(1, &picks(&[(1, 8), (2, 0), (3, 22)]));

    assert!(outcome.precision_hit);
    assert_eq!(outcome.delta_of(p(2)), Some(-1));
    assert_eq!(outcome.delta_of(p(3)), Some(-1));
}

/// Test the final duel: 0 against max loses to max.
#[test]
fn test_final_duel() {
    let engine = standard();

    let outcome = engine.resolve_round(4, &picks(&[(1, 0), (2, 100)]));
    assert!(outcome.final_duel_triggered);
    assert_eq!(outcome.target, None);
    assert_eq!(outcome.winner_ids, ids(&[2]));
    assert_eq!(outcome.delta_of(p(1)), Some(-1));
    assert_eq!(outcome.delta_of(p(2)), Some(0));

    // Same pair reversed
    let outcome = engine.resolve_round(4, &picks(&[(1, 100), (2, 0)]));
    assert_eq!(outcome.winner_ids, ids(&[1]));
}

/// Test that a two-player round without the 0/max pair resolves normally.
#[test]
fn test_two_players_without_duel_values() {
    let outcome = standard().resolve_round(4, &picks(&[(1, 10), (2, 90)]));

    assert!(!outcome.final_duel_triggered);
    // avg 50 → target 40
    assert_eq!(outcome.winner_ids, ids(&[1]));
    assert_eq!(outcome.delta_of(p(2)), Some(-1));
}

/// Test that the duel needs exactly two submissions.
#[test]
fn test_duel_ignored_with_three_players() {
    let outcome = standard().resolve_round(1, &picks(&[(1, 0), (2, 100), (3, 50)]));
    assert!(!outcome.final_duel_triggered);
    assert!(outcome.target.is_some());
}

/// Test that rules gated by round only apply once unlocked.
#[test]
fn test_progressive_rules_unlock() {
    let engine = StandardRuleEngine::new(RuleConfig::progressive(), 100).unwrap();
    let submissions = picks(&[(1, 40), (2, 40), (3, 60)]);

    let round1 = engine.resolve_round(1, &submissions);
    assert!(round1.penalized_player_ids.is_empty());
    assert_eq!(round1.winner_ids, ids(&[1, 2]));

    let round2 = engine.resolve_round(2, &submissions);
    assert_eq!(round2.penalized_player_ids, ids(&[1, 2]));
    assert_eq!(round2.winner_ids, ids(&[3]));
}

/// Test a player-count gated multiplier.
#[test]
fn test_multiplier_by_player_count() {
    let rules = RuleConfig::new(vec![
        RuleDescriptor::average(0.5).with_player_range(5, 8),
        RuleDescriptor::average(0.8),
    ])
    .unwrap();
    let engine = StandardRuleEngine::new(rules, 100).unwrap();

    let small = engine.resolve_round(1, &picks(&[(1, 10), (2, 20), (3, 30)]));
    assert!((small.target.unwrap() - 16.0).abs() < 1e-9);

    let large = engine.resolve_round(1, &picks(&[(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]));
    assert!((large.target.unwrap() - 15.0).abs() < 1e-9);
}

/// Test that an empty round produces no deltas.
#[test]
fn test_empty_round() {
    let outcome = standard().resolve_round(3, &Submissions::new());
    assert_eq!(outcome, RoundOutcome::empty(3));
    assert!(outcome.point_deltas.is_empty());
    assert!(!outcome.has_winner());
}

/// Test the helpers exposed for clients.
#[test]
fn test_helpers() {
    let submissions = picks(&[(1, 5), (2, 5), (3, 5), (4, 9)]);
    assert_eq!(duplicate_choosers(&submissions), ids(&[1, 2, 3]));
    assert!((compute_target(&submissions, 1.0) - 6.0).abs() < PRECISION_TOLERANCE);
}

fn submissions_strategy() -> impl Strategy<Value = Submissions> {
    prop::collection::btree_map(1u32..40, 0i32..=100, 1..12)
        .prop_map(|m| m.into_iter().map(|(id, v)| (PlayerId::new(id), v)).collect())
}

proptest! {
    /// Every submitter gets a delta, winners lose nothing, and a winner
    /// exists unless every player was penalized.
    #[test]
    fn prop_outcome_shape(submissions in submissions_strategy(), round in 1u32..10) {
        let outcome = standard().resolve_round(round, &submissions);

        prop_assert_eq!(outcome.point_deltas.len(), submissions.len());
        for (player, &delta) in &outcome.point_deltas {
            prop_assert!(submissions.contains_key(player));
            if outcome.is_winner(*player) {
                prop_assert_eq!(delta, 0);
            } else {
                prop_assert!(delta <= -1);
            }
        }
        prop_assert!(outcome.winner_ids.is_disjoint(&outcome.penalized_player_ids));
        if outcome.penalized_player_ids.len() < submissions.len() {
            prop_assert!(outcome.has_winner());
        }
        if let Some(target) = outcome.target {
            prop_assert!((0.0..=80.0 + 1e-9).contains(&target));
        }
    }
}
