//! Rule catalog and round resolution.
//!
//! The rule set is a small closed catalog configured per match:
//! - `TargetModifier`: target = average × multiplier
//! - `ChoicePenalty`: duplicate choosers are penalized and cannot win
//! - `SpecialEffect`: an exact hit raises everyone else's loss
//! - `WinCondition`: the two-player 0 vs max duel
//!
//! [`RuleEngine`] turns a completed submission set into a [`RoundOutcome`].
//! It is a pure function of its inputs and never touches the registry.

pub mod descriptor;
pub mod engine;
pub mod outcome;

pub use descriptor::{RuleConfig, RuleDescriptor, RuleType, MAX_RULE_AMOUNT};
pub use engine::{compute_target, duplicate_choosers, RuleEngine, StandardRuleEngine, PRECISION_TOLERANCE};
pub use outcome::{RoundOutcome, Submissions};
