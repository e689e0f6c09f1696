//! Rule descriptors and the per-match rule configuration.
//!
//! The catalog is closed: four rule types, evaluated by the engine in a
//! fixed order regardless of declaration order. Descriptors only carry
//! parameters and applicability bounds.

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};

/// Rule catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Target = average × multiplier.
    TargetModifier,
    /// Players sharing a value are penalized and cannot win.
    ChoicePenalty,
    /// Two-player 0 vs max duel override.
    WinCondition,
    /// Exact target hit raises the loss for everyone else.
    SpecialEffect,
}

/// Largest accepted penalty or bonus amount.
pub const MAX_RULE_AMOUNT: i32 = 1_000;

fn default_min_players() -> u32 {
    2
}

fn default_max_players() -> u32 {
    u32::MAX
}

fn default_from_round() -> u32 {
    1
}

fn default_multiplier() -> f64 {
    0.8
}

fn default_penalty_amount() -> i32 {
    1
}

fn default_bonus_amount() -> i32 {
    2
}

/// One configured rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// Human-readable name (for logs and display).
    pub name: String,

    /// Which catalog entry this is.
    pub rule_type: RuleType,

    /// Smallest submission count the rule applies to.
    #[serde(default = "default_min_players")]
    pub min_players: u32,

    /// Largest submission count the rule applies to.
    #[serde(default = "default_max_players")]
    pub max_players: u32,

    /// First round (1-based) the rule applies in.
    #[serde(default = "default_from_round")]
    pub from_round: u32,

    /// Target multiplier (`TargetModifier`).
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Extra loss for duplicate choosers (`ChoicePenalty`).
    #[serde(default = "default_penalty_amount")]
    pub penalty_amount: i32,

    /// Loss per non-winner on an exact hit (`SpecialEffect`).
    #[serde(default = "default_bonus_amount")]
    pub bonus_amount: i32,
}

impl RuleDescriptor {
    /// Create a descriptor with default parameters and unbounded applicability.
    pub fn new(name: impl Into<String>, rule_type: RuleType) -> Self {
        Self {
            name: name.into(),
            rule_type,
            min_players: default_min_players(),
            max_players: default_max_players(),
            from_round: default_from_round(),
            multiplier: default_multiplier(),
            penalty_amount: default_penalty_amount(),
            bonus_amount: default_bonus_amount(),
        }
    }

    /// Average × `multiplier` target rule.
    pub fn average(multiplier: f64) -> Self {
        Self::new("Average", RuleType::TargetModifier).with_multiplier(multiplier)
    }

    /// Duplicate-choice penalty.
    pub fn duplicate_penalty(amount: i32) -> Self {
        Self::new("Duplicate Penalty", RuleType::ChoicePenalty).with_penalty(amount)
    }

    /// Precision bonus.
    pub fn precision_bonus(amount: i32) -> Self {
        Self::new("Precision Bonus", RuleType::SpecialEffect).with_bonus(amount)
    }

    /// Final duel, two players only.
    pub fn final_duel() -> Self {
        Self::new("Final Duel", RuleType::WinCondition).with_player_range(2, 2)
    }

    /// Set the target multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the duplicate penalty amount.
    #[must_use]
    pub fn with_penalty(mut self, amount: i32) -> Self {
        self.penalty_amount = amount;
        self
    }

    /// Set the precision bonus amount.
    #[must_use]
    pub fn with_bonus(mut self, amount: i32) -> Self {
        self.bonus_amount = amount;
        self
    }

    /// Restrict to a submission-count range.
    #[must_use]
    pub fn with_player_range(mut self, min: u32, max: u32) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    /// Activate from round `round` onward.
    #[must_use]
    pub fn from_round(mut self, round: u32) -> Self {
        self.from_round = round;
        self
    }

    /// Does this rule apply for a round with `player_count` submissions?
    #[must_use]
    pub fn applies(&self, round: u32, player_count: usize) -> bool {
        let count = u32::try_from(player_count).unwrap_or(u32::MAX);
        round >= self.from_round && (self.min_players..=self.max_players).contains(&count)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.min_players > self.max_players {
            return Err(ConfigError::InvalidPlayerBounds {
                rule: self.name.clone(),
                min: self.min_players,
                max: self.max_players,
            });
        }
        match self.rule_type {
            RuleType::TargetModifier => {
                if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
                    return Err(ConfigError::InvalidMultiplier {
                        rule: self.name.clone(),
                        multiplier: self.multiplier,
                    });
                }
            }
            RuleType::ChoicePenalty => self.check_amount(self.penalty_amount)?,
            RuleType::SpecialEffect => self.check_amount(self.bonus_amount)?,
            RuleType::WinCondition => {}
        }
        Ok(())
    }

    fn check_amount(&self, amount: i32) -> ConfigResult<()> {
        if amount < 0 {
            return Err(ConfigError::NegativeAmount {
                rule: self.name.clone(),
                amount,
            });
        }
        if amount > MAX_RULE_AMOUNT {
            return Err(ConfigError::AmountTooLarge {
                rule: self.name.clone(),
                amount,
                max: MAX_RULE_AMOUNT,
            });
        }
        Ok(())
    }
}

/// Ordered rule list for one match. Immutable once the match starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConfig {
    rules: Vec<RuleDescriptor>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleConfig {
    /// Build from descriptors, validating them.
    pub fn new(rules: Vec<RuleDescriptor>) -> ConfigResult<Self> {
        let config = Self { rules };
        config.validate()?;
        Ok(config)
    }

    /// Every rule active from round 1; the duel only with two players.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: vec![
                RuleDescriptor::average(0.8),
                RuleDescriptor::duplicate_penalty(1),
                RuleDescriptor::precision_bonus(2),
                RuleDescriptor::final_duel(),
            ],
        }
    }

    /// Rules unlock as the match goes on: duplicates from round 2,
    /// precision from round 3.
    #[must_use]
    pub fn progressive() -> Self {
        Self {
            rules: vec![
                RuleDescriptor::average(0.8),
                RuleDescriptor::duplicate_penalty(1).from_round(2),
                RuleDescriptor::precision_bonus(2).from_round(3),
                RuleDescriptor::final_duel(),
            ],
        }
    }

    /// Only the target rule.
    #[must_use]
    pub fn average_only(multiplier: f64) -> Self {
        Self {
            rules: vec![RuleDescriptor::average(multiplier)],
        }
    }

    /// Check that a target can always be produced and parameters are sane.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.rules.iter().any(|r| r.rule_type == RuleType::TargetModifier) {
            return Err(ConfigError::MissingTargetModifier);
        }
        self.rules.iter().try_for_each(RuleDescriptor::validate)
    }

    /// All descriptors in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// First applicable rule of a type.
    #[must_use]
    pub fn active(&self, rule_type: RuleType, round: u32, player_count: usize) -> Option<&RuleDescriptor> {
        self.rules
            .iter()
            .find(|r| r.rule_type == rule_type && r.applies(round, player_count))
    }

    /// Target multiplier for a round.
    ///
    /// Uses the first applicable target modifier, falling back to the first
    /// declared one. `None` only for an unvalidated config.
    #[must_use]
    pub fn target_multiplier(&self, round: u32, player_count: usize) -> Option<f64> {
        self.active(RuleType::TargetModifier, round, player_count)
            .or_else(|| self.rules.iter().find(|r| r.rule_type == RuleType::TargetModifier))
            .map(|r| r.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_valid() {
        assert!(RuleConfig::standard().validate().is_ok());
        assert!(RuleConfig::progressive().validate().is_ok());
    }

    #[test]
    fn test_missing_target_modifier() {
        let result = RuleConfig::new(vec![RuleDescriptor::duplicate_penalty(1)]);
        assert_eq!(result.unwrap_err(), ConfigError::MissingTargetModifier);
    }

    #[test]
    fn test_invalid_multiplier() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = RuleConfig::new(vec![RuleDescriptor::average(bad)]);
            assert!(matches!(result, Err(ConfigError::InvalidMultiplier { .. })));
        }
    }

    #[test]
    fn test_inverted_bounds() {
        let result = RuleConfig::new(vec![
            RuleDescriptor::average(0.8),
            RuleDescriptor::final_duel().with_player_range(3, 2),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidPlayerBounds { .. })));
    }

    #[test]
    fn test_amount_bounds() {
        let rules = |bonus: i32| {
            RuleConfig::new(vec![
                RuleDescriptor::average(1.0),
                RuleDescriptor::duplicate_penalty(2),
                RuleDescriptor::precision_bonus(bonus),
            ])
        };
        assert!(rules(MAX_RULE_AMOUNT).is_ok());
        assert!(rules(0).is_ok());
        assert_eq!(
            rules(i32::MAX),
            Err(ConfigError::AmountTooLarge {
                rule: "Precision Bonus".into(),
                amount: i32::MAX,
                max: MAX_RULE_AMOUNT,
            })
        );
        assert!(matches!(rules(-1), Err(ConfigError::NegativeAmount { amount: -1, .. })));

        let penalty = RuleConfig::new(vec![
            RuleDescriptor::average(0.8),
            RuleDescriptor::duplicate_penalty(MAX_RULE_AMOUNT + 1),
        ]);
        assert!(matches!(penalty, Err(ConfigError::AmountTooLarge { .. })));
    }

    #[test]
    fn test_applicability() {
        let duel = RuleDescriptor::final_duel();
        assert!(duel.applies(1, 2));
        assert!(!duel.applies(1, 3));

        let dup = RuleDescriptor::duplicate_penalty(1).from_round(2);
        assert!(!dup.applies(1, 4));
        assert!(dup.applies(2, 4));
        assert!(dup.applies(9, 4));
    }

    #[test]
    fn test_target_multiplier_fallback() {
        let config = RuleConfig::new(vec![
            RuleDescriptor::average(0.9).from_round(5),
            RuleDescriptor::average(0.5).from_round(3),
        ])
        .unwrap();

        // Nothing applies yet: first declared.
        assert_eq!(config.target_multiplier(1, 3), Some(0.9));
        assert_eq!(config.target_multiplier(4, 3), Some(0.5));
        assert_eq!(config.target_multiplier(6, 3), Some(0.9));
    }

    #[test]
    fn test_progressive_unlocks() {
        let config = RuleConfig::progressive();
        assert!(config.active(RuleType::ChoicePenalty, 1, 4).is_none());
        assert!(config.active(RuleType::ChoicePenalty, 2, 4).is_some());
        assert!(config.active(RuleType::SpecialEffect, 2, 4).is_none());
        assert!(config.active(RuleType::SpecialEffect, 3, 4).is_some());
    }
}
