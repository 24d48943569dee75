pub mod simulation;
pub mod statistics;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub use simulation::{hand::HandValue, shoe::Shoe, RoundPhase, Simulator};
pub use statistics::{Simulation, Summary};
pub use strategy::{AlwaysStand, BasicStrategy, DecisionQuery, Strategy};

/// Table rules for a whole session. Read-only during play: the live true count
/// is not part of the rule and travels with every `DecisionQuery` instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    pub dealer_hit_on_soft17: bool,
    /// Maximum number of hands the player can hold by splitting.
    pub max_split_hands: u8,
    pub allow_resplit_aces: bool,
    pub allow_das: bool,
    pub allow_late_surrender: bool,
    pub strategy_complexity: StrategyComplexity,
    pub counting_system: CountingSystem,

    /// A natural wins `bet * (1 + payout_blackjack)`.
    pub payout_blackjack: f64,
}

impl Rule {
    pub fn validate(&self) -> Result<(), Error> {
        if self.number_of_decks == 0 {
            return Err(Error::InvalidRule(String::from(
                "number_of_decks must be positive",
            )));
        }
        if self.max_split_hands == 0 {
            return Err(Error::InvalidRule(String::from(
                "max_split_hands must be at least 1",
            )));
        }
        if !self.payout_blackjack.is_finite() || self.payout_blackjack < 0.0 {
            return Err(Error::InvalidRule(format!(
                "payout_blackjack must be a non-negative number, got {}",
                self.payout_blackjack
            )));
        }
        Ok(())
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 2,
            dealer_hit_on_soft17: false,
            max_split_hands: 4,
            allow_resplit_aces: false,
            allow_das: true,
            allow_late_surrender: true,
            strategy_complexity: StrategyComplexity::Advanced,
            counting_system: CountingSystem::HiLo,
            payout_blackjack: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum CountingSystem {
    NoCount,
    HiLo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum StrategyComplexity {
    Simple,
    Basic,
    Advanced,
}

/// Everything a strategy can ask the table to do with a hand.
///
/// External oracles that speak strings go through `str::parse`, so an unknown
/// action is rejected instead of silently mapped to something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{operation} is only allowed in {expected:?} phase, current phase is {actual:?}")]
    WrongPhase {
        operation: &'static str,
        expected: RoundPhase,
        actual: RoundPhase,
    },
    #[error("strategy chose {decision} which is not allowed here: {reason}")]
    IllegalDecision {
        decision: Decision,
        reason: &'static str,
    },
    #[error("bet must be a positive amount, got {0}")]
    InvalidBet(f64),
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("invalid simulation: {0}")]
    InvalidSimulation(String),
    #[error("cannot start simulation threads: {0}")]
    ThreadPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_parses_from_lowercase_names() {
        assert_eq!("hit".parse::<Decision>(), Ok(Decision::Hit));
        assert_eq!("surrender".parse::<Decision>(), Ok(Decision::Surrender));
        assert_eq!(Decision::Double.to_string(), "double");
        assert!("insurance".parse::<Decision>().is_err());
        assert!("".parse::<Decision>().is_err());
    }

    #[test]
    fn rule_enums_parse_like_config_strings() {
        assert_eq!("HiLo".parse::<CountingSystem>().unwrap(), CountingSystem::HiLo);
        assert_eq!(
            "Advanced".parse::<StrategyComplexity>().unwrap(),
            StrategyComplexity::Advanced
        );
        assert!("KO".parse::<CountingSystem>().is_err());
    }

    #[test]
    fn validate_rejects_broken_rules() {
        assert!(Rule::default().validate().is_ok());

        let mut rule = Rule::default();
        rule.number_of_decks = 0;
        assert!(matches!(rule.validate(), Err(Error::InvalidRule(_))));

        let mut rule = Rule::default();
        rule.max_split_hands = 0;
        assert!(rule.validate().is_err());

        let mut rule = Rule::default();
        rule.payout_blackjack = f64::NAN;
        assert!(rule.validate().is_err());
    }
}
