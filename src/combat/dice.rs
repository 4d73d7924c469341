//! Dice and dice-roll results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::PlayerId;

/// How a single die was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieOutcome {
    Hit,
    Miss,
    /// Rolled but discarded, e.g. the worse dice of a choose-best roll.
    Ignored,
}

/// One rolled (or synthetic) die. `value` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Die {
    pub value: i32,
    pub threshold: i32,
    pub outcome: DieOutcome,
}

impl Die {
    /// Scores a die: a hit when the threshold exceeds the zero-based value.
    pub const fn scored(value: i32, threshold: i32) -> Die {
        let outcome = if threshold > value {
            DieOutcome::Hit
        } else {
            DieOutcome::Miss
        };
        Die {
            value,
            threshold,
            outcome,
        }
    }

    pub const fn ignored(value: i32, threshold: i32) -> Die {
        Die {
            value,
            threshold,
            outcome: DieOutcome::Ignored,
        }
    }

    pub const fn is_hit(&self) -> bool {
        matches!(self.outcome, DieOutcome::Hit)
    }
}

/// The dice and hits produced by one resolution call.
///
/// `hits` is authoritative. In low-luck mode it is computed from power and
/// does not equal the number of hit dice. `expected_hits` is statistics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceRoll {
    dice: Vec<Die>,
    hits: i32,
    expected_hits: f64,
    player: PlayerId,
}

impl DiceRoll {
    pub fn new(dice: Vec<Die>, hits: i32, expected_hits: f64, player: PlayerId) -> Self {
        DiceRoll {
            dice,
            hits,
            expected_hits,
            player,
        }
    }

    /// No dice, no hits.
    pub fn empty(player: PlayerId) -> Self {
        DiceRoll::new(Vec::new(), 0, 0.0, player)
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn hits(&self) -> i32 {
        self.hits
    }

    pub fn expected_hits(&self) -> f64 {
        self.expected_hits
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// True when nothing was rolled and nothing hit.
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty() && self.hits == 0
    }

    pub fn count(&self, outcome: DieOutcome) -> usize {
        self.dice.iter().filter(|d| d.outcome == outcome).count()
    }

    /// One-based die faces joined by commas, or `none`.
    pub fn as_dice_text(&self) -> String {
        if self.dice.is_empty() {
            return "none".to_string();
        }
        self.dice
            .iter()
            .map(|d| (d.value + 1).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits [{}] expected {:.2}",
            self.hits,
            self.as_dice_text(),
            self.expected_hits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_compares_against_zero_based_value() {
        assert!(Die::scored(0, 1).is_hit());
        assert!(!Die::scored(1, 1).is_hit());
        assert!(Die::scored(5, 6).is_hit());
        assert!(!Die::scored(0, 0).is_hit());
    }

    #[test]
    fn ignored_die_is_not_a_hit() {
        let die = Die::ignored(0, 6);
        assert!(!die.is_hit());
        assert_eq!(die.outcome, DieOutcome::Ignored);
    }

    #[test]
    fn dice_text_is_one_based() {
        let roll = DiceRoll::new(
            vec![Die::scored(0, 2), Die::scored(5, 2), Die::ignored(3, 2)],
            1,
            0.5,
            PlayerId::new("Italians"),
        );
        assert_eq!(roll.as_dice_text(), "1,6,4");
        assert_eq!(roll.count(DieOutcome::Hit), 1);
        assert_eq!(roll.count(DieOutcome::Ignored), 1);
    }

    #[test]
    fn empty_roll() {
        let roll = DiceRoll::empty(PlayerId::new("Italians"));
        assert!(roll.is_empty());
        assert_eq!(roll.as_dice_text(), "none");
        assert_eq!(roll.expected_hits(), 0.0);
    }

    #[test]
    fn low_luck_roll_with_hits_but_no_dice_is_not_empty() {
        let roll = DiceRoll::new(Vec::new(), 2, 2.0, PlayerId::new("Italians"));
        assert!(!roll.is_empty());
    }
}
