//! Power aggregation.
//!
//! Folds a `CombatValue` calculator over a group of units into per-unit
//! strength, rolls and power, ordered strongest to weakest, plus totals.

use super::value::CombatValue;
use crate::unit::{Unit, UnitId};

/// Bonus per extra die a choose-best-roll unit gets in place of rolling it.
pub fn extra_roll_bonus(dice_sides: i32) -> i32 {
    (dice_sides / 6).max(1)
}

/// Approximates "roll `rolls` dice and keep the best" as a single die:
/// `strength` plus `extra_roll_bonus` per extra die, capped at the dice sides.
///
/// This stands in for the exact best-of-N probability in low luck, air
/// battles, and expected-hit statistics.
pub fn choose_best_roll_strength(strength: i32, rolls: i32, dice_sides: i32) -> i32 {
    if rolls <= 1 {
        return strength;
    }
    let bonus = extra_roll_bonus(dice_sides).saturating_mul(rolls - 1);
    strength.saturating_add(bonus).min(dice_sides)
}

/// Power of a unit from clamped strength and rolls.
pub fn unit_power(strength: i32, rolls: i32, choose_best_roll: bool, dice_sides: i32) -> i32 {
    if strength <= 0 || rolls <= 0 {
        return 0;
    }
    if choose_best_roll && rolls > 1 {
        return choose_best_roll_strength(strength, rolls, dice_sides);
    }
    strength.saturating_mul(rolls)
}

/// Strength, rolls and power of one unit after support and clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPowerAndRolls {
    pub unit: Unit,
    pub strength: i32,
    pub rolls: i32,
    pub power: i32,
    pub choose_best_roll: bool,
}

/// Returns the units sorted strongest first by `strength`. Equal units keep
/// their roster order.
pub fn sort_strongest_first<F>(units: &[Unit], strength: F) -> Vec<Unit>
where
    F: Fn(&Unit) -> i32,
{
    let mut sorted = units.to_vec();
    sorted.sort_by_key(|u| std::cmp::Reverse(strength(u)));
    sorted
}

/// Per-unit power records of a firing group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerStrengthAndRolls {
    units: Vec<UnitPowerAndRolls>,
    dice_sides: i32,
}

impl PowerStrengthAndRolls {
    /// Builds the records, ordering units by support-free strength.
    ///
    /// Strength is clamped to `[0, dice_sides]` and rolls to `>= 0`.
    pub fn build(units: &[Unit], calculator: &dyn CombatValue) -> Self {
        let dice_sides = calculator.dice_sides();
        let records = sort_strongest_first(units, |u| calculator.base_strength(u))
            .into_iter()
            .map(|unit| {
                let strength = calculator.strength(&unit).clamp(0, dice_sides);
                let rolls = calculator.rolls(&unit).max(0);
                let choose_best_roll = calculator.choose_best_roll(&unit);
                let power = unit_power(strength, rolls, choose_best_roll, dice_sides);
                UnitPowerAndRolls {
                    unit,
                    strength,
                    rolls,
                    power,
                    choose_best_roll,
                }
            })
            .collect();
        PowerStrengthAndRolls {
            units: records,
            dice_sides,
        }
    }

    pub fn empty(dice_sides: i32) -> Self {
        PowerStrengthAndRolls {
            units: Vec::new(),
            dice_sides,
        }
    }

    /// Records in rolling order, strongest first.
    pub fn units(&self) -> &[UnitPowerAndRolls] {
        &self.units
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitPowerAndRolls> {
        self.units.iter().find(|r| r.unit.id == id)
    }

    pub fn dice_sides(&self) -> i32 {
        self.dice_sides
    }

    pub fn total_power(&self) -> i32 {
        self.units
            .iter()
            .fold(0i32, |total, r| total.saturating_add(r.power))
    }

    pub fn total_rolls(&self) -> i32 {
        self.units
            .iter()
            .fold(0i32, |total, r| total.saturating_add(r.rolls))
    }

    /// True when both total power and total rolls are non-zero.
    pub fn has_strength_or_rolls(&self) -> bool {
        self.total_power() > 0 && self.total_rolls() > 0
    }

    /// Average hits the group should score. Statistics only.
    pub fn expected_hits(&self) -> f64 {
        f64::from(self.total_power()) / f64::from(self.dice_sides)
    }
}
