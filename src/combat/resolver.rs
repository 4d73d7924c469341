//! Dice resolution.
//!
//! Turns a `PowerStrengthAndRolls` into a `DiceRoll`, either by rolling every
//! die (standard) or by dividing total power by the dice sides (low luck).
//! AA fire and air battles build their own power records first.

use super::dice::{DiceRoll, Die};
use super::power::PowerStrengthAndRolls;
use super::random::{DiceType, RandomError, RandomSource};
use super::rules::RuleSet;
use super::side::Side;
use super::value::{AaCombatValue, AirBattleCombatValue};
use crate::unit::{PlayerId, Unit};

/// Errors that abort a dice resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("random source failed: {0}")]
    Random(#[from] RandomError),

    #[error("dice must have at least one side, got {0}")]
    InvalidDiceSides(i32),

    #[error("random source returned {got} values, wanted {wanted}")]
    ShortRoll { wanted: usize, got: usize },
}

fn checked_sides(power: &PowerStrengthAndRolls) -> Result<i32, CombatError> {
    let sides = power.dice_sides();
    if sides < 1 {
        return Err(CombatError::InvalidDiceSides(sides));
    }
    Ok(sides)
}

fn request(
    random: &mut dyn RandomSource,
    sides: i32,
    count: usize,
    player: &PlayerId,
    dice_type: DiceType,
    annotation: &str,
) -> Result<Vec<i32>, CombatError> {
    let values = random.get_random(sides, count, player, dice_type, annotation)?;
    if values.len() < count {
        return Err(CombatError::ShortRoll {
            wanted: count,
            got: values.len(),
        });
    }
    Ok(values)
}

/// Rolls one die per roll and scores each against its unit's strength.
///
/// Units are walked in the aggregate's strongest-first order, each consuming
/// its rolls from the shared sequence. A choose-best-roll unit with several
/// rolls only scores its lowest value; its other dice are ignored.
pub fn roll_dice_normal(
    power: &PowerStrengthAndRolls,
    player: &PlayerId,
    dice_type: DiceType,
    annotation: &str,
    random: &mut dyn RandomSource,
) -> Result<DiceRoll, CombatError> {
    let sides = checked_sides(power)?;
    let total = usize::try_from(power.total_rolls()).unwrap_or(0);
    if total == 0 {
        return Ok(DiceRoll::empty(player.clone()));
    }
    let values = request(random, sides, total, player, dice_type, annotation)?;

    let mut dice = Vec::with_capacity(total);
    let mut hits = 0;
    let mut next = values.into_iter();
    for record in power.units() {
        let rolled: Vec<i32> = next
            .by_ref()
            .take(usize::try_from(record.rolls).unwrap_or(0))
            .collect();
        if record.choose_best_roll && rolled.len() > 1 {
            let best = rolled
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| **v)
                .map(|(i, _)| i);
            for (i, value) in rolled.into_iter().enumerate() {
                if Some(i) == best {
                    let die = Die::scored(value, record.strength);
                    hits += i32::from(die.is_hit());
                    dice.push(die);
                } else {
                    dice.push(Die::ignored(value, record.strength));
                }
            }
        } else {
            for value in rolled {
                let die = Die::scored(value, record.strength);
                hits += i32::from(die.is_hit());
                dice.push(die);
            }
        }
    }

    let roll = DiceRoll::new(dice, hits, power.expected_hits(), player.clone());
    tracing::debug!(
        player = %player,
        ?dice_type,
        annotation,
        hits,
        dice = %roll.as_dice_text(),
        "rolled dice"
    );
    Ok(roll)
}

/// Converts total power to hits by division, rolling at most one die for the
/// remainder.
pub fn roll_dice_low_luck(
    power: &PowerStrengthAndRolls,
    player: &PlayerId,
    dice_type: DiceType,
    annotation: &str,
    random: &mut dyn RandomSource,
) -> Result<DiceRoll, CombatError> {
    let sides = checked_sides(power)?;
    let total_power = power.total_power();
    let mut hits = total_power / sides;
    let remainder = total_power % sides;
    let mut dice = Vec::new();
    if remainder > 0 {
        let values = request(random, sides, 1, player, dice_type, annotation)?;
        let die = Die::scored(values[0], remainder);
        hits += i32::from(die.is_hit());
        dice.push(die);
    }

    let roll = DiceRoll::new(dice, hits, power.expected_hits(), player.clone());
    tracing::debug!(player = %player, ?dice_type, annotation, hits, total_power, "low luck dice");
    Ok(roll)
}

/// Resolves `power` in the mode `low_luck` selects. A group without power or
/// rolls gives an empty roll without touching the random source.
pub fn roll_dice(
    power: &PowerStrengthAndRolls,
    low_luck: bool,
    player: &PlayerId,
    dice_type: DiceType,
    annotation: &str,
    random: &mut dyn RandomSource,
) -> Result<DiceRoll, CombatError> {
    if !power.has_strength_or_rolls() {
        return Ok(DiceRoll::empty(player.clone()));
    }
    if low_luck {
        roll_dice_low_luck(power, player, dice_type, annotation, random)
    } else {
        roll_dice_normal(power, player, dice_type, annotation, random)
    }
}

/// General or first-strike fire of an already aggregated group.
pub fn roll_combat(
    power: &PowerStrengthAndRolls,
    rules: &RuleSet,
    player: &PlayerId,
    annotation: &str,
    random: &mut dyn RandomSource,
) -> Result<DiceRoll, CombatError> {
    roll_dice(power, rules.low_luck, player, DiceType::Combat, annotation, random)
}

/// Units of `targets` that at least one of `aa_units` may fire at.
pub fn valid_aa_targets<'a>(aa_units: &[Unit], targets: &'a [Unit]) -> Vec<&'a Unit> {
    targets
        .iter()
        .filter(|t| aa_units.iter().any(|aa| aa.unit_type.aa_can_target(&t.unit_type)))
        .collect()
}

/// Splits AA units into one group per unit type, in roster order.
///
/// Types may differ in what they can fire at, so each group is rolled on its
/// own against the targets its type may hit.
pub fn aa_groups(aa_units: &[Unit]) -> Vec<Vec<Unit>> {
    let mut groups: Vec<Vec<Unit>> = Vec::new();
    for unit in aa_units {
        let same_type = groups
            .iter_mut()
            .find(|g| g.first().is_some_and(|u| u.type_name() == unit.type_name()));
        match same_type {
            Some(group) => group.push(unit.clone()),
            None => groups.push(vec![unit.clone()]),
        }
    }
    groups
}

/// Anti-air fire of `aa_units` (fighting on `side`) against `targets`.
///
/// All of `aa_units` share one target count; callers with AA types that hit
/// different targets roll each of `aa_groups` separately.
///
/// Returns an empty roll, without randomness, when no AA roll is available.
pub fn roll_aa(
    aa_units: &[Unit],
    targets: &[Unit],
    side: Side,
    rules: &RuleSet,
    player: &PlayerId,
    annotation: &str,
    random: &mut dyn RandomSource,
) -> Result<DiceRoll, CombatError> {
    let firing: Vec<Unit> = aa_units
        .iter()
        .filter(|aa| targets.iter().any(|t| aa.unit_type.aa_can_target(&t.unit_type)))
        .cloned()
        .collect();
    let target_count = valid_aa_targets(&firing, targets).len();
    let value = AaCombatValue::new(&firing, target_count, side, rules);
    if value.total_rolls() <= 0 {
        return Ok(DiceRoll::empty(player.clone()));
    }
    let power = PowerStrengthAndRolls::build(&firing, &value);
    roll_dice(
        &power,
        rules.low_luck_for_aa(),
        player,
        DiceType::AntiAircraft,
        annotation,
        random,
    )
}

/// One side's fire in an air battle.
pub fn air_battle(
    units: &[Unit],
    side: Side,
    rules: &RuleSet,
    player: &PlayerId,
    annotation: &str,
    random: &mut dyn RandomSource,
) -> Result<DiceRoll, CombatError> {
    let value = AirBattleCombatValue::new(units, side, rules);
    let power = PowerStrengthAndRolls::build(units, &value);
    roll_dice(&power, rules.low_luck, player, DiceType::AirBattle, annotation, random)
}
