//! Combat value calculators.
//!
//! A `CombatValue` answers "how strong is this unit and how many dice does it
//! roll" for one kind of fire: main combat (with support), anti-air fire, or
//! an air battle. The power aggregator only talks to this trait.

use std::collections::BTreeMap;

use super::power::{choose_best_roll_strength, sort_strongest_first};
use super::profile::{aa_strength, combat_flags, read_air_profile, read_profile, BattleContext};
use super::rules::RuleSet;
use super::side::Side;
use crate::support::{
    run_support_passes, StrengthAndRolls, SupportOutcome, SupportRule, UnitRecords,
};
use crate::unit::{Unit, UnitId};

/// Strength and roll lookups for one kind of fire.
pub trait CombatValue {
    fn dice_sides(&self) -> i32;

    /// Strength before support; orders units for support and rolling.
    fn base_strength(&self, unit: &Unit) -> i32;

    /// Strength after support, not yet clamped.
    fn strength(&self, unit: &Unit) -> i32;

    /// Rolls after support, not yet clamped.
    fn rolls(&self, unit: &Unit) -> i32;

    fn choose_best_roll(&self, unit: &Unit) -> bool;
}

/// Per-unit values a calculator has already worked out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Entry {
    base: i32,
    strength: i32,
    rolls: i32,
    choose_best_roll: bool,
}

/// Main combat: base profile plus allied and enemy support.
#[derive(Debug, Clone)]
pub struct MainCombatValue {
    side: Side,
    dice_sides: i32,
    entries: BTreeMap<UnitId, Entry>,
    support: SupportOutcome,
}

impl MainCombatValue {
    /// Computes values for `firing` units on `side`.
    ///
    /// `allies` are every unit on the firing side that may give support (the
    /// firing units included); `enemies` are the opposing units that may
    /// inflict penalties.
    pub fn new(
        firing: &[Unit],
        allies: &[Unit],
        enemies: &[Unit],
        side: Side,
        rules: &RuleSet,
        support_rules: &[SupportRule],
        context: &BattleContext,
    ) -> Self {
        let profiles: BTreeMap<UnitId, _> = firing
            .iter()
            .map(|u| (u.id, read_profile(u, side, rules, context)))
            .collect();
        let ordered =
            sort_strongest_first(firing, |u| profiles.get(&u.id).map_or(0, |p| p.strength));
        let base: UnitRecords = profiles
            .iter()
            .map(|(id, p)| (*id, StrengthAndRolls::new(p.strength, p.rolls)))
            .collect();
        let support = run_support_passes(&ordered, allies, enemies, support_rules, side, base);

        let entries = profiles
            .iter()
            .map(|(id, profile)| {
                let supported = support
                    .records
                    .get(id)
                    .copied()
                    .unwrap_or(StrengthAndRolls::new(profile.strength, profile.rolls));
                let entry = Entry {
                    base: profile.strength,
                    strength: supported.strength,
                    rolls: supported.rolls,
                    choose_best_roll: profile.flags.choose_best_roll,
                };
                (*id, entry)
            })
            .collect();

        MainCombatValue {
            side,
            dice_sides: rules.dice_sides,
            entries,
            support,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Support handed out while computing the values.
    pub fn support(&self) -> &SupportOutcome {
        &self.support
    }

    fn entry(&self, unit: &Unit) -> Entry {
        self.entries.get(&unit.id).copied().unwrap_or_default()
    }
}

impl CombatValue for MainCombatValue {
    fn dice_sides(&self) -> i32 {
        self.dice_sides
    }

    fn base_strength(&self, unit: &Unit) -> i32 {
        self.entry(unit).base
    }

    fn strength(&self, unit: &Unit) -> i32 {
        self.entry(unit).strength
    }

    fn rolls(&self, unit: &Unit) -> i32 {
        self.entry(unit).rolls
    }

    fn choose_best_roll(&self, unit: &Unit) -> bool {
        self.entry(unit).choose_best_roll
    }
}

/// Anti-air fire against a number of valid targets.
///
/// AA rolls are handed out strongest unit first. A unit rolls at most its
/// `max_rolls` (one per target when unlimited); unless it may over-stack, it
/// only rolls for targets no stronger AA unit has covered yet.
#[derive(Debug, Clone)]
pub struct AaCombatValue {
    dice_sides: i32,
    entries: BTreeMap<UnitId, Entry>,
}

impl AaCombatValue {
    pub fn new(aa_units: &[Unit], target_count: usize, side: Side, rules: &RuleSet) -> Self {
        let capable: Vec<Unit> = aa_units
            .iter()
            .filter(|u| aa_strength(u, side).is_some())
            .cloned()
            .collect();
        let ordered = sort_strongest_first(&capable, |u| aa_strength(u, side).unwrap_or(0));

        let dice_sides = aa_dice_sides(&ordered, rules);
        let targets = i32::try_from(target_count).unwrap_or(i32::MAX);
        let mut remaining = targets;
        let mut entries = BTreeMap::new();
        for unit in &ordered {
            let Some(aa) = unit.unit_type.aa.as_ref() else {
                continue;
            };
            let strength = aa_strength(unit, side).unwrap_or(0);
            let limit = aa.max_rolls.map_or(targets, |m| m.max(0));
            let rolls = if aa.may_over_stack {
                limit
            } else {
                let rolls = limit.min(remaining);
                remaining -= rolls;
                rolls
            };
            entries.insert(
                unit.id,
                Entry {
                    base: strength,
                    strength,
                    rolls,
                    choose_best_roll: combat_flags(unit, rules).choose_best_roll,
                },
            );
        }
        AaCombatValue {
            dice_sides,
            entries,
        }
    }

    pub fn total_rolls(&self) -> i32 {
        self.entries.values().map(|e| e.rolls).sum()
    }

    fn entry(&self, unit: &Unit) -> Entry {
        self.entries.get(&unit.id).copied().unwrap_or_default()
    }
}

/// Dice sides for a group of AA units: the strongest unit's sides, or the
/// rule set's. Groups mixing dice sides are rolled with that one value.
fn aa_dice_sides(ordered: &[Unit], rules: &RuleSet) -> i32 {
    let sides_of = |u: &Unit| {
        u.unit_type
            .aa
            .as_ref()
            .and_then(|aa| aa.dice_sides)
            .unwrap_or(rules.dice_sides)
    };
    let Some(first) = ordered.first() else {
        return rules.dice_sides;
    };
    let sides = sides_of(first);
    if ordered.iter().any(|u| sides_of(u) != sides) {
        tracing::warn!(
            dice_sides = sides,
            "AA units with different dice sides rolled together; using the strongest unit's dice"
        );
    }
    sides.max(1)
}

impl CombatValue for AaCombatValue {
    fn dice_sides(&self) -> i32 {
        self.dice_sides
    }

    fn base_strength(&self, unit: &Unit) -> i32 {
        self.entry(unit).base
    }

    fn strength(&self, unit: &Unit) -> i32 {
        self.entry(unit).strength
    }

    fn rolls(&self, unit: &Unit) -> i32 {
        self.entry(unit).rolls
    }

    fn choose_best_roll(&self, unit: &Unit) -> bool {
        self.entry(unit).choose_best_roll
    }
}

/// Air-to-air combat between escorts and interceptors.
///
/// Outside low luck, a choose-best-roll unit with several rolls rolls a single
/// die at `choose_best_roll_strength` instead of rolling and discarding.
#[derive(Debug, Clone)]
pub struct AirBattleCombatValue {
    dice_sides: i32,
    entries: BTreeMap<UnitId, Entry>,
}

impl AirBattleCombatValue {
    pub fn new(units: &[Unit], side: Side, rules: &RuleSet) -> Self {
        let dice_sides = rules.dice_sides;
        let entries = units
            .iter()
            .map(|unit| {
                let profile = read_air_profile(unit, side, rules);
                let mut entry = Entry {
                    base: profile.strength,
                    strength: profile.strength,
                    rolls: profile.rolls,
                    choose_best_roll: profile.flags.choose_best_roll,
                };
                if entry.choose_best_roll && entry.rolls > 1 && !rules.low_luck {
                    entry.strength =
                        choose_best_roll_strength(entry.strength, entry.rolls, dice_sides);
                    entry.rolls = 1;
                    entry.choose_best_roll = false;
                }
                (unit.id, entry)
            })
            .collect();
        AirBattleCombatValue {
            dice_sides,
            entries,
        }
    }

    fn entry(&self, unit: &Unit) -> Entry {
        self.entries.get(&unit.id).copied().unwrap_or_default()
    }
}

impl CombatValue for AirBattleCombatValue {
    fn dice_sides(&self) -> i32 {
        self.dice_sides
    }

    fn base_strength(&self, unit: &Unit) -> i32 {
        self.entry(unit).base
    }

    fn strength(&self, unit: &Unit) -> i32 {
        self.entry(unit).strength
    }

    fn rolls(&self, unit: &Unit) -> i32 {
        self.entry(unit).rolls
    }

    fn choose_best_roll(&self, unit: &Unit) -> bool {
        self.entry(unit).choose_best_roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::power::PowerStrengthAndRolls;
    use crate::unit::{AaProfile, Player, TechAdvances, UnitCatalog, UnitIdGen, UnitType};
    use std::sync::Arc;

    fn spawn(
        catalog: &UnitCatalog,
        ids: &mut UnitIdGen,
        name: &str,
        n: usize,
        owner: &Arc<Player>,
    ) -> Vec<Unit> {
        catalog.spawn(name, n, owner, ids).unwrap()
    }

    #[test]
    fn infantry_and_artillery_example() {
        let catalog = UnitCatalog::from_types(vec![
            UnitType {
                attack: 1,
                ..UnitType::new("infantry")
            },
            UnitType {
                attack: 1,
                ..UnitType::new("artillery")
            },
        ])
        .unwrap();
        let owner = Arc::new(Player::new("Germans"));
        let mut ids = UnitIdGen::new();
        let mut units = spawn(&catalog, &mut ids, "infantry", 1, &owner);
        units.extend(spawn(&catalog, &mut ids, "artillery", 1, &owner));
        let rules = vec![SupportRule::strength("art", "artillery", &["infantry"], 1, 1)];

        let value = MainCombatValue::new(
            &units,
            &units,
            &[],
            Side::Offense,
            &RuleSet::default(),
            &rules,
            &BattleContext::new("Poland"),
        );
        assert_eq!(value.strength(&units[0]), 2);
        assert_eq!(value.base_strength(&units[0]), 1);
        assert_eq!(value.strength(&units[1]), 1);
        let power = PowerStrengthAndRolls::build(&units, &value);
        assert_eq!(power.total_power(), 3);
    }

    #[test]
    fn support_reaches_strongest_recipients_first() {
        let catalog = UnitCatalog::classic();
        let weak = Arc::new(Player::new("Italians"));
        let mut strong_tech = TechAdvances::default();
        strong_tech.attack_bonus.insert("infantry".into(), 1);
        let strong = Arc::new(Player::new("Germans").with_tech(strong_tech));
        let mut ids = UnitIdGen::new();
        let mut units = spawn(&catalog, &mut ids, "infantry", 1, &weak);
        units.extend(spawn(&catalog, &mut ids, "infantry", 1, &strong));
        units.extend(spawn(&catalog, &mut ids, "artillery", 1, &weak));
        let rules = vec![SupportRule::strength("art", "artillery", &["infantry"], 1, 1)];

        let value = MainCombatValue::new(
            &units,
            &units,
            &[],
            Side::Offense,
            &RuleSet::default(),
            &rules,
            &BattleContext::new("Egypt"),
        );
        // The German infantry starts stronger, so it receives the support.
        assert_eq!(value.strength(&units[1]), 3);
        assert_eq!(value.strength(&units[0]), 1);
        assert_eq!(value.support().supported_by(units[2].id), vec![units[1].id]);
    }

    #[test]
    fn enemy_roll_penalty_zeroes_power() {
        let catalog = UnitCatalog::classic();
        let owner = Arc::new(Player::new("Germans"));
        let enemy = Arc::new(Player::new("Russians"));
        let mut ids = UnitIdGen::new();
        let infantry = spawn(&catalog, &mut ids, "infantry", 1, &owner);
        let jammers = spawn(&catalog, &mut ids, "armour", 1, &enemy);
        let jam = SupportRule::rolls("jam", "armour", &["infantry"], -1, 5).against_enemies();
        let rules = vec![jam];

        let value = MainCombatValue::new(
            &infantry,
            &infantry,
            &jammers,
            Side::Defense,
            &RuleSet::default(),
            &rules,
            &BattleContext::new("Ukraine"),
        );
        let power = PowerStrengthAndRolls::build(&infantry, &value);
        assert_eq!(power.units()[0].rolls, 0);
        assert_eq!(power.units()[0].strength, 2);
        assert_eq!(power.total_power(), 0);
    }

    #[test]
    fn aa_rolls_limited_by_targets() {
        let catalog = UnitCatalog::classic();
        let owner = Arc::new(Player::new("Germans"));
        let mut ids = UnitIdGen::new();
        let guns = spawn(&catalog, &mut ids, "aaGun", 2, &owner);
        let value = AaCombatValue::new(&guns, 4, Side::Defense, &RuleSet::default());
        // First gun covers three targets, the second the one left over.
        assert_eq!(value.rolls(&guns[0]), 3);
        assert_eq!(value.rolls(&guns[1]), 1);
        assert_eq!(value.total_rolls(), 4);
        assert_eq!(value.strength(&guns[0]), 1);
    }

    #[test]
    fn over_stacking_aa_ignores_other_guns() {
        let flak = UnitType {
            aa: Some(AaProfile {
                attack: 0,
                defense: 2,
                max_rolls: Some(2),
                dice_sides: None,
                may_over_stack: true,
                targets: Vec::new(),
            }),
            ..UnitType::new("flak")
        };
        let catalog = UnitCatalog::from_types(vec![flak]).unwrap();
        let owner = Arc::new(Player::new("Germans"));
        let mut ids = UnitIdGen::new();
        let guns = spawn(&catalog, &mut ids, "flak", 3, &owner);
        let value = AaCombatValue::new(&guns, 1, Side::Defense, &RuleSet::default());
        assert_eq!(value.total_rolls(), 6);
    }

    #[test]
    fn unlimited_aa_rolls_once_per_target() {
        let radar = UnitType {
            aa: Some(AaProfile {
                attack: 0,
                defense: 1,
                max_rolls: None,
                dice_sides: Some(12),
                may_over_stack: false,
                targets: Vec::new(),
            }),
            ..UnitType::new("radar")
        };
        let catalog = UnitCatalog::from_types(vec![radar]).unwrap();
        let owner = Arc::new(Player::new("British"));
        let mut ids = UnitIdGen::new();
        let guns = spawn(&catalog, &mut ids, "radar", 2, &owner);
        let value = AaCombatValue::new(&guns, 5, Side::Defense, &RuleSet::default());
        assert_eq!(value.rolls(&guns[0]), 5);
        assert_eq!(value.rolls(&guns[1]), 0);
        assert_eq!(value.dice_sides(), 12);
    }

    #[test]
    fn air_battle_choose_best_uses_single_boosted_die() {
        let ace = UnitType {
            air_attack: 2,
            attack_rolls: 3,
            is_air: true,
            choose_best_roll: true,
            ..UnitType::new("ace")
        };
        let catalog = UnitCatalog::from_types(vec![ace]).unwrap();
        let owner = Arc::new(Player::new("Japanese"));
        let units = spawn(&catalog, &mut UnitIdGen::new(), "ace", 1, &owner);

        let standard = AirBattleCombatValue::new(&units, Side::Offense, &RuleSet::default());
        assert_eq!(standard.strength(&units[0]), 4);
        assert_eq!(standard.rolls(&units[0]), 1);
        assert!(!standard.choose_best_roll(&units[0]));

        let low_luck = RuleSet {
            low_luck: true,
            ..RuleSet::default()
        };
        let ll = AirBattleCombatValue::new(&units, Side::Offense, &low_luck);
        assert_eq!(ll.strength(&units[0]), 2);
        assert_eq!(ll.rolls(&units[0]), 3);
        assert!(ll.choose_best_roll(&units[0]));
        // Both paths agree on power.
        let a = PowerStrengthAndRolls::build(&units, &standard).total_power();
        let b = PowerStrengthAndRolls::build(&units, &ll).total_power();
        assert_eq!(a, b);
    }
}
