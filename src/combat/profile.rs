//! Reading a unit's combat profile.
//!
//! Base strength and rolls come from the unit type, adjusted by the owner's
//! technology and the battle context (territory effects, amphibious assault).
//! Support bonuses are not part of the profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::RuleSet;
use super::side::Side;
use crate::unit::Unit;

fn first_round() -> u32 {
    1
}

/// A terrain or weather modifier on combat strength, keyed by unit type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryEffect {
    pub name: String,
    #[serde(default)]
    pub offense: BTreeMap<String, i32>,
    #[serde(default)]
    pub defense: BTreeMap<String, i32>,
}

impl TerritoryEffect {
    pub fn modifier(&self, type_name: &str, side: Side) -> i32 {
        let table = match side {
            Side::Offense => &self.offense,
            Side::Defense => &self.defense,
        };
        table.get(type_name).copied().unwrap_or(0)
    }
}

/// Where and when a battle round is fought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleContext {
    pub territory: String,
    #[serde(default = "first_round")]
    pub round: u32,
    /// Attackers are landing from transports.
    #[serde(default)]
    pub amphibious: bool,
    #[serde(default)]
    pub territory_effects: Vec<TerritoryEffect>,
}

impl BattleContext {
    pub fn new(territory: impl Into<String>) -> Self {
        BattleContext {
            territory: territory.into(),
            round: 1,
            amphibious: false,
            territory_effects: Vec::new(),
        }
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    pub fn amphibious(mut self) -> Self {
        self.amphibious = true;
        self
    }

    pub fn with_effect(mut self, effect: TerritoryEffect) -> Self {
        self.territory_effects.push(effect);
        self
    }
}

/// Eligibility flags relevant to combat ordering and dice.
///
/// The orderer, the round runner and the calculators read unit flags through
/// `combat_flags` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatFlags {
    pub first_strike: bool,
    pub destroyer: bool,
    pub air: bool,
    /// Expended after firing; reported to the caller with the roll.
    pub suicide: bool,
    pub choose_best_roll: bool,
    pub aa: bool,
}

/// Base strength, rolls and flags of a unit on one side of a battle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatProfile {
    pub strength: i32,
    pub rolls: i32,
    pub flags: CombatFlags,
}

/// Flags of a unit under the given rules.
pub fn combat_flags(unit: &Unit, rules: &RuleSet) -> CombatFlags {
    let unit_type = &unit.unit_type;
    let heavy_bomber = rules.lhtr_heavy_bombers
        && unit_type.is_strategic_bomber
        && unit.owner.tech.heavy_bombers;
    CombatFlags {
        first_strike: unit_type.is_first_strike,
        destroyer: unit_type.is_destroyer,
        air: unit_type.is_air,
        suicide: unit_type.is_suicide,
        choose_best_roll: unit_type.choose_best_roll || heavy_bomber,
        aa: unit_type.is_aa(),
    }
}

/// Profile for the general and first-strike fire steps.
pub fn read_profile(
    unit: &Unit,
    side: Side,
    rules: &RuleSet,
    context: &BattleContext,
) -> CombatProfile {
    let unit_type = &unit.unit_type;
    let owner = &unit.owner;
    let (mut strength, rolls) = match side {
        Side::Offense => (unit_type.attack_for(owner), unit_type.attack_rolls_for(owner)),
        Side::Defense => (unit_type.defense_for(owner), unit_type.defense_rolls_for(owner)),
    };
    if side == Side::Offense && context.amphibious {
        strength += unit_type.marine_bonus;
    }
    strength += context
        .territory_effects
        .iter()
        .map(|e| e.modifier(&unit_type.name, side))
        .sum::<i32>();
    CombatProfile {
        strength,
        rolls,
        flags: combat_flags(unit, rules),
    }
}

/// Rolls a unit gets in an air battle: its normal rolls for the side, but only
/// for air units with a non-zero air value.
pub fn air_battle_rolls(unit: &Unit, side: Side) -> i32 {
    let unit_type = &unit.unit_type;
    if !unit_type.is_air {
        return 0;
    }
    let (air_strength, rolls) = match side {
        Side::Offense => (unit_type.air_attack, unit_type.attack_rolls_for(&unit.owner)),
        Side::Defense => (unit_type.air_defense, unit_type.defense_rolls_for(&unit.owner)),
    };
    if air_strength <= 0 {
        return 0;
    }
    rolls.max(0)
}

/// Profile for an air battle: air attack/defense with air-battle rolls.
pub fn read_air_profile(unit: &Unit, side: Side, rules: &RuleSet) -> CombatProfile {
    let strength = match side {
        Side::Offense => unit.unit_type.air_attack,
        Side::Defense => unit.unit_type.air_defense,
    };
    CombatProfile {
        strength,
        rolls: air_battle_rolls(unit, side),
        flags: combat_flags(unit, rules),
    }
}

/// AA strength of a unit, or `None` if it has no AA capability.
pub fn aa_strength(unit: &Unit, side: Side) -> Option<i32> {
    unit.unit_type.aa.as_ref().map(|aa| match side {
        Side::Offense => aa.attack,
        Side::Defense => aa.defense,
    })
}
