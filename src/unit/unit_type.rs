//! Static unit type definitions.

use serde::{Deserialize, Serialize};

use super::player::Player;

fn one() -> i32 {
    1
}

/// Anti-aircraft capability of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaProfile {
    /// Strength when the unit's side is attacking.
    #[serde(default)]
    pub attack: i32,
    /// Strength when the unit's side is defending.
    #[serde(default)]
    pub defense: i32,
    /// Maximum AA rolls per unit. `None` means one roll per valid target.
    #[serde(default)]
    pub max_rolls: Option<i32>,
    /// Dice sides for AA rolls. `None` uses the rule set's dice sides.
    #[serde(default)]
    pub dice_sides: Option<i32>,
    /// Rolls are not reduced by the rolls other AA units already spent.
    #[serde(default)]
    pub may_over_stack: bool,
    /// Unit type names this AA can fire at. Empty means every air unit.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Static combat definition of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default = "one")]
    pub attack_rolls: i32,
    #[serde(default = "one")]
    pub defense_rolls: i32,
    #[serde(default)]
    pub air_attack: i32,
    #[serde(default)]
    pub air_defense: i32,
    /// Added to attack strength during an amphibious assault.
    #[serde(default)]
    pub marine_bonus: i32,
    #[serde(default)]
    pub aa: Option<AaProfile>,
    #[serde(default)]
    pub is_first_strike: bool,
    #[serde(default)]
    pub is_destroyer: bool,
    #[serde(default)]
    pub is_air: bool,
    #[serde(default)]
    pub is_strategic_bomber: bool,
    #[serde(default)]
    pub is_suicide: bool,
    /// Rolls several dice and keeps only the best one.
    #[serde(default)]
    pub choose_best_roll: bool,
}

impl UnitType {
    /// A unit type with the given name, no strength and one roll per side.
    pub fn new(name: impl Into<String>) -> Self {
        UnitType {
            name: name.into(),
            attack: 0,
            defense: 0,
            attack_rolls: 1,
            defense_rolls: 1,
            air_attack: 0,
            air_defense: 0,
            marine_bonus: 0,
            aa: None,
            is_first_strike: false,
            is_destroyer: false,
            is_air: false,
            is_strategic_bomber: false,
            is_suicide: false,
            choose_best_roll: false,
        }
    }

    /// Attack strength including the owner's technology.
    pub fn attack_for(&self, owner: &Player) -> i32 {
        self.attack + owner.tech.attack_bonus.get(&self.name).copied().unwrap_or(0)
    }

    /// Defense strength including the owner's technology.
    pub fn defense_for(&self, owner: &Player) -> i32 {
        self.defense + owner.tech.defense_bonus.get(&self.name).copied().unwrap_or(0)
    }

    /// Attack rolls including the owner's technology.
    pub fn attack_rolls_for(&self, owner: &Player) -> i32 {
        let mut rolls = self.attack_rolls
            + owner
                .tech
                .attack_rolls_bonus
                .get(&self.name)
                .copied()
                .unwrap_or(0);
        if self.is_strategic_bomber && owner.tech.heavy_bombers {
            rolls += 1;
        }
        rolls
    }

    /// Defense rolls including the owner's technology.
    pub fn defense_rolls_for(&self, owner: &Player) -> i32 {
        self.defense_rolls
            + owner
                .tech
                .defense_rolls_bonus
                .get(&self.name)
                .copied()
                .unwrap_or(0)
    }

    pub fn is_aa(&self) -> bool {
        self.aa.is_some()
    }

    /// True if this AA type may fire at units of `target`.
    pub fn aa_can_target(&self, target: &UnitType) -> bool {
        match &self.aa {
            None => false,
            Some(aa) if aa.targets.is_empty() => target.is_air,
            Some(aa) => aa.targets.iter().any(|t| *t == target.name),
        }
    }
}
