//! Support rules: which unit type buffs (or penalizes) which, by how much,
//! and how many times.
//!
//! Rules are validated when they are built or deserialized, so the allocator
//! never has to second-guess a rule's bonus kind.

use serde::Deserialize;

use crate::combat::side::Side;
use crate::unit::{Player, PlayerId};

/// Bonus type shared by rules that do not name one.
pub const DEFAULT_BONUS_TYPE: &str = "default";

/// What a support bonus modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BonusKind {
    Strength,
    Rolls,
}

/// Whose units a support bonus comes from, relative to the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupportSource {
    Allied,
    Enemy,
}

/// Errors raised for a malformed support rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SupportRuleError {
    #[error("support rule '{0}' modifies both strength and rolls")]
    AmbiguousBonusKind(String),

    #[error("support rule '{0}' modifies neither strength nor rolls")]
    MissingBonusKind(String),

    #[error("support rule '{0}' has negative capacity {1}")]
    NegativeCapacity(String, i32),

    #[error("support rule '{0}' supports no unit types")]
    NoSupportedTypes(String),

    #[error("support rule '{0}' is neither allied nor enemy support")]
    NoBeneficiary(String),

    #[error("support rule '{0}' is active on neither offense nor defense")]
    NeverActive(String),

    #[error("support rule '{rule}' names unknown unit type '{unit_type}'")]
    UnknownUnitType { rule: String, unit_type: String },
}

/// Serialized form of a support rule, with separate strength/rolls flags.
#[derive(Debug, Clone, Deserialize)]
struct SupportRuleDef {
    name: String,
    supporting_unit_type: String,
    supported_unit_types: Vec<String>,
    bonus: i32,
    capacity: i32,
    #[serde(default)]
    strength: bool,
    #[serde(default)]
    rolls: bool,
    #[serde(default)]
    allied: bool,
    #[serde(default)]
    enemy: bool,
    #[serde(default)]
    offense: bool,
    #[serde(default)]
    defense: bool,
    #[serde(default)]
    bonus_type: Option<String>,
    #[serde(default)]
    players: Vec<PlayerId>,
    #[serde(default)]
    improved_artillery: bool,
}

impl TryFrom<SupportRuleDef> for SupportRule {
    type Error = SupportRuleError;

    fn try_from(def: SupportRuleDef) -> Result<Self, Self::Error> {
        let kind = match (def.strength, def.rolls) {
            (true, true) => return Err(SupportRuleError::AmbiguousBonusKind(def.name)),
            (false, false) => return Err(SupportRuleError::MissingBonusKind(def.name)),
            (true, false) => BonusKind::Strength,
            (false, true) => BonusKind::Rolls,
        };
        if def.capacity < 0 {
            return Err(SupportRuleError::NegativeCapacity(def.name, def.capacity));
        }
        let rule = SupportRule {
            name: def.name,
            supporting_unit_type: def.supporting_unit_type,
            supported_unit_types: def.supported_unit_types,
            bonus: def.bonus,
            capacity: def.capacity as u32,
            kind,
            allied: def.allied,
            enemy: def.enemy,
            offense: def.offense,
            defense: def.defense,
            bonus_type: def
                .bonus_type
                .unwrap_or_else(|| DEFAULT_BONUS_TYPE.to_string()),
            players: def.players,
            improved_artillery: def.improved_artillery,
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// A validated support rule.
///
/// Each supporting unit contributes `capacity` slots; every slot buffs one
/// recipient once with `bonus`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SupportRuleDef")]
pub struct SupportRule {
    pub name: String,
    pub supporting_unit_type: String,
    /// Recipient types, in the order recipients are searched.
    pub supported_unit_types: Vec<String>,
    pub bonus: i32,
    pub capacity: u32,
    pub kind: BonusKind,
    pub allied: bool,
    pub enemy: bool,
    pub offense: bool,
    pub defense: bool,
    /// Recipients can take one bonus per bonus type and pass.
    pub bonus_type: String,
    /// Owners allowed to give this support. Empty means everyone.
    pub players: Vec<PlayerId>,
    /// Capacity doubles for owners with improved artillery support.
    pub improved_artillery: bool,
}

impl SupportRule {
    fn build(
        name: &str,
        supporter: &str,
        supported: &[&str],
        bonus: i32,
        capacity: u32,
        kind: BonusKind,
    ) -> Self {
        SupportRule {
            name: name.to_string(),
            supporting_unit_type: supporter.to_string(),
            supported_unit_types: supported.iter().map(|s| s.to_string()).collect(),
            bonus,
            capacity,
            kind,
            allied: true,
            enemy: false,
            offense: true,
            defense: true,
            bonus_type: DEFAULT_BONUS_TYPE.to_string(),
            players: Vec::new(),
            improved_artillery: false,
        }
    }

    /// Allied strength support active on offense and defense.
    pub fn strength(
        name: &str,
        supporter: &str,
        supported: &[&str],
        bonus: i32,
        capacity: u32,
    ) -> Self {
        SupportRule::build(name, supporter, supported, bonus, capacity, BonusKind::Strength)
    }

    /// Allied roll support active on offense and defense.
    pub fn rolls(
        name: &str,
        supporter: &str,
        supported: &[&str],
        bonus: i32,
        capacity: u32,
    ) -> Self {
        SupportRule::build(name, supporter, supported, bonus, capacity, BonusKind::Rolls)
    }

    /// Turns the rule into enemy support: it affects the supporter's opponents.
    pub fn against_enemies(mut self) -> Self {
        self.allied = false;
        self.enemy = true;
        self
    }

    pub fn offense_only(mut self) -> Self {
        self.offense = true;
        self.defense = false;
        self
    }

    pub fn defense_only(mut self) -> Self {
        self.offense = false;
        self.defense = true;
        self
    }

    pub fn with_bonus_type(mut self, bonus_type: &str) -> Self {
        self.bonus_type = bonus_type.to_string();
        self
    }

    pub fn for_players(mut self, players: &[&str]) -> Self {
        self.players = players.iter().map(|p| PlayerId::new(*p)).collect();
        self
    }

    pub fn with_improved_artillery(mut self) -> Self {
        self.improved_artillery = true;
        self
    }

    /// Checks the invariants that do not depend on a unit catalog.
    pub fn validate(&self) -> Result<(), SupportRuleError> {
        if self.supported_unit_types.is_empty() {
            return Err(SupportRuleError::NoSupportedTypes(self.name.clone()));
        }
        if !self.allied && !self.enemy {
            return Err(SupportRuleError::NoBeneficiary(self.name.clone()));
        }
        if !self.offense && !self.defense {
            return Err(SupportRuleError::NeverActive(self.name.clone()));
        }
        Ok(())
    }

    /// True if the rule takes part in a pass of the given kind and source for
    /// recipients fighting on `side`.
    pub fn applies_to(&self, kind: BonusKind, source: SupportSource, side: Side) -> bool {
        let source_matches = match source {
            SupportSource::Allied => self.allied,
            SupportSource::Enemy => self.enemy,
        };
        // Enemy support is active on the supporter's side of the battle.
        let supporter_defending = match source {
            SupportSource::Allied => side.is_defending(),
            SupportSource::Enemy => !side.is_defending(),
        };
        let side_matches = if supporter_defending {
            self.defense
        } else {
            self.offense
        };
        self.kind == kind && source_matches && side_matches
    }

    pub fn supports_type(&self, type_name: &str) -> bool {
        self.supported_unit_types.iter().any(|t| t == type_name)
    }

    /// True if a unit owned by `owner` may give this support.
    pub fn can_be_given_by(&self, owner: &Player) -> bool {
        self.players.is_empty() || self.players.contains(&owner.id)
    }

    /// Support slots one supporting unit owned by `owner` provides.
    pub fn capacity_for(&self, owner: &Player) -> u32 {
        if self.improved_artillery && owner.tech.improved_artillery_support {
            self.capacity * 2
        } else {
            self.capacity
        }
    }
}

/// Parses a JSON array of support rules, validating each one.
pub fn rules_from_json_str(json: &str) -> Result<Vec<SupportRule>, serde_json::Error> {
    serde_json::from_str(json)
}
