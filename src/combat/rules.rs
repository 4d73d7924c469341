//! Game options that change how combat is resolved.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default number of sides on a combat die.
pub const DEFAULT_DICE_SIDES: i32 = 6;

/// Errors that can occur while loading a rule set.
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse rule set JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dice must have at least one side, got {0}")]
    InvalidDiceSides(i32),
}

/// Combat options. Missing JSON fields take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Sides on a combat die.
    pub dice_sides: i32,
    /// Convert power to hits by division instead of rolling every die.
    pub low_luck: bool,
    /// Use low luck for anti-air fire only.
    pub low_luck_aa_only: bool,
    /// Second edition rules: the victims of a sneak attack keep their own
    /// first-strike units in play until those have fired.
    pub ww2_v2: bool,
    /// Defending first-strike units may sneak attack too.
    pub defending_subs_sneak_attack: bool,
    /// First-strike units sneak attack even when facing destroyers.
    pub subs_always_sneak_attack: bool,
    /// Heavy bombers roll all their dice and keep the best one.
    pub lhtr_heavy_bombers: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            dice_sides: DEFAULT_DICE_SIDES,
            low_luck: false,
            low_luck_aa_only: false,
            ww2_v2: false,
            defending_subs_sneak_attack: false,
            subs_always_sneak_attack: false,
            lhtr_heavy_bombers: false,
        }
    }
}

impl RuleSet {
    /// Parses and validates a rule set from a JSON string.
    pub fn from_json_str(json: &str) -> Result<RuleSet, RuleSetError> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Loads a rule set from a JSON file.
    pub fn load(path: &Path) -> Result<RuleSet, RuleSetError> {
        let data = fs::read_to_string(path).map_err(|source| RuleSetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        RuleSet::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<(), RuleSetError> {
        if self.dice_sides < 1 {
            return Err(RuleSetError::InvalidDiceSides(self.dice_sides));
        }
        Ok(())
    }

    /// True if AA fire is resolved with low luck.
    pub fn low_luck_for_aa(&self) -> bool {
        self.low_luck || self.low_luck_aa_only
    }
}
