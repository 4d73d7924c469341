//! JSON battle scenarios.
//!
//! A scenario names the rule set, the players, the unit types and support
//! rules (the classic ones when omitted), the territory and both rosters.
//! The binaries read one from a file or stdin.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::combat::{
    resolve_round, Battle, BattleContext, BattleKind, CombatError, HistorySink, RandomSource,
    RoundReport, RuleSet, RuleSetError,
};
use crate::support::{check_rules_against, classic_rules, SupportRule, SupportRuleError};
use crate::unit::{CatalogError, Player, Unit, UnitCatalog, UnitIdGen, UnitType};

/// Errors that can occur while loading or preparing a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Support(#[from] SupportRuleError),

    #[error(transparent)]
    Rules(#[from] RuleSetError),
}

/// A number of units of one type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub unit_type: String,
    pub count: usize,
}

/// A battle as described in JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub rules: RuleSet,
    /// Unit types; the classic catalog when empty.
    #[serde(default)]
    pub unit_types: Vec<UnitType>,
    /// Support rules; the classic artillery rule when absent.
    #[serde(default)]
    pub support_rules: Option<Vec<SupportRule>>,
    #[serde(default)]
    pub kind: BattleKind,
    pub attacker: Player,
    pub defender: Player,
    pub context: BattleContext,
    #[serde(default)]
    pub offense: Vec<RosterEntry>,
    #[serde(default)]
    pub defense: Vec<RosterEntry>,
    /// Dice seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Scenario, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Scenario, ScenarioError> {
        let data = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Scenario::from_json_str(&data)
    }

    pub fn catalog(&self) -> Result<UnitCatalog, ScenarioError> {
        if self.unit_types.is_empty() {
            return Ok(UnitCatalog::classic());
        }
        Ok(UnitCatalog::from_types(self.unit_types.iter().cloned())?)
    }

    /// Validates the scenario and spawns both rosters.
    pub fn prepare(&self) -> Result<BattleSetup, ScenarioError> {
        self.rules.validate()?;
        let catalog = self.catalog()?;
        let support_rules = self.support_rules.clone().unwrap_or_else(classic_rules);
        check_rules_against(&support_rules, &catalog)?;

        let attacker = Arc::new(self.attacker.clone());
        let defender = Arc::new(self.defender.clone());
        let mut ids = UnitIdGen::new();
        let offense = spawn_roster(&catalog, &self.offense, &attacker, &mut ids)?;
        let defense = spawn_roster(&catalog, &self.defense, &defender, &mut ids)?;

        let mut battle = Battle::new(attacker, defender, offense, defense, self.context.clone());
        battle.kind = self.kind;
        tracing::debug!(
            territory = %battle.context.territory,
            offense = battle.offense.len(),
            defense = battle.defense.len(),
            support_rules = support_rules.len(),
            "scenario prepared"
        );
        Ok(BattleSetup {
            battle,
            rules: self.rules.clone(),
            support_rules,
        })
    }
}

fn spawn_roster(
    catalog: &UnitCatalog,
    roster: &[RosterEntry],
    owner: &Arc<Player>,
    ids: &mut UnitIdGen,
) -> Result<Vec<Unit>, CatalogError> {
    let mut units = Vec::new();
    for entry in roster {
        units.extend(catalog.spawn(&entry.unit_type, entry.count, owner, ids)?);
    }
    Ok(units)
}

/// A validated battle ready to be resolved any number of times.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub battle: Battle,
    pub rules: RuleSet,
    pub support_rules: Vec<SupportRule>,
}

impl BattleSetup {
    pub fn resolve(
        &self,
        random: &mut dyn RandomSource,
        history: &mut dyn HistorySink,
    ) -> Result<RoundReport, CombatError> {
        resolve_round(&self.battle, &self.rules, &self.support_rules, random, history)
    }
}
