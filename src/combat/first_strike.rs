//! First-strike ordering.
//!
//! Decides, once per round, whether each side's first-strike units (e.g.
//! submarines) sneak attack, and lays the round out as an ordered list of
//! fire steps with the moment their casualties are removed.

use std::fmt;

use serde::Serialize;

use super::profile::combat_flags;
use super::rules::RuleSet;
use super::side::Side;
use crate::unit::Unit;

/// First-strike standing of one side for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstStrikeState {
    /// No first-strike units alive.
    NotApplicable,
    /// Sneak attack: fires before the main exchange.
    FirstStrike,
    /// Has first-strike units, but they fire with everyone else.
    Regular,
}

impl fmt::Display for FirstStrikeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FirstStrikeState::NotApplicable => "not applicable",
            FirstStrikeState::FirstStrike => "first strike",
            FirstStrikeState::Regular => "regular",
        };
        f.write_str(s)
    }
}

/// Who may shoot back at a first-strike step before its casualties go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnFire {
    /// Casualties are removed before anyone answers.
    None,
    /// The victims' own first-strike units still fire.
    FirstStrikeOnly,
    /// Every victim still fires.
    All,
}

/// When the casualties of a fire step leave the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CasualtyTiming {
    Immediate,
    /// After every first-strike step, before general fire.
    AfterFirstStrike,
    EndOfRound,
}

impl CasualtyTiming {
    fn for_return_fire(return_fire: ReturnFire) -> Self {
        match return_fire {
            ReturnFire::None => CasualtyTiming::Immediate,
            ReturnFire::FirstStrikeOnly => CasualtyTiming::AfterFirstStrike,
            ReturnFire::All => CasualtyTiming::EndOfRound,
        }
    }
}

/// Units that fire in a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireGroup {
    FirstStrike,
    /// Main exchange. First-strike units join it only when they did not
    /// fire earlier in the round.
    General { includes_first_strike: bool },
}

/// One side firing once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FireStep {
    pub firing: Side,
    pub group: FireGroup,
    pub return_fire: ReturnFire,
    pub casualties: CasualtyTiming,
}

impl FireStep {
    /// The firing side's units taking part in this step.
    pub fn select(&self, units: &[Unit], rules: &RuleSet) -> Vec<Unit> {
        units
            .iter()
            .filter(|u| {
                let first_strike = combat_flags(u, rules).first_strike;
                match self.group {
                    FireGroup::FirstStrike => first_strike,
                    FireGroup::General {
                        includes_first_strike,
                    } => includes_first_strike || !first_strike,
                }
            })
            .cloned()
            .collect()
    }

    pub fn is_first_strike(&self) -> bool {
        self.group == FireGroup::FirstStrike
    }
}

/// Fire steps of one round in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundPlan {
    pub offense: FirstStrikeState,
    pub defense: FirstStrikeState,
    pub steps: Vec<FireStep>,
}

impl RoundPlan {
    pub fn state(&self, side: Side) -> FirstStrikeState {
        match side {
            Side::Offense => self.offense,
            Side::Defense => self.defense,
        }
    }

    pub fn first_strike_steps(&self) -> impl Iterator<Item = &FireStep> {
        self.steps.iter().filter(|s| s.is_first_strike())
    }

    pub fn general_steps(&self) -> impl Iterator<Item = &FireStep> {
        self.steps.iter().filter(|s| !s.is_first_strike())
    }
}

/// Sneak-attack standing of `side`, given its own and the opposing units.
///
/// Defending first-strike units only sneak attack when the rules allow it
/// (`defending_subs_sneak_attack`, implied by `ww2_v2`). Opposing destroyers
/// cancel the sneak attack unless `subs_always_sneak_attack` is set.
pub fn first_strike_state(
    side: Side,
    own: &[Unit],
    opposing: &[Unit],
    rules: &RuleSet,
) -> FirstStrikeState {
    if !own.iter().any(|u| combat_flags(u, rules).first_strike) {
        return FirstStrikeState::NotApplicable;
    }
    if rules.subs_always_sneak_attack {
        return FirstStrikeState::FirstStrike;
    }
    let destroyer_present = opposing.iter().any(|u| combat_flags(u, rules).destroyer);
    let side_allowed =
        !side.is_defending() || rules.defending_subs_sneak_attack || rules.ww2_v2;
    if !destroyer_present && side_allowed {
        FirstStrikeState::FirstStrike
    } else {
        FirstStrikeState::Regular
    }
}

/// Return fire a sneak attack by the side facing `victim` receives.
fn return_fire_against(victim: FirstStrikeState, rules: &RuleSet) -> ReturnFire {
    match victim {
        FirstStrikeState::FirstStrike => ReturnFire::FirstStrikeOnly,
        FirstStrikeState::Regular if rules.ww2_v2 => ReturnFire::FirstStrikeOnly,
        _ => ReturnFire::None,
    }
}

/// Lays out the fire steps of a round.
///
/// Sneak-attacking sides fire first, offense before defense. When both sides
/// sneak attack they fire blind to each other's casualties, which are cleared
/// together before the main exchange. Under `ww2_v2` a side whose first-strike
/// units were denied the sneak attack still fires them in the first-strike
/// phase when it is the victim of one, with casualties held to the end of the
/// round.
pub fn plan_round(offense: &[Unit], defense: &[Unit], rules: &RuleSet) -> RoundPlan {
    let offense_state = first_strike_state(Side::Offense, offense, defense, rules);
    let defense_state = first_strike_state(Side::Defense, defense, offense, rules);
    let state = |side: Side| match side {
        Side::Offense => offense_state,
        Side::Defense => defense_state,
    };

    let mut steps = Vec::new();
    let mut fired_early = [false; 2];
    for (i, side) in Side::BOTH.into_iter().enumerate() {
        let own = state(side);
        let other = state(side.opposite());
        if own == FirstStrikeState::FirstStrike {
            let return_fire = return_fire_against(other, rules);
            steps.push(FireStep {
                firing: side,
                group: FireGroup::FirstStrike,
                return_fire,
                casualties: CasualtyTiming::for_return_fire(return_fire),
            });
            fired_early[i] = true;
        } else if own == FirstStrikeState::Regular
            && rules.ww2_v2
            && other == FirstStrikeState::FirstStrike
        {
            steps.push(FireStep {
                firing: side,
                group: FireGroup::FirstStrike,
                return_fire: ReturnFire::All,
                casualties: CasualtyTiming::EndOfRound,
            });
            fired_early[i] = true;
        }
    }

    for (i, side) in Side::BOTH.into_iter().enumerate() {
        steps.push(FireStep {
            firing: side,
            group: FireGroup::General {
                includes_first_strike: state(side) == FirstStrikeState::Regular && !fired_early[i],
            },
            return_fire: ReturnFire::All,
            casualties: CasualtyTiming::EndOfRound,
        });
    }

    tracing::debug!(
        offense = %offense_state,
        defense = %defense_state,
        steps = steps.len(),
        "planned round"
    );
    RoundPlan {
        offense: offense_state,
        defense: defense_state,
        steps,
    }
}
