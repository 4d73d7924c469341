//! One round of a battle.
//!
//! Runs AA fire (first round only), the first-strike steps of the round plan
//! and general fire, writing each roll to the history. Hits are reported but
//! casualties are left to the caller.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::dice::DiceRoll;
use super::first_strike::{plan_round, CasualtyTiming, FireStep, RoundPlan};
use super::history::{dice_text, roll_event_text, units_text, HistorySink};
use super::power::PowerStrengthAndRolls;
use super::profile::{combat_flags, BattleContext};
use super::random::RandomSource;
use super::resolver::{aa_groups, air_battle, roll_aa, roll_combat, valid_aa_targets, CombatError};
use super::rules::RuleSet;
use super::side::Side;
use super::value::MainCombatValue;
use crate::support::SupportRule;
use crate::unit::{Player, PlayerId, Unit, UnitId};

/// What kind of engagement a battle is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleKind {
    /// AA, first strike and general fire.
    #[default]
    Combat,
    /// Escorts against interceptors, air units only.
    AirBattle,
}

/// Both sides of a battle in one territory.
#[derive(Debug, Clone)]
pub struct Battle {
    pub kind: BattleKind,
    pub attacker: Arc<Player>,
    pub defender: Arc<Player>,
    pub offense: Vec<Unit>,
    pub defense: Vec<Unit>,
    pub context: BattleContext,
}

impl Battle {
    pub fn new(
        attacker: Arc<Player>,
        defender: Arc<Player>,
        offense: Vec<Unit>,
        defense: Vec<Unit>,
        context: BattleContext,
    ) -> Self {
        Battle {
            kind: BattleKind::Combat,
            attacker,
            defender,
            offense,
            defense,
            context,
        }
    }

    pub fn air_battle(mut self) -> Self {
        self.kind = BattleKind::AirBattle;
        self
    }

    pub fn units(&self, side: Side) -> &[Unit] {
        match side {
            Side::Offense => &self.offense,
            Side::Defense => &self.defense,
        }
    }

    pub fn player(&self, side: Side) -> &PlayerId {
        match side {
            Side::Offense => &self.attacker.id,
            Side::Defense => &self.defender.id,
        }
    }
}

/// Which fire a roll belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireKind {
    AntiAircraft,
    FirstStrike,
    General,
    AirBattle,
}

impl fmt::Display for FireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FireKind::AntiAircraft => "anti-aircraft fire",
            FireKind::FirstStrike => "first strike",
            FireKind::General => "fire",
            FireKind::AirBattle => "air battle",
        };
        f.write_str(s)
    }
}

/// The outcome of one side firing once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireResult {
    pub kind: FireKind,
    pub side: Side,
    pub player: PlayerId,
    /// Firing units, e.g. `2 infantry, 1 artillery`.
    pub units: String,
    pub casualties: CasualtyTiming,
    pub roll: DiceRoll,
    /// Suicide units that fired and are lost whatever the dice say.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spent: Vec<UnitId>,
}

/// Everything rolled in a round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub plan: Option<RoundPlan>,
    pub fires: Vec<FireResult>,
}

impl RoundReport {
    pub fn hits_by(&self, side: Side) -> i32 {
        self.fires
            .iter()
            .filter(|f| f.side == side)
            .map(|f| f.roll.hits())
            .sum()
    }

    pub fn expected_hits_by(&self, side: Side) -> f64 {
        self.fires
            .iter()
            .filter(|f| f.side == side)
            .map(|f| f.roll.expected_hits())
            .sum()
    }
}

struct Firing<'a> {
    kind: FireKind,
    side: Side,
    units: &'a [Unit],
    casualties: CasualtyTiming,
}

fn record(
    battle: &Battle,
    rules: &RuleSet,
    firing: Firing<'_>,
    roll: DiceRoll,
    history: &mut dyn HistorySink,
) -> FireResult {
    let player = battle.player(firing.side).clone();
    history.start_event(&roll_event_text(
        &player,
        firing.units,
        &battle.context.territory,
        battle.context.round,
    ));
    history.add_child(
        &dice_text(&annotation(&player, firing.kind), &roll),
        Some(&roll),
    );
    let spent = firing
        .units
        .iter()
        .filter(|u| combat_flags(u, rules).suicide)
        .map(|u| u.id)
        .collect();
    FireResult {
        kind: firing.kind,
        side: firing.side,
        player,
        units: units_text(firing.units),
        casualties: firing.casualties,
        roll,
        spent,
    }
}

fn annotation(player: &PlayerId, kind: FireKind) -> String {
    format!("{player} {kind}")
}

/// Resolves one round of `battle`.
///
/// Random source failures abort the round; rolls made before the failure are
/// already in the history.
pub fn resolve_round(
    battle: &Battle,
    rules: &RuleSet,
    support_rules: &[SupportRule],
    random: &mut dyn RandomSource,
    history: &mut dyn HistorySink,
) -> Result<RoundReport, CombatError> {
    let _span = tracing::debug_span!(
        "round",
        territory = %battle.context.territory,
        round = battle.context.round
    )
    .entered();

    if battle.kind == BattleKind::AirBattle {
        return resolve_air_battle(battle, rules, random, history);
    }

    let mut fires = Vec::new();
    if battle.context.round == 1 {
        for side in Side::BOTH {
            let aa_units: Vec<Unit> = battle
                .units(side)
                .iter()
                .filter(|u| combat_flags(u, rules).aa)
                .cloned()
                .collect();
            for group in aa_groups(&aa_units) {
                if let Some(fire) = fire_aa(battle, side, &group, rules, random, history)? {
                    fires.push(fire);
                }
            }
        }
    }

    let plan = plan_round(&battle.offense, &battle.defense, rules);
    for step in &plan.steps {
        if let Some(fire) = fire_step(battle, step, rules, support_rules, random, history)? {
            fires.push(fire);
        }
    }

    let report = RoundReport {
        round: battle.context.round,
        plan: Some(plan),
        fires,
    };
    tracing::debug!(
        offense_hits = report.hits_by(Side::Offense),
        defense_hits = report.hits_by(Side::Defense),
        "round resolved"
    );
    Ok(report)
}

/// One AA group firing at the opposing units it may target.
fn fire_aa(
    battle: &Battle,
    side: Side,
    group: &[Unit],
    rules: &RuleSet,
    random: &mut dyn RandomSource,
    history: &mut dyn HistorySink,
) -> Result<Option<FireResult>, CombatError> {
    let targets = battle.units(side.opposite());
    if valid_aa_targets(group, targets).is_empty() {
        return Ok(None);
    }
    let player = battle.player(side);
    let roll = roll_aa(
        group,
        targets,
        side,
        rules,
        player,
        &annotation(player, FireKind::AntiAircraft),
        random,
    )?;
    let firing = Firing {
        kind: FireKind::AntiAircraft,
        side,
        units: group,
        casualties: CasualtyTiming::Immediate,
    };
    Ok(Some(record(battle, rules, firing, roll, history)))
}

fn fire_step(
    battle: &Battle,
    step: &FireStep,
    rules: &RuleSet,
    support_rules: &[SupportRule],
    random: &mut dyn RandomSource,
    history: &mut dyn HistorySink,
) -> Result<Option<FireResult>, CombatError> {
    let side = step.firing;
    let allies = battle.units(side);
    let firing = step.select(allies, rules);
    if firing.is_empty() {
        return Ok(None);
    }
    let value = MainCombatValue::new(
        &firing,
        allies,
        battle.units(side.opposite()),
        side,
        rules,
        support_rules,
        &battle.context,
    );
    let power = PowerStrengthAndRolls::build(&firing, &value);
    let kind = if step.is_first_strike() {
        FireKind::FirstStrike
    } else {
        FireKind::General
    };
    let player = battle.player(side);
    let roll = roll_combat(&power, rules, player, &annotation(player, kind), random)?;
    let firing = Firing {
        kind,
        side,
        units: &firing,
        casualties: step.casualties,
    };
    Ok(Some(record(battle, rules, firing, roll, history)))
}

fn resolve_air_battle(
    battle: &Battle,
    rules: &RuleSet,
    random: &mut dyn RandomSource,
    history: &mut dyn HistorySink,
) -> Result<RoundReport, CombatError> {
    let mut fires = Vec::new();
    for side in Side::BOTH {
        let units: Vec<Unit> = battle
            .units(side)
            .iter()
            .filter(|u| combat_flags(u, rules).air)
            .cloned()
            .collect();
        if units.is_empty() {
            continue;
        }
        let player = battle.player(side);
        let roll = air_battle(
            &units,
            side,
            rules,
            player,
            &annotation(player, FireKind::AirBattle),
            random,
        )?;
        let firing = Firing {
            kind: FireKind::AirBattle,
            side,
            units: &units,
            casualties: CasualtyTiming::EndOfRound,
        };
        fires.push(record(battle, rules, firing, roll, history));
    }
    Ok(RoundReport {
        round: battle.context.round,
        plan: None,
        fires,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::history::BattleHistory;
    use crate::combat::random::ScriptedRandom;
    use crate::support::classic_rules;
    use crate::unit::{AaProfile, UnitCatalog, UnitIdGen, UnitType};

    struct Setup {
        catalog: UnitCatalog,
        ids: UnitIdGen,
        attacker: Arc<Player>,
        defender: Arc<Player>,
    }

    impl Setup {
        fn new() -> Self {
            Setup {
                catalog: UnitCatalog::classic(),
                ids: UnitIdGen::new(),
                attacker: Arc::new(Player::new("Germans")),
                defender: Arc::new(Player::new("Russians")),
            }
        }

        fn army(&mut self, side: Side, roster: &[(&str, usize)]) -> Vec<Unit> {
            let owner = match side {
                Side::Offense => self.attacker.clone(),
                Side::Defense => self.defender.clone(),
            };
            roster
                .iter()
                .flat_map(|(name, n)| {
                    self.catalog
                        .spawn(name, *n, &owner, &mut self.ids)
                        .unwrap()
                })
                .collect()
        }

        fn battle(
            &mut self,
            offense: &[(&str, usize)],
            defense: &[(&str, usize)],
            context: BattleContext,
        ) -> Battle {
            let offense = self.army(Side::Offense, offense);
            let defense = self.army(Side::Defense, defense);
            let (attacker, defender) = (self.attacker.clone(), self.defender.clone());
            Battle::new(attacker, defender, offense, defense, context)
        }
    }

    fn resolve(battle: &Battle, random: &mut ScriptedRandom) -> Result<RoundReport, CombatError> {
        resolve_round(
            battle,
            &RuleSet::default(),
            &[],
            random,
            &mut BattleHistory::new(),
        )
    }

    fn flak(name: &str, defense: i32, target: &str) -> UnitType {
        UnitType {
            defense_rolls: 0,
            aa: Some(AaProfile {
                attack: 0,
                defense,
                max_rolls: None,
                dice_sides: None,
                may_over_stack: false,
                targets: vec![target.to_string()],
            }),
            ..UnitType::new(name)
        }
    }

    #[test]
    fn land_round_rolls_both_sides_with_artillery_support() {
        let mut setup = Setup::new();
        let battle = setup.battle(
            &[("infantry", 1), ("artillery", 1)],
            &[("infantry", 2)],
            BattleContext::new("Ukraine"),
        );
        // Offense: infantry (2, supported) and artillery (2); defense: 2 and 2.
        let mut random = ScriptedRandom::new([1, 2, 1, 5]);
        let mut history = BattleHistory::new();
        let rules = RuleSet::default();
        let report =
            resolve_round(&battle, &rules, &classic_rules(), &mut random, &mut history).unwrap();

        assert_eq!(report.fires.len(), 2);
        assert_eq!(report.hits_by(Side::Offense), 1);
        assert_eq!(report.hits_by(Side::Defense), 1);
        assert!((report.expected_hits_by(Side::Offense) - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(
            history.lines()[0],
            "Germans roll dice for 1 infantry, 1 artillery in Ukraine, round 1"
        );
        assert_eq!(history.lines()[1], "  Germans fire : 2,3");
        assert_eq!(random.remaining(), 0);
    }

    #[test]
    fn aa_fires_in_first_round_only() {
        let mut setup = Setup::new();
        let offense = [("fighter", 2), ("infantry", 1)];
        let defense = [("aaGun", 1), ("infantry", 1)];

        let first = setup.battle(&offense, &defense, BattleContext::new("Moscow"));
        let mut random = ScriptedRandom::new([5, 5, 5, 5, 5, 5]);
        let report = resolve(&first, &mut random).unwrap();
        assert_eq!(report.fires[0].kind, FireKind::AntiAircraft);
        assert_eq!(report.fires[0].roll.dice().len(), 2);
        assert_eq!(report.fires[0].casualties, CasualtyTiming::Immediate);

        let context = BattleContext::new("Moscow").with_round(2);
        let second = setup.battle(&offense, &defense, context);
        let mut random = ScriptedRandom::new([5, 5, 5, 5]);
        let report = resolve(&second, &mut random).unwrap();
        assert!(report.fires.iter().all(|f| f.kind != FireKind::AntiAircraft));
    }

    #[test]
    fn aa_types_only_roll_at_their_own_targets() {
        let mut setup = Setup::new();
        setup.catalog.insert(flak("bomberFlak", 2, "bomber")).unwrap();
        setup.catalog.insert(flak("fighterFlak", 1, "fighter")).unwrap();
        let battle = setup.battle(
            &[("bomber", 1), ("fighter", 3)],
            &[("bomberFlak", 1), ("fighterFlak", 1)],
            BattleContext::new("Ruhr"),
        );
        // 1 + 3 AA dice, then 4 dice of offensive fire. The guns have no
        // defense value, so defensive fire rolls nothing.
        let mut random = ScriptedRandom::new([0; 8]);
        let report = resolve(&battle, &mut random).unwrap();

        let aa: Vec<&FireResult> = report
            .fires
            .iter()
            .filter(|f| f.kind == FireKind::AntiAircraft)
            .collect();
        assert_eq!(aa.len(), 2);
        assert_eq!(aa[0].units, "1 bomberFlak");
        assert_eq!(aa[0].roll.dice().len(), 1);
        assert_eq!(aa[0].roll.hits(), 1);
        assert!((aa[0].roll.expected_hits() - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(aa[1].units, "1 fighterFlak");
        assert_eq!(aa[1].roll.dice().len(), 3);
        assert_eq!(aa[1].roll.hits(), 3);
        assert_eq!(random.remaining(), 0);
    }

    #[test]
    fn aa_type_without_targets_stays_silent() {
        let mut setup = Setup::new();
        setup.catalog.insert(flak("bomberFlak", 2, "bomber")).unwrap();
        let battle = setup.battle(
            &[("fighter", 2)],
            &[("bomberFlak", 1), ("aaGun", 1)],
            BattleContext::new("Ruhr"),
        );
        let mut random = ScriptedRandom::new([5; 4]);
        let report = resolve(&battle, &mut random).unwrap();
        let aa: Vec<&FireResult> = report
            .fires
            .iter()
            .filter(|f| f.kind == FireKind::AntiAircraft)
            .collect();
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].units, "1 aaGun");
        assert_eq!(aa[0].roll.dice().len(), 2);
    }

    #[test]
    fn suicide_units_are_reported_spent() {
        let mut setup = Setup::new();
        let kamikaze = UnitType {
            attack: 2,
            is_air: true,
            is_suicide: true,
            ..UnitType::new("kamikaze")
        };
        setup.catalog.insert(kamikaze).unwrap();
        let battle = setup.battle(
            &[("kamikaze", 2), ("fighter", 1)],
            &[("battleship", 1)],
            BattleContext::new("Okinawa"),
        );
        let mut random = ScriptedRandom::new([5; 4]);
        let report = resolve(&battle, &mut random).unwrap();

        let offense = &report.fires[0];
        assert_eq!(offense.side, Side::Offense);
        let kamikazes: Vec<UnitId> = battle.offense[..2].iter().map(|u| u.id).collect();
        assert_eq!(offense.spent, kamikazes);
        assert!(report.fires[1].spent.is_empty());
    }

    #[test]
    fn sneak_attack_fires_before_general_fire() {
        let mut setup = Setup::new();
        let battle = setup.battle(
            &[("submarine", 1), ("battleship", 1)],
            &[("cruiser", 1)],
            BattleContext::new("North Sea"),
        );
        let mut random = ScriptedRandom::new([0, 0, 0]);
        let report = resolve(&battle, &mut random).unwrap();
        let kinds: Vec<(FireKind, Side)> = report.fires.iter().map(|f| (f.kind, f.side)).collect();
        assert_eq!(
            kinds,
            vec![
                (FireKind::FirstStrike, Side::Offense),
                (FireKind::General, Side::Offense),
                (FireKind::General, Side::Defense),
            ]
        );
        assert_eq!(report.fires[0].units, "1 submarine");
        assert_eq!(report.fires[0].casualties, CasualtyTiming::Immediate);
    }

    #[test]
    fn random_failure_aborts_the_round() {
        let mut setup = Setup::new();
        let context = BattleContext::new("Libya");
        let battle = setup.battle(&[("armour", 2)], &[("infantry", 1)], context);
        let mut random = ScriptedRandom::new([0]);
        let err = resolve(&battle, &mut random).unwrap_err();
        assert!(matches!(err, CombatError::Random(_)));
    }

    #[test]
    fn air_battle_rolls_air_units_only() {
        let mut setup = Setup::new();
        let battle = setup
            .battle(
                &[("bomber", 2), ("fighter", 1)],
                &[("fighter", 1), ("infantry", 3)],
                BattleContext::new("Berlin"),
            )
            .air_battle();
        // Escorts roll at air attack 1; the defending fighter at air defense 1.
        let mut random = ScriptedRandom::new([0, 1, 0, 0]);
        let report = resolve(&battle, &mut random).unwrap();
        assert!(report.plan.is_none());
        assert_eq!(report.fires.len(), 2);
        assert_eq!(report.fires[0].roll.dice().len(), 3);
        assert_eq!(report.hits_by(Side::Offense), 2);
        assert_eq!(report.hits_by(Side::Defense), 1);
    }
}
