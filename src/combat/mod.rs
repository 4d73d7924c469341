//! Combat resolution: combat values, power, dice and round ordering.

pub mod dice;
pub mod first_strike;
pub mod history;
pub mod power;
pub mod profile;
pub mod random;
pub mod resolver;
pub mod round;
pub mod rules;
pub mod side;
pub mod value;

pub use dice::{DiceRoll, Die, DieOutcome};
pub use first_strike::{
    first_strike_state, plan_round, CasualtyTiming, FireGroup, FireStep, FirstStrikeState,
    ReturnFire, RoundPlan,
};
pub use history::{BattleHistory, HistorySink, NullHistory};
pub use power::{PowerStrengthAndRolls, UnitPowerAndRolls};
pub use profile::{BattleContext, TerritoryEffect};
pub use random::{DiceType, RandomError, RandomSource, ScriptedRandom, SeededRandom};
pub use resolver::{
    aa_groups, air_battle, roll_aa, roll_combat, roll_dice, roll_dice_low_luck, roll_dice_normal,
    CombatError,
};
pub use round::{resolve_round, Battle, BattleKind, FireKind, FireResult, RoundReport};
pub use rules::{RuleSet, RuleSetError, DEFAULT_DICE_SIDES};
pub use side::Side;
pub use value::{AaCombatValue, AirBattleCombatValue, CombatValue, MainCombatValue};
