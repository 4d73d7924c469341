//! Random number sources for dice.
//!
//! The engine never reaches for ambient randomness: every resolver call takes
//! a `RandomSource`. `SeededRandom` wraps a fast `SmallRng`; `ScriptedRandom`
//! replays a fixed sequence for tests and replays.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::unit::PlayerId;

/// What a batch of dice is rolled for, recorded for audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceType {
    Combat,
    AntiAircraft,
    AirBattle,
}

/// Errors a random source can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RandomError {
    #[error("dice must have at least one side, got {0}")]
    InvalidSides(i32),

    #[error("scripted dice exhausted: wanted {wanted}, {remaining} left")]
    Exhausted { wanted: usize, remaining: usize },

    #[error("scripted die value {value} is outside [0, {sides})")]
    OutOfRange { value: i32, sides: i32 },
}

/// Source of zero-based dice values.
pub trait RandomSource {
    /// Returns `count` values, each in `[0, dice_sides)`.
    ///
    /// `player`, `dice_type` and `annotation` identify the roll for logging;
    /// they do not influence the values.
    fn get_random(
        &mut self,
        dice_sides: i32,
        count: usize,
        player: &PlayerId,
        dice_type: DiceType,
        annotation: &str,
    ) -> Result<Vec<i32>, RandomError>;
}

/// Pseudo-random dice backed by `SmallRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// Deterministic dice: the same seed rolls the same sequence.
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        SeededRandom {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn get_random(
        &mut self,
        dice_sides: i32,
        count: usize,
        player: &PlayerId,
        dice_type: DiceType,
        annotation: &str,
    ) -> Result<Vec<i32>, RandomError> {
        if dice_sides < 1 {
            return Err(RandomError::InvalidSides(dice_sides));
        }
        let values: Vec<i32> = (0..count).map(|_| self.rng.gen_range(0..dice_sides)).collect();
        tracing::trace!(player = %player, ?dice_type, annotation, ?values, "random dice");
        Ok(values)
    }
}

/// Replays a fixed sequence of die values.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<i32>,
    consumed: usize,
}

impl ScriptedRandom {
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        ScriptedRandom {
            values: values.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Values handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Values still waiting to be rolled.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn get_random(
        &mut self,
        dice_sides: i32,
        count: usize,
        _player: &PlayerId,
        _dice_type: DiceType,
        _annotation: &str,
    ) -> Result<Vec<i32>, RandomError> {
        if dice_sides < 1 {
            return Err(RandomError::InvalidSides(dice_sides));
        }
        if count > self.values.len() {
            return Err(RandomError::Exhausted {
                wanted: count,
                remaining: self.values.len(),
            });
        }
        let values: Vec<i32> = self.values.drain(..count).collect();
        if let Some(&value) = values.iter().find(|v| **v < 0 || **v >= dice_sides) {
            return Err(RandomError::OutOfRange {
                value,
                sides: dice_sides,
            });
        }
        self.consumed += count;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerId {
        PlayerId::new("Germans")
    }

    #[test]
    fn seeded_random_is_deterministic() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        let x = a.get_random(6, 50, &player(), DiceType::Combat, "").unwrap();
        let y = b.get_random(6, 50, &player(), DiceType::Combat, "").unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn seeded_values_in_range() {
        let mut rng = SeededRandom::new(42);
        let values = rng.get_random(6, 500, &player(), DiceType::Combat, "").unwrap();
        assert_eq!(values.len(), 500);
        assert!(values.iter().all(|v| (0..6).contains(v)));
    }

    #[test]
    fn zero_count_consumes_nothing() {
        let mut rng = ScriptedRandom::new([3]);
        let values = rng.get_random(6, 0, &player(), DiceType::Combat, "").unwrap();
        assert!(values.is_empty());
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn scripted_replays_in_order() {
        let mut rng = ScriptedRandom::new([0, 5, 2]);
        assert_eq!(
            rng.get_random(6, 2, &player(), DiceType::Combat, "").unwrap(),
            vec![0, 5]
        );
        assert_eq!(rng.consumed(), 2);
        assert_eq!(
            rng.get_random(6, 1, &player(), DiceType::AntiAircraft, "").unwrap(),
            vec![2]
        );
    }

    #[test]
    fn scripted_exhaustion_is_an_error() {
        let mut rng = ScriptedRandom::new([1]);
        let err = rng.get_random(6, 2, &player(), DiceType::Combat, "").unwrap_err();
        assert_eq!(
            err,
            RandomError::Exhausted {
                wanted: 2,
                remaining: 1
            }
        );
    }

    #[test]
    fn scripted_value_out_of_range() {
        let mut rng = ScriptedRandom::new([6]);
        let err = rng.get_random(6, 1, &player(), DiceType::Combat, "").unwrap_err();
        assert_eq!(err, RandomError::OutOfRange { value: 6, sides: 6 });
    }

    #[test]
    fn invalid_sides_rejected() {
        let mut rng = SeededRandom::new(1);
        assert_eq!(
            rng.get_random(0, 1, &player(), DiceType::Combat, ""),
            Err(RandomError::InvalidSides(0))
        );
    }
}
