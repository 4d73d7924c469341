//! The two sides of a battle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of a battle a unit fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Offense,
    Defense,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Offense, Side::Defense];

    pub const fn opposite(self) -> Side {
        match self {
            Side::Offense => Side::Defense,
            Side::Defense => Side::Offense,
        }
    }

    pub const fn is_defending(self) -> bool {
        matches!(self, Side::Defense)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Offense => f.write_str("offense"),
            Side::Defense => f.write_str("defense"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for side in Side::BOTH {
            assert_ne!(side, side.opposite());
            assert_eq!(side, side.opposite().opposite());
        }
    }

    #[test]
    fn only_defense_is_defending() {
        assert!(Side::Defense.is_defending());
        assert!(!Side::Offense.is_defending());
    }
}
