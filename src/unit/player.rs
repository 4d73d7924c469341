//! Players and the technology that changes their units' combat values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a player (nation).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(name: impl Into<String>) -> Self {
        PlayerId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Technology a player has researched. Per-type bonuses are keyed by unit
/// type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechAdvances {
    /// Supporting units flagged for improved artillery support buff twice as
    /// many recipients.
    pub improved_artillery_support: bool,
    /// Strategic bombers roll one extra attack die.
    pub heavy_bombers: bool,
    pub attack_bonus: BTreeMap<String, i32>,
    pub defense_bonus: BTreeMap<String, i32>,
    pub attack_rolls_bonus: BTreeMap<String, i32>,
    pub defense_rolls_bonus: BTreeMap<String, i32>,
}

/// A player and the technology it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub tech: TechAdvances,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player {
            id: PlayerId::new(name),
            tech: TechAdvances::default(),
        }
    }

    pub fn with_tech(mut self, tech: TechAdvances) -> Self {
        self.tech = tech;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_deserializes_without_tech() {
        let player: Player = serde_json::from_str(r#"{"id":"Russians"}"#).unwrap();
        assert_eq!(player.id.as_str(), "Russians");
        assert_eq!(player.tech, TechAdvances::default());
    }

    #[test]
    fn tech_bonuses_deserialize_by_type_name() {
        let json = r#"{
            "id": "Americans",
            "tech": {"heavy_bombers": true, "attack_bonus": {"fighter": 1}}
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert!(player.tech.heavy_bombers);
        assert_eq!(player.tech.attack_bonus.get("fighter"), Some(&1));
        assert!(!player.tech.improved_artillery_support);
    }
}
