//! Battle history.
//!
//! Every roll is written to a `HistorySink` as an event line naming who
//! rolled for which units where, followed by a child line with the dice.

use serde::Serialize;

use super::dice::DiceRoll;
use crate::unit::{PlayerId, Unit};

/// Write-only log of battle events.
pub trait HistorySink {
    fn start_event(&mut self, text: &str);

    /// Detail line under the current event, with the roll it describes.
    fn add_child(&mut self, text: &str, roll: Option<&DiceRoll>);
}

/// One history line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub text: String,
    /// False for the event line, true for its detail lines.
    pub child: bool,
    pub roll: Option<DiceRoll>,
}

/// History kept in memory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BattleHistory {
    entries: Vec<HistoryEntry>,
}

impl BattleHistory {
    pub fn new() -> Self {
        BattleHistory::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Lines as printed: children indented by two spaces.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                if e.child {
                    format!("  {}", e.text)
                } else {
                    e.text.clone()
                }
            })
            .collect()
    }
}

impl HistorySink for BattleHistory {
    fn start_event(&mut self, text: &str) {
        self.entries.push(HistoryEntry {
            text: text.to_string(),
            child: false,
            roll: None,
        });
    }

    fn add_child(&mut self, text: &str, roll: Option<&DiceRoll>) {
        self.entries.push(HistoryEntry {
            text: text.to_string(),
            child: true,
            roll: roll.cloned(),
        });
    }
}

/// Discards everything; used by the simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHistory;

impl HistorySink for NullHistory {
    fn start_event(&mut self, _text: &str) {}

    fn add_child(&mut self, _text: &str, _roll: Option<&DiceRoll>) {}
}

/// Unit counts by type, in order of first appearance: `2 infantry, 1 artillery`.
pub fn units_text(units: &[Unit]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for unit in units {
        match counts.iter_mut().find(|(name, _)| *name == unit.type_name()) {
            Some((_, n)) => *n += 1,
            None => counts.push((unit.type_name(), 1)),
        }
    }
    counts
        .iter()
        .map(|(name, n)| format!("{n} {name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn roll_event_text(player: &PlayerId, units: &[Unit], location: &str, round: u32) -> String {
    format!(
        "{player} roll dice for {} in {location}, round {round}",
        units_text(units)
    )
}

pub fn dice_text(annotation: &str, roll: &DiceRoll) -> String {
    format!("{annotation} : {}", roll.as_dice_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::dice::Die;
    use crate::unit::{Player, UnitCatalog, UnitIdGen};
    use std::sync::Arc;

    #[test]
    fn event_text_names_player_units_place_and_round() {
        let owner = Arc::new(Player::new("Germans"));
        let catalog = UnitCatalog::classic();
        let mut ids = UnitIdGen::new();
        let mut units = catalog.spawn("infantry", 2, &owner, &mut ids).unwrap();
        units.extend(catalog.spawn("artillery", 1, &owner, &mut ids).unwrap());
        units.extend(catalog.spawn("infantry", 1, &owner, &mut ids).unwrap());
        assert_eq!(
            roll_event_text(&owner.id, &units, "Poland", 2),
            "Germans roll dice for 3 infantry, 1 artillery in Poland, round 2"
        );
    }

    #[test]
    fn dice_line_is_one_based() {
        let roll = DiceRoll::new(
            vec![Die::scored(0, 1), Die::scored(5, 1)],
            1,
            2.0 / 6.0,
            PlayerId::new("Germans"),
        );
        assert_eq!(dice_text("Germans attack", &roll), "Germans attack : 1,6");
        let empty = DiceRoll::empty(PlayerId::new("Germans"));
        assert_eq!(dice_text("Germans attack", &empty), "Germans attack : none");
    }

    #[test]
    fn children_are_indented() {
        let mut history = BattleHistory::new();
        history.start_event("event");
        history.add_child("detail", None);
        assert_eq!(history.lines(), vec!["event".to_string(), "  detail".to_string()]);
        assert_eq!(history.entries().len(), 2);
    }
}
