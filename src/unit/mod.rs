//! Units, unit types, and their owners.
//!
//! Unit types are static, shared definitions; a `Unit` is an identity plus
//! shared references to its type and owner. The combat engine only ever reads
//! these values.

pub mod catalog;
pub mod player;
pub mod unit_type;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;

pub use catalog::{CatalogError, UnitCatalog};
pub use player::{Player, PlayerId, TechAdvances};
pub use unit_type::{AaProfile, UnitType};

/// Stable identity of a unit for the duration of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single unit taking part in a battle.
///
/// Equality and hashing use the id only.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: Arc<UnitType>,
    pub owner: Arc<Player>,
}

impl Unit {
    pub fn new(id: UnitId, unit_type: Arc<UnitType>, owner: Arc<Player>) -> Self {
        Unit {
            id,
            unit_type,
            owner,
        }
    }

    /// Name of the unit's type.
    pub fn type_name(&self) -> &str {
        &self.unit_type.name
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Hands out unit ids in increasing order.
#[derive(Debug, Clone, Default)]
pub struct UnitIdGen {
    next: u32,
}

impl UnitIdGen {
    pub fn new() -> Self {
        UnitIdGen::default()
    }

    pub fn next_id(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next += 1;
        id
    }
}
