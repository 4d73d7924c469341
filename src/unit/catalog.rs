//! Unit type lookup by name.
//!
//! Holds the unit types a game uses. `UnitCatalog::classic()` ships the
//! familiar land/sea/air roster used by the binaries and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::unit_type::{AaProfile, UnitType};
use super::{Player, Unit, UnitIdGen};

/// Errors that can occur while building or querying a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown unit type: '{0}'")]
    UnknownUnitType(String),

    #[error("duplicate unit type: '{0}'")]
    DuplicateUnitType(String),

    #[error("unit type '{unit_type}': {field} must be 0..={max}, got {value}", max = MAX_ROLLS)]
    InvalidRolls {
        unit_type: String,
        field: &'static str,
        value: i32,
    },

    #[error("unit type '{unit_type}': AA dice sides must be at least 1, got {sides}")]
    InvalidAaDiceSides { unit_type: String, sides: i32 },
}

/// Upper bound on any roll count a unit type may declare.
pub const MAX_ROLLS: i32 = 1_000;

fn validate_type(unit_type: &UnitType) -> Result<(), CatalogError> {
    let mut counts = vec![
        ("attack_rolls", unit_type.attack_rolls),
        ("defense_rolls", unit_type.defense_rolls),
    ];
    if let Some(max_rolls) = unit_type.aa.as_ref().and_then(|aa| aa.max_rolls) {
        counts.push(("aa max_rolls", max_rolls));
    }
    for (field, value) in counts {
        if !(0..=MAX_ROLLS).contains(&value) {
            return Err(CatalogError::InvalidRolls {
                unit_type: unit_type.name.clone(),
                field,
                value,
            });
        }
    }
    if let Some(sides) = unit_type.aa.as_ref().and_then(|aa| aa.dice_sides) {
        if sides < 1 {
            return Err(CatalogError::InvalidAaDiceSides {
                unit_type: unit_type.name.clone(),
                sides,
            });
        }
    }
    Ok(())
}

/// Unit types indexed by name.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    types: BTreeMap<String, Arc<UnitType>>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        UnitCatalog::default()
    }

    /// Builds a catalog from a list of types, rejecting duplicate names.
    pub fn from_types<I>(types: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = UnitType>,
    {
        let mut catalog = UnitCatalog::new();
        for unit_type in types {
            catalog.insert(unit_type)?;
        }
        Ok(catalog)
    }

    /// Adds a type, rejecting duplicate names, roll counts outside
    /// `0..=MAX_ROLLS` and AA dice with fewer than one side.
    pub fn insert(&mut self, unit_type: UnitType) -> Result<(), CatalogError> {
        if self.types.contains_key(&unit_type.name) {
            return Err(CatalogError::DuplicateUnitType(unit_type.name));
        }
        validate_type(&unit_type)?;
        self.types.insert(unit_type.name.clone(), Arc::new(unit_type));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<UnitType>, CatalogError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownUnitType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Creates `count` units of the named type owned by `owner`.
    pub fn spawn(
        &self,
        name: &str,
        count: usize,
        owner: &Arc<Player>,
        ids: &mut UnitIdGen,
    ) -> Result<Vec<Unit>, CatalogError> {
        let unit_type = self.get(name)?;
        Ok((0..count)
            .map(|_| Unit::new(ids.next_id(), unit_type.clone(), owner.clone()))
            .collect())
    }

    /// The classic land, sea and air roster.
    pub fn classic() -> Self {
        let types = vec![
            UnitType {
                attack: 1,
                defense: 2,
                ..UnitType::new("infantry")
            },
            UnitType {
                attack: 1,
                defense: 2,
                marine_bonus: 1,
                ..UnitType::new("marine")
            },
            UnitType {
                attack: 2,
                defense: 2,
                ..UnitType::new("artillery")
            },
            UnitType {
                attack: 3,
                defense: 3,
                ..UnitType::new("armour")
            },
            UnitType {
                attack: 3,
                defense: 4,
                air_attack: 1,
                air_defense: 1,
                is_air: true,
                ..UnitType::new("fighter")
            },
            UnitType {
                attack: 4,
                defense: 1,
                air_attack: 1,
                is_air: true,
                is_strategic_bomber: true,
                ..UnitType::new("bomber")
            },
            UnitType {
                attack: 2,
                defense: 1,
                is_first_strike: true,
                ..UnitType::new("submarine")
            },
            UnitType {
                attack: 2,
                defense: 2,
                is_destroyer: true,
                ..UnitType::new("destroyer")
            },
            UnitType {
                attack: 3,
                defense: 3,
                ..UnitType::new("cruiser")
            },
            UnitType {
                attack: 1,
                defense: 2,
                ..UnitType::new("carrier")
            },
            UnitType {
                attack: 4,
                defense: 4,
                ..UnitType::new("battleship")
            },
            UnitType {
                defense_rolls: 0,
                attack_rolls: 0,
                aa: Some(AaProfile {
                    attack: 0,
                    defense: 1,
                    max_rolls: Some(3),
                    dice_sides: None,
                    may_over_stack: false,
                    targets: Vec::new(),
                }),
                ..UnitType::new("aaGun")
            },
        ];
        let mut catalog = UnitCatalog::new();
        for unit_type in types {
            catalog.types.insert(unit_type.name.clone(), Arc::new(unit_type));
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_catalog_has_core_units() {
        let catalog = UnitCatalog::classic();
        for name in ["infantry", "artillery", "submarine", "destroyer", "aaGun"] {
            assert!(catalog.contains(name), "missing {}", name);
        }
        assert!(catalog.get("submarine").unwrap().is_first_strike);
        assert!(catalog.get("destroyer").unwrap().is_destroyer);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = UnitCatalog::classic().get("zeppelin").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownUnitType(ref n) if n == "zeppelin"));
    }

    #[test]
    fn duplicate_type_rejected() {
        let err = UnitCatalog::from_types(vec![UnitType::new("tank"), UnitType::new("tank")])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateUnitType(_)));
    }

    #[test]
    fn runaway_roll_counts_rejected() {
        let err = UnitCatalog::from_types(vec![UnitType {
            attack_rolls: 2_000_000_000,
            ..UnitType::new("swarm")
        }])
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidRolls { field: "attack_rolls", value: 2_000_000_000, .. }
        ));

        let err = UnitCatalog::from_types(vec![UnitType {
            defense_rolls: -1,
            ..UnitType::new("ghost")
        }])
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRolls { field: "defense_rolls", .. }));
    }

    #[test]
    fn aa_dice_need_at_least_one_side() {
        let flak = |sides| UnitType {
            aa: Some(AaProfile {
                attack: 0,
                defense: 1,
                max_rolls: None,
                dice_sides: Some(sides),
                may_over_stack: false,
                targets: Vec::new(),
            }),
            ..UnitType::new("flak")
        };
        let err = UnitCatalog::from_types(vec![flak(0)]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidAaDiceSides { sides: 0, .. }));
        assert!(UnitCatalog::from_types(vec![flak(12)]).is_ok());
    }

    #[test]
    fn classic_types_pass_validation() {
        let classic = UnitCatalog::classic();
        let mut rebuilt = UnitCatalog::new();
        for name in ["infantry", "bomber", "aaGun", "battleship"] {
            let unit_type = classic.get(name).unwrap();
            rebuilt.insert((*unit_type).clone()).unwrap();
        }
        assert_eq!(rebuilt.len(), 4);
    }

    #[test]
    fn spawn_assigns_fresh_ids() {
        let catalog = UnitCatalog::classic();
        let owner = Arc::new(Player::new("Japanese"));
        let mut ids = UnitIdGen::new();
        let first = catalog.spawn("infantry", 2, &owner, &mut ids).unwrap();
        let second = catalog.spawn("armour", 1, &owner, &mut ids).unwrap();
        assert_eq!(first.len(), 2);
        assert_ne!(first[0].id, first[1].id);
        assert_eq!(second[0].id.0, 2);
        assert_eq!(second[0].type_name(), "armour");
    }
}
