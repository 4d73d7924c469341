//! Unit-to-unit support.
//!
//! Support rules describe bonuses one unit type gives another (or penalties
//! it inflicts on enemies); the allocator hands those bonuses out to
//! individual units.

pub mod allocator;
pub mod rule;

pub use allocator::{
    allocate, apply_grants, run_support_passes, StrengthAndRolls, SupportGrant, SupportOutcome,
    SupportPass, UnitRecords, SUPPORT_PASSES,
};
pub use rule::{
    rules_from_json_str, BonusKind, SupportRule, SupportRuleError, SupportSource,
    DEFAULT_BONUS_TYPE,
};

use crate::unit::UnitCatalog;

/// The classic artillery rule: each artillery adds one to one infantry or
/// marine, on attack only.
pub fn classic_rules() -> Vec<SupportRule> {
    vec![
        SupportRule::strength("artillery", "artillery", &["infantry", "marine"], 1, 1)
            .offense_only()
            .with_improved_artillery(),
    ]
}

/// Checks that every unit type a rule names exists in `catalog`.
pub fn check_rules_against(
    rules: &[SupportRule],
    catalog: &UnitCatalog,
) -> Result<(), SupportRuleError> {
    for rule in rules {
        let names = std::iter::once(&rule.supporting_unit_type).chain(&rule.supported_unit_types);
        for name in names {
            if !catalog.contains(name) {
                return Err(SupportRuleError::UnknownUnitType {
                    rule: rule.name.clone(),
                    unit_type: name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_rules_match_classic_catalog() {
        assert!(check_rules_against(&classic_rules(), &UnitCatalog::classic()).is_ok());
    }

    #[test]
    fn unknown_type_in_rule_reported() {
        let rules = vec![SupportRule::strength("odd", "artillery", &["dragoon"], 1, 1)];
        let err = check_rules_against(&rules, &UnitCatalog::classic()).unwrap_err();
        assert_eq!(
            err,
            SupportRuleError::UnknownUnitType {
                rule: "odd".into(),
                unit_type: "dragoon".into()
            }
        );
    }
}
