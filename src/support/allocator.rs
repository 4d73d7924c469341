//! Greedy support allocation.
//!
//! Every eligible support rule is expanded into single-use tokens, the tokens
//! are sorted most impactful first, and each token buffs the first recipient
//! that has not yet received a bonus of the same bonus type. Allocation runs
//! in four passes (allied strength, enemy strength, allied rolls, enemy rolls);
//! each pass maps the previous pass's records to a new set of records.

use std::collections::{BTreeMap, VecDeque};

use super::rule::{BonusKind, SupportRule, SupportSource};
use crate::combat::side::Side;
use crate::unit::{Unit, UnitId};

/// Raw strength and rolls of one unit between support passes.
///
/// Enemy penalties may leave either value negative; clamping happens when
/// power is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrengthAndRolls {
    pub strength: i32,
    pub rolls: i32,
}

impl StrengthAndRolls {
    pub const fn new(strength: i32, rolls: i32) -> Self {
        StrengthAndRolls { strength, rolls }
    }

    /// Returns the record with `amount` added to the value `kind` names.
    pub const fn with_bonus(self, kind: BonusKind, amount: i32) -> Self {
        match kind {
            BonusKind::Strength => StrengthAndRolls::new(self.strength + amount, self.rolls),
            BonusKind::Rolls => StrengthAndRolls::new(self.strength, self.rolls + amount),
        }
    }
}

/// Per-unit records keyed by unit id.
pub type UnitRecords = BTreeMap<UnitId, StrengthAndRolls>;

/// One allocation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportPass {
    pub kind: BonusKind,
    pub source: SupportSource,
}

/// Passes in the order they run. Later passes see the output of earlier ones.
pub const SUPPORT_PASSES: [SupportPass; 4] = [
    SupportPass {
        kind: BonusKind::Strength,
        source: SupportSource::Allied,
    },
    SupportPass {
        kind: BonusKind::Strength,
        source: SupportSource::Enemy,
    },
    SupportPass {
        kind: BonusKind::Rolls,
        source: SupportSource::Allied,
    },
    SupportPass {
        kind: BonusKind::Rolls,
        source: SupportSource::Enemy,
    },
];

/// A single bonus given by one supporting unit to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportGrant {
    /// Index of the rule in the rule list passed to the allocator.
    pub rule: usize,
    pub supporter: UnitId,
    pub recipient: UnitId,
    pub kind: BonusKind,
    pub source: SupportSource,
    pub amount: i32,
}

/// One support slot waiting for a recipient.
#[derive(Debug, Clone, Copy)]
struct SupportToken {
    rule: usize,
    supporter: UnitId,
    amount: i32,
}

/// Expands the rules taking part in `pass` into tokens, in rule declaration
/// order, then supporter order.
fn support_tokens(
    recipients: &[Unit],
    supporters: &[Unit],
    rules: &[SupportRule],
    side: Side,
    pass: SupportPass,
) -> Vec<SupportToken> {
    let mut tokens = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        if !rule.applies_to(pass.kind, pass.source, side) {
            continue;
        }
        if !recipients.iter().any(|u| rule.supports_type(u.type_name())) {
            continue;
        }
        for supporter in supporters {
            if supporter.type_name() != rule.supporting_unit_type
                || !rule.can_be_given_by(&supporter.owner)
            {
                continue;
            }
            for _ in 0..rule.capacity_for(&supporter.owner) {
                tokens.push(SupportToken {
                    rule: index,
                    supporter: supporter.id,
                    amount: rule.bonus,
                });
            }
        }
    }
    tokens
}

/// Assigns support tokens of one pass to recipients.
///
/// `recipients` must already be ordered strongest to weakest; within a type,
/// earlier recipients are buffed first. `supporters` are the allied units for
/// an allied pass and the opposing units for an enemy pass.
pub fn allocate(
    recipients: &[Unit],
    supporters: &[Unit],
    rules: &[SupportRule],
    side: Side,
    pass: SupportPass,
) -> Vec<SupportGrant> {
    let mut tokens = support_tokens(recipients, supporters, rules, side, pass);
    if tokens.is_empty() {
        return Vec::new();
    }

    // Stable sorts: equal bonuses keep declaration order.
    match pass.source {
        SupportSource::Allied => tokens.sort_by(|a, b| b.amount.cmp(&a.amount)),
        SupportSource::Enemy => tokens.sort_by_key(|t| t.amount),
    }

    // Unbuffed recipients per (bonus type, unit type), filled on first use.
    let mut pools: BTreeMap<(String, String), VecDeque<UnitId>> = BTreeMap::new();
    let mut grants = Vec::new();

    for token in tokens {
        let rule = &rules[token.rule];
        let recipient = rule.supported_unit_types.iter().find_map(|type_name| {
            pools
                .entry((rule.bonus_type.clone(), type_name.clone()))
                .or_insert_with(|| {
                    recipients
                        .iter()
                        .filter(|u| u.type_name() == type_name)
                        .map(|u| u.id)
                        .collect()
                })
                .pop_front()
        });
        if let Some(recipient) = recipient {
            grants.push(SupportGrant {
                rule: token.rule,
                supporter: token.supporter,
                recipient,
                kind: pass.kind,
                source: pass.source,
                amount: token.amount,
            });
        }
    }
    grants
}

/// Returns a copy of `records` with every grant applied.
pub fn apply_grants(records: &UnitRecords, grants: &[SupportGrant]) -> UnitRecords {
    let mut next = records.clone();
    for grant in grants {
        if let Some(record) = next.get_mut(&grant.recipient) {
            *record = record.with_bonus(grant.kind, grant.amount);
        }
    }
    next
}

/// Result of running every support pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportOutcome {
    pub records: UnitRecords,
    pub grants: Vec<SupportGrant>,
}

impl SupportOutcome {
    /// Bonuses a unit received, in the order they were granted.
    pub fn bonuses_for(&self, unit: UnitId) -> impl Iterator<Item = &SupportGrant> {
        self.grants.iter().filter(move |g| g.recipient == unit)
    }

    /// Recipients a supporting unit buffed.
    pub fn supported_by(&self, supporter: UnitId) -> Vec<UnitId> {
        self.grants
            .iter()
            .filter(|g| g.supporter == supporter)
            .map(|g| g.recipient)
            .collect()
    }
}

/// Runs the four support passes over `base` records of `recipients`.
pub fn run_support_passes(
    recipients: &[Unit],
    allies: &[Unit],
    enemies: &[Unit],
    rules: &[SupportRule],
    side: Side,
    base: UnitRecords,
) -> SupportOutcome {
    let mut records = base;
    let mut all_grants = Vec::new();
    for pass in SUPPORT_PASSES {
        let supporters = match pass.source {
            SupportSource::Allied => allies,
            SupportSource::Enemy => enemies,
        };
        let grants = allocate(recipients, supporters, rules, side, pass);
        if grants.is_empty() {
            continue;
        }
        tracing::trace!(
            side = %side,
            kind = ?pass.kind,
            source = ?pass.source,
            grants = grants.len(),
            "support pass"
        );
        records = apply_grants(&records, &grants);
        all_grants.extend(grants);
    }
    SupportOutcome {
        records,
        grants: all_grants,
    }
}
