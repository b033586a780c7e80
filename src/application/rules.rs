use crate::domain::catalog::{Card, Group, Rate, SpecialRule};
use crate::domain::spending::{Category, SpendingVector};

/// One group granted an elevated rate for one scoring round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusGrant {
    pub group: Group,
    pub rate: Rate,
}

/// A legal way of awarding bonus rates for one scoring round. Cards
/// without special rules get the single identity assignment: every
/// category independently rated by the tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    pub grants: Vec<BonusGrant>,
    pub label: String,
}

impl GroupAssignment {
    pub fn identity() -> Self {
        Self {
            grants: Vec::new(),
            label: "standard rates".into(),
        }
    }

    pub fn grant_for(&self, category: Category) -> Option<&BonusGrant> {
        self.grants.iter().find(|g| g.group.contains(category))
    }
}

/// Enumerates every legal bonus-group assignment for the card.
///
/// The bonus-group choice materially changes which categories earn the
/// elevated rate, so every legal choice is produced and scored downstream
/// rather than guessed from spend magnitude. Minimum-spend rules are
/// deterministic and contribute exactly one option; multiple rules on one
/// card combine by Cartesian product (their groups never overlap).
pub fn enumerate_assignments(card: &Card, spending: &SpendingVector) -> Vec<GroupAssignment> {
    let mut assignments = vec![GroupAssignment {
        grants: Vec::new(),
        label: String::new(),
    }];

    for rule in &card.special_rules {
        let options = rule_options(rule, spending);
        let mut combined = Vec::with_capacity(assignments.len() * options.len());
        for base in &assignments {
            for option in &options {
                combined.push(merge(base, option));
            }
        }
        assignments = combined;
    }

    for assignment in &mut assignments {
        if assignment.label.is_empty() {
            assignment.label = "standard rates".into();
        }
    }
    assignments
}

fn merge(base: &GroupAssignment, option: &GroupAssignment) -> GroupAssignment {
    let mut grants = base.grants.clone();
    grants.extend(option.grants.iter().cloned());
    let label = match (base.label.is_empty(), option.label.is_empty()) {
        (true, _) => option.label.clone(),
        (_, true) => base.label.clone(),
        _ => format!("{}, {}", base.label, option.label),
    };
    GroupAssignment { grants, label }
}

fn rule_options(rule: &SpecialRule, spending: &SpendingVector) -> Vec<GroupAssignment> {
    match rule {
        SpecialRule::SingleGroupBonus {
            candidates,
            bonus_rate,
        } => candidates
            .iter()
            .map(|group| GroupAssignment {
                grants: vec![BonusGrant {
                    group: group.clone(),
                    rate: *bonus_rate,
                }],
                label: format!("bonus: {}", group.name),
            })
            .collect(),
        SpecialRule::DualGroupBonus {
            candidates,
            bonus_rate,
        } => {
            let mut options = Vec::new();
            for (i, first) in candidates.iter().enumerate() {
                for second in &candidates[i + 1..] {
                    options.push(GroupAssignment {
                        grants: vec![
                            BonusGrant {
                                group: first.clone(),
                                rate: *bonus_rate,
                            },
                            BonusGrant {
                                group: second.clone(),
                                rate: *bonus_rate,
                            },
                        ],
                        label: format!("bonus: {} + {}", first.name, second.name),
                    });
                }
            }
            options
        }
        SpecialRule::TieredBonusWithMinimum {
            groups,
            bonus_rate,
            min_spend,
            per_group,
        } => {
            let qualifying: Vec<&Group> = if *per_group {
                groups
                    .iter()
                    .filter(|g| spending.subtotal(&g.categories) >= *min_spend)
                    .collect()
            } else if spending.total() >= *min_spend {
                groups.iter().collect()
            } else {
                Vec::new()
            };

            let label = if qualifying.is_empty() {
                format!("minimum spend {min_spend} not met")
            } else {
                let names: Vec<&str> = qualifying.iter().map(|g| g.name.as_str()).collect();
                format!("minimum met: {}", names.join(" + "))
            };

            vec![GroupAssignment {
                grants: qualifying
                    .into_iter()
                    .map(|group| BonusGrant {
                        group: group.clone(),
                        rate: *bonus_rate,
                    })
                    .collect(),
                label,
            }]
        }
    }
}
