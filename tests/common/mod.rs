#![allow(dead_code)]

use cardmax::domain::catalog::{
    Cap, CapBasis, CapScope, Card, CardCatalog, Group, Rate, RateTier, SpecialRule, SubCap,
    TierBasis,
};
use cardmax::domain::spending::Category;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub fn group(name: &str, categories: &[Category]) -> Group {
    Group {
        name: name.into(),
        categories: categories.to_vec(),
    }
}

fn lifestyle_groups() -> Vec<Group> {
    vec![
        group("dining", &[Category::Dining]),
        group("entertainment", &[Category::Entertainment]),
        group("retail", &[Category::Retail]),
        group("transport", &[Category::Transport, Category::Petrol]),
        group("travel", &[Category::Travel]),
    ]
}

fn lifestyle_sub_caps(cap: Decimal) -> Vec<SubCap> {
    lifestyle_groups()
        .into_iter()
        .map(|g| SubCap {
            scope: CapScope::Group(g.name),
            cap: Cap {
                amount: cap,
                basis: CapBasis::DollarsSpent,
            },
        })
        .collect()
}

/// Miles card that elevates exactly one lifestyle group to 4 mpd, capped
/// at $1,000 of group spend, with 0.4 mpd everywhere else.
pub fn single_group_card(id: u16) -> Card {
    Card {
        id,
        name: "One Group".into(),
        issuer: "Alpha Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![RateTier {
            min_spend: dec!(0),
            description: "standard".into(),
            rates: BTreeMap::new(),
            base_rate: Some(Rate::mpd(dec!(0.4))),
            monthly_cap: None,
            sub_caps: lifestyle_sub_caps(dec!(1000)),
        }],
        special_rules: vec![SpecialRule::SingleGroupBonus {
            candidates: lifestyle_groups(),
            bonus_rate: Rate::mpd(dec!(4)),
        }],
    }
}

/// Variant electing two lifestyle groups, each under its own group cap.
pub fn dual_group_card(id: u16) -> Card {
    Card {
        id,
        name: "Two Groups".into(),
        issuer: "Alpha Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![RateTier {
            min_spend: dec!(0),
            description: "standard".into(),
            rates: BTreeMap::new(),
            base_rate: Some(Rate::mpd(dec!(0.4))),
            monthly_cap: None,
            sub_caps: lifestyle_sub_caps(dec!(1000)),
        }],
        special_rules: vec![SpecialRule::DualGroupBonus {
            candidates: lifestyle_groups(),
            bonus_rate: Rate::mpd(dec!(4)),
        }],
    }
}

/// Cashback card paying 5% on everyday categories once $800 of total
/// monthly spend is reached, 1% otherwise, under an $80 monthly cap.
pub fn cashback_card(id: u16) -> Card {
    Card {
        id,
        name: "Everyday Cashback".into(),
        issuer: "Beta Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![RateTier {
            min_spend: dec!(0),
            description: "standard".into(),
            rates: BTreeMap::new(),
            base_rate: Some(Rate::percentage(dec!(1))),
            monthly_cap: Some(dec!(80)),
            sub_caps: Vec::new(),
        }],
        special_rules: vec![SpecialRule::TieredBonusWithMinimum {
            groups: vec![group(
                "everyday",
                &[Category::Dining, Category::Groceries, Category::Transport],
            )],
            bonus_rate: Rate::percentage(dec!(5)),
            min_spend: dec!(800),
            per_group: false,
        }],
    }
}

/// Miles card with 4 mpd on foreign-currency and grouped local spend,
/// each group gated on its own $1,000 minimum and capped at $1,200.
pub fn grouped_minimum_card(id: u16) -> Card {
    let groups = vec![
        group("fcy", &[Category::Overseas]),
        group(
            "local",
            &[
                Category::Dining,
                Category::Groceries,
                Category::Petrol,
                Category::Entertainment,
                Category::Retail,
            ],
        ),
    ];
    Card {
        id,
        name: "Grouped Minimum".into(),
        issuer: "Gamma Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![RateTier {
            min_spend: dec!(0),
            description: "standard".into(),
            rates: BTreeMap::new(),
            base_rate: Some(Rate::mpd(dec!(0.4))),
            monthly_cap: None,
            sub_caps: groups
                .iter()
                .map(|g| SubCap {
                    scope: CapScope::Group(g.name.clone()),
                    cap: Cap {
                        amount: dec!(1200),
                        basis: CapBasis::DollarsSpent,
                    },
                })
                .collect(),
        }],
        special_rules: vec![SpecialRule::TieredBonusWithMinimum {
            groups,
            bonus_rate: Rate::mpd(dec!(4)),
            min_spend: dec!(1000),
            per_group: true,
        }],
    }
}

/// Flat 1.2 mpd on everything, no rules, no caps.
pub fn flat_miles_card(id: u16) -> Card {
    Card {
        id,
        name: "Flat Miles".into(),
        issuer: "Delta Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![RateTier {
            min_spend: dec!(0),
            description: "standard".into(),
            rates: BTreeMap::new(),
            base_rate: Some(Rate::mpd(dec!(1.2))),
            monthly_cap: None,
            sub_caps: Vec::new(),
        }],
        special_rules: Vec::new(),
    }
}

pub fn fixture_catalog() -> CardCatalog {
    CardCatalog::new(vec![
        single_group_card(1),
        dual_group_card(2),
        cashback_card(3),
        grouped_minimum_card(4),
        flat_miles_card(5),
    ])
    .unwrap()
}
