mod common;

use cardmax::application::engine::RewardEngine;
use cardmax::domain::catalog::{
    Cap, CapBasis, CapScope, Card, CardCatalog, Group, Rate, RateTier, SpecialRule, SubCap,
    TierBasis,
};
use cardmax::domain::spending::{Category, SpendingVector};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn miles_engine(cards: Vec<Card>) -> RewardEngine {
    RewardEngine::with_miles_value(CardCatalog::new(cards).unwrap(), dec!(1))
}

#[test]
fn test_dining_cap_breakdown() {
    // 4 mpd on dining up to $1,500 of spend at that rate, 0.4 mpd past the
    // cap and for everything else: 1500x4 + 500x0.4 + 500x0.4 = 6400.
    let card = Card {
        id: 1,
        name: "Dining Cap".into(),
        issuer: "Test Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![RateTier {
            min_spend: dec!(0),
            description: "standard".into(),
            rates: BTreeMap::new(),
            base_rate: Some(Rate::mpd(dec!(0.4))),
            monthly_cap: None,
            sub_caps: vec![SubCap {
                scope: CapScope::Group("dining".into()),
                cap: Cap {
                    amount: dec!(1500),
                    basis: CapBasis::DollarsSpent,
                },
            }],
        }],
        special_rules: vec![SpecialRule::SingleGroupBonus {
            candidates: vec![Group {
                name: "dining".into(),
                categories: vec![Category::Dining],
            }],
            bonus_rate: Rate::mpd(dec!(4)),
        }],
    };
    let engine = miles_engine(vec![card]);
    let spending = SpendingVector::try_from_pairs([
        (Category::Dining, dec!(2000)),
        (Category::Groceries, dec!(500)),
    ])
    .unwrap();

    let result = engine.card_reward(1, &spending).unwrap();

    assert_eq!(result.lines.len(), 3);
    assert_eq!(result.lines[0].reward, dec!(6000));
    assert!(result.lines[1].over_cap);
    assert_eq!(result.uncapped_reward, dec!(6400.0));
    assert_eq!(result.capped_reward, dec!(6400.0));
    assert!(result.cap_reached);
    assert_eq!(result.cap_overflow, None);
}

#[test]
fn test_single_group_card_elects_best_group() {
    let engine = miles_engine(vec![common::single_group_card(1)]);
    let spending = SpendingVector::try_from_pairs([
        (Category::Dining, dec!(900)),
        (Category::Travel, dec!(3000)),
    ])
    .unwrap();

    let result = engine.card_reward(1, &spending).unwrap();

    // Travel: 1000x4 + 2000x0.4, dining at base: 900x0.4. Electing dining
    // instead would earn only 3600 + 1200.
    assert_eq!(result.assignment, "bonus: travel");
    assert_eq!(result.capped_reward, dec!(5160.0));
}

#[test]
fn test_dual_group_card_elects_best_two_groups() {
    let engine = miles_engine(vec![common::dual_group_card(1)]);
    let spending = SpendingVector::try_from_pairs([
        (Category::Dining, dec!(800)),
        (Category::Travel, dec!(1200)),
        (Category::Entertainment, dec!(500)),
    ])
    .unwrap();

    let result = engine.card_reward(1, &spending).unwrap();

    // travel (capped at 1000) + dining beat every other pair:
    // 4000 + 80 + 3200 + 200 = 7480.
    assert_eq!(result.assignment, "bonus: dining + travel");
    assert_eq!(result.capped_reward, dec!(7480.0));
}

#[test]
fn test_cashback_minimum_spend_gates_bonus() {
    let engine = RewardEngine::new(CardCatalog::new(vec![common::cashback_card(3)]).unwrap());

    let below = SpendingVector::try_from_pairs([
        (Category::Dining, dec!(300)),
        (Category::Utilities, dec!(200)),
    ])
    .unwrap();
    let result = engine.card_reward(3, &below).unwrap();
    // All at the 1% base rate.
    assert_eq!(result.capped_reward, dec!(5.00));
    assert!(result.assignment.contains("not met"));

    let above = SpendingVector::try_from_pairs([
        (Category::Dining, dec!(600)),
        (Category::Utilities, dec!(400)),
    ])
    .unwrap();
    let result = engine.card_reward(3, &above).unwrap();
    // Dining at 5%, utilities at 1%.
    assert_eq!(result.capped_reward, dec!(34.00));
    assert!(result.assignment.contains("minimum met"));
}

#[test]
fn test_cashback_monthly_cap_clamps() {
    let engine = RewardEngine::new(CardCatalog::new(vec![common::cashback_card(3)]).unwrap());
    let spending = SpendingVector::try_from_pairs([(Category::Groceries, dec!(2500))]).unwrap();

    let result = engine.card_reward(3, &spending).unwrap();

    assert_eq!(result.uncapped_reward, dec!(125.00));
    assert_eq!(result.capped_reward, dec!(80));
    assert!(result.cap_reached);
    assert_eq!(result.cap_overflow, Some(dec!(45.00)));
}

#[test]
fn test_per_group_minimum_judged_separately() {
    let engine = miles_engine(vec![common::grouped_minimum_card(4)]);
    let spending = SpendingVector::try_from_pairs([
        (Category::Overseas, dec!(1100)),
        (Category::Dining, dec!(500)),
    ])
    .unwrap();

    let result = engine.card_reward(4, &spending).unwrap();

    // Only the foreign-currency group clears its $1,000 minimum; dining
    // stays at base even though total spend exceeds the threshold.
    assert_eq!(result.assignment, "minimum met: fcy");
    assert_eq!(result.capped_reward, dec!(1100) * dec!(4) + dec!(500) * dec!(0.4));
}

#[test]
fn test_tier_changes_exactly_at_threshold() {
    let card = Card {
        id: 1,
        name: "Tiered".into(),
        issuer: "Test Bank".into(),
        tier_basis: TierBasis::TotalSpend,
        tiers: vec![
            RateTier {
                min_spend: dec!(0),
                description: "base".into(),
                rates: BTreeMap::new(),
                base_rate: Some(Rate::mpd(dec!(1))),
                monthly_cap: None,
                sub_caps: Vec::new(),
            },
            RateTier {
                min_spend: dec!(800),
                description: "boosted".into(),
                rates: BTreeMap::new(),
                base_rate: Some(Rate::mpd(dec!(2))),
                monthly_cap: None,
                sub_caps: Vec::new(),
            },
        ],
        special_rules: Vec::new(),
    };
    let engine = miles_engine(vec![card]);

    let below =
        SpendingVector::try_from_pairs([(Category::Dining, dec!(799.99))]).unwrap();
    assert_eq!(
        engine.card_reward(1, &below).unwrap().tier_description,
        "base"
    );

    let at = SpendingVector::try_from_pairs([(Category::Dining, dec!(800))]).unwrap();
    let result = engine.card_reward(1, &at).unwrap();
    assert_eq!(result.tier_description, "boosted");
    assert_eq!(result.capped_reward, dec!(1600));
}
