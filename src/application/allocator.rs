use crate::application::calculator::compute_reward;
use crate::application::rules::{GroupAssignment, enumerate_assignments};
use crate::application::tier::resolve_tier;
use crate::domain::breakdown::CombinationResult;
use crate::domain::catalog::{CapBasis, Card, RateTier};
use crate::domain::spending::{Category, SpendingVector};
use crate::error::{Result, RewardError};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Searches for the spending split across two cards that maximizes their
/// combined capped reward.
///
/// Every pair from the Cartesian product of the two cards' legal
/// bonus-group assignments is scored independently (in parallel) with a
/// fresh cap-headroom arena per card, and the winner is selected by
/// maximum combined capped reward, then lower wasted overflow, then first
/// pair in enumeration order. Selection is deterministic and independent
/// of evaluation order.
pub fn optimize(
    card_a: &Card,
    card_b: &Card,
    spending: &SpendingVector,
    miles_value: Decimal,
) -> Result<CombinationResult> {
    let tier_a = resolve_tier(card_a, spending);
    let tier_b = resolve_tier(card_b, spending);
    let assignments_a = enumerate_assignments(card_a, spending);
    let assignments_b = enumerate_assignments(card_b, spending);

    let mut pairs = Vec::with_capacity(assignments_a.len() * assignments_b.len());
    for assignment_a in &assignments_a {
        for assignment_b in &assignments_b {
            pairs.push((assignment_a, assignment_b));
        }
    }

    let candidates: Result<Vec<CombinationResult>> = pairs
        .par_iter()
        .map(|(assignment_a, assignment_b)| {
            evaluate_pair(
                card_a,
                tier_a,
                assignment_a,
                card_b,
                tier_b,
                assignment_b,
                spending,
                miles_value,
            )
        })
        .collect();

    let mut best: Option<CombinationResult> = None;
    for candidate in candidates? {
        let replace = match &best {
            None => true,
            Some(current) => {
                candidate.combined_reward > current.combined_reward
                    || (candidate.combined_reward == current.combined_reward
                        && candidate.combined_overflow() < current.combined_overflow())
            }
        };
        if replace {
            best = Some(candidate);
        }
    }
    best.ok_or_else(|| {
        RewardError::DataIntegrity(format!(
            "cards '{}' and '{}' produced no assignment candidates",
            card_a.name, card_b.name
        ))
    })
}

/// Scores one (assignmentA, assignmentB) candidate: allocates every
/// category between the two cards under running-cap accounting, then
/// recomputes each card's full breakdown from its final share.
#[allow(clippy::too_many_arguments)]
fn evaluate_pair(
    card_a: &Card,
    tier_a: &RateTier,
    assignment_a: &GroupAssignment,
    card_b: &Card,
    tier_b: &RateTier,
    assignment_b: &GroupAssignment,
    spending: &SpendingVector,
    miles_value: Decimal,
) -> Result<CombinationResult> {
    let mut arena_a = Arena::new(tier_a, assignment_a, miles_value);
    let mut arena_b = Arena::new(tier_b, assignment_b, miles_value);

    // Cap headroom is a shared, depleting resource within each card, so
    // processing order decides which categories get cap priority: highest
    // (rate difference x amount) leverage first. The sort is stable, so
    // ties keep the fixed category order.
    let mut order: Vec<(Category, Decimal)> = Category::ALL
        .iter()
        .filter(|category| !spending.get(**category).is_zero())
        .map(|category| {
            let amount = spending.get(*category);
            let gap = (arena_a.unit_value(*category) - arena_b.unit_value(*category)).abs();
            (*category, gap * amount)
        })
        .collect();
    order.sort_by(|x, y| y.1.cmp(&x.1));

    let mut share_a: Vec<(Category, Decimal)> = Vec::new();
    let mut share_b: Vec<(Category, Decimal)> = Vec::new();

    for (category, _) in order {
        let amount = spending.get(category);
        let value_a = arena_a.unit_value(category);
        let value_b = arena_b.unit_value(category);

        let (to_a, to_b) = if value_a.is_zero() && value_b.is_zero() {
            // Neither card rewards this category; it still must be
            // attributed to exactly one of them.
            if tier_a.base_rate.is_some() || tier_b.base_rate.is_none() {
                (amount, Decimal::ZERO)
            } else {
                (Decimal::ZERO, amount)
            }
        } else if value_b.is_zero() {
            arena_a.take(category, amount);
            (amount, Decimal::ZERO)
        } else if value_a.is_zero() {
            arena_b.take(category, amount);
            (Decimal::ZERO, amount)
        } else if value_a > value_b {
            split(&mut arena_a, &mut arena_b, category, amount)
        } else if value_b > value_a {
            let (to_b, to_a) = split(&mut arena_b, &mut arena_a, category, amount);
            (to_a, to_b)
        } else {
            let headroom_a = arena_a.headroom(category);
            let headroom_b = arena_b.headroom(category);
            if headroom_a > headroom_b {
                split(&mut arena_a, &mut arena_b, category, amount)
            } else if headroom_b > headroom_a {
                let (to_b, to_a) = split(&mut arena_b, &mut arena_a, category, amount);
                (to_a, to_b)
            } else {
                let half = amount / Decimal::TWO;
                arena_a.take(category, half);
                arena_b.take(category, amount - half);
                (half, amount - half)
            }
        };

        debug_assert_eq!(to_a + to_b, amount);
        if !to_a.is_zero() {
            share_a.push((category, to_a));
        }
        if !to_b.is_zero() {
            share_b.push((category, to_b));
        }
    }

    let spending_a = SpendingVector::try_from_pairs(share_a)?;
    let spending_b = SpendingVector::try_from_pairs(share_b)?;
    let first = compute_reward(card_a, tier_a, assignment_a, &spending_a, miles_value);
    let second = compute_reward(card_b, tier_b, assignment_b, &spending_b, miles_value);
    let combined_reward = first.capped_reward + second.capped_reward;

    Ok(CombinationResult {
        first,
        second,
        combined_reward,
    })
}

/// Gives the preferred (higher-value) card as much as its remaining
/// headroom allows, the rest to the other card up to its own headroom,
/// and any leftover beyond both back to the preferred card, where it
/// earns that card's base rate.
fn split(
    preferred: &mut Arena<'_>,
    other: &mut Arena<'_>,
    category: Category,
    amount: Decimal,
) -> (Decimal, Decimal) {
    let at_full = amount.min(preferred.headroom(category));
    let remainder = amount - at_full;
    let to_other = remainder.min(other.headroom(category));
    let to_preferred = at_full + (remainder - to_other);
    preferred.take(category, to_preferred);
    other.take(category, to_other);
    (to_preferred, to_other)
}

/// Per-evaluation cap-headroom tracker for one card. Each candidate pair
/// gets fresh arenas, which keeps the parallel pair sweep free of shared
/// mutable state. This steers allocation only; the calculator recomputes
/// exact rewards from the final shares.
struct Arena<'a> {
    tier: &'a RateTier,
    assignment: &'a GroupAssignment,
    miles_value: Decimal,
    group_spend_left: BTreeMap<&'a str, Decimal>,
    group_earn_left: BTreeMap<&'a str, Decimal>,
    monthly_left: Option<Decimal>,
}

impl<'a> Arena<'a> {
    fn new(tier: &'a RateTier, assignment: &'a GroupAssignment, miles_value: Decimal) -> Self {
        let mut group_spend_left = BTreeMap::new();
        let mut group_earn_left = BTreeMap::new();
        for grant in &assignment.grants {
            if let Some(cap) = tier.sub_cap_for_group(&grant.group.name) {
                match cap.basis {
                    CapBasis::DollarsSpent => {
                        group_spend_left.insert(grant.group.name.as_str(), cap.amount);
                    }
                    CapBasis::DollarsEarned => {
                        group_earn_left.insert(grant.group.name.as_str(), cap.amount);
                    }
                }
            }
        }
        Self {
            tier,
            assignment,
            miles_value,
            group_spend_left,
            group_earn_left,
            monthly_left: tier.monthly_cap,
        }
    }

    /// Currency value one dollar of this category earns at the card's
    /// governing (bonus or tier) rate.
    fn unit_value(&self, category: Category) -> Decimal {
        match self.assignment.grant_for(category) {
            Some(grant) => grant.rate.unit_value(self.miles_value),
            None => self
                .tier
                .rate_for(category)
                .map(|rate| rate.unit_value(self.miles_value))
                .unwrap_or(Decimal::ZERO),
        }
    }

    /// Spend this category can still absorb at the governing rate before
    /// a cap displaces or stops earning.
    fn headroom(&self, category: Category) -> Decimal {
        let unit = self.unit_value(category);
        if unit.is_zero() {
            return Decimal::MAX;
        }
        let mut headroom = Decimal::MAX;
        if let Some(grant) = self.assignment.grant_for(category) {
            let name = grant.group.name.as_str();
            if let Some(left) = self.group_spend_left.get(name) {
                headroom = headroom.min(*left);
            }
            if let Some(left) = self.group_earn_left.get(name) {
                headroom = headroom.min(*left / unit);
            }
        } else if let Some(cap) = self.tier.sub_cap_for_category(category) {
            match cap.basis {
                CapBasis::DollarsSpent => headroom = headroom.min(cap.amount),
                CapBasis::DollarsEarned => headroom = headroom.min(cap.amount / unit),
            }
        }
        if let Some(left) = self.monthly_left {
            headroom = headroom.min(left / unit);
        }
        headroom
    }

    /// Records an allocation, depleting the headroom it consumed.
    fn take(&mut self, category: Category, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        let unit = self.unit_value(category);
        let base_unit = self
            .tier
            .base_rate
            .map(|rate| rate.unit_value(self.miles_value))
            .unwrap_or(Decimal::ZERO);

        let mut at_full = amount;
        if let Some(grant) = self.assignment.grant_for(category) {
            let name = grant.group.name.as_str();
            if let Some(left) = self.group_spend_left.get_mut(name) {
                at_full = amount.min(*left);
                *left -= at_full;
            }
            if let Some(left) = self.group_earn_left.get_mut(name) {
                *left = (*left - at_full * unit).max(Decimal::ZERO);
            }
        } else if let Some(cap) = self.tier.sub_cap_for_category(category)
            && cap.basis == CapBasis::DollarsSpent
        {
            at_full = amount.min(cap.amount);
        }

        if let Some(left) = &mut self.monthly_left {
            let earned = at_full * unit + (amount - at_full) * base_unit;
            *left = (*left - earned).max(Decimal::ZERO);
        }
    }
}
