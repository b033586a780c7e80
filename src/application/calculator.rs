use crate::application::rules::GroupAssignment;
use crate::domain::breakdown::{CardRewardResult, RewardLineItem};
use crate::domain::catalog::{Cap, CapBasis, Card, Rate, RateTier};
use crate::domain::spending::{Category, SpendingVector};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Computes one card's full reward breakdown for one month under a
/// resolved tier and a chosen bonus-group assignment.
///
/// Caps apply in a fixed order: category/group sub-caps first, then the
/// tier's monthly cap over the running total. A `dollars_spent` sub-cap
/// displaces the spend beyond it to the tier base rate (a second line,
/// marked over-cap); a `dollars_earned` sub-cap clamps what the line
/// credits toward the total while the line itself still shows the
/// uncapped reward. Pure function over validated inputs.
pub fn compute_reward(
    card: &Card,
    tier: &RateTier,
    assignment: &GroupAssignment,
    spending: &SpendingVector,
    miles_value: Decimal,
) -> CardRewardResult {
    let mut acc = Accumulator::new(miles_value);
    let zero_rate = Rate::mpd(Decimal::ZERO);

    // Bonus-group cap headroom is a shared resource depleted across every
    // category of the group, in fixed category order.
    let mut group_spend_left: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut group_earn_left: BTreeMap<&str, Decimal> = BTreeMap::new();
    for grant in &assignment.grants {
        match tier.sub_cap_for_group(&grant.group.name) {
            Some(Cap {
                amount,
                basis: CapBasis::DollarsSpent,
            }) => {
                group_spend_left.insert(grant.group.name.as_str(), *amount);
            }
            Some(Cap {
                amount,
                basis: CapBasis::DollarsEarned,
            }) => {
                group_earn_left.insert(grant.group.name.as_str(), *amount);
            }
            None => {}
        }
    }

    for category in Category::ALL {
        let amount = spending.get(category);
        if amount.is_zero() {
            continue;
        }

        if let Some(grant) = assignment.grant_for(category) {
            let name = grant.group.name.as_str();
            if let Some(spend_left) = group_spend_left.get_mut(name) {
                let at_bonus = amount.min(*spend_left);
                *spend_left -= at_bonus;
                if at_bonus > Decimal::ZERO {
                    acc.push(category, at_bonus, grant.rate, None, false);
                }
                let spill = amount - at_bonus;
                if spill > Decimal::ZERO {
                    let spill_rate = spill_rate(tier, grant.rate, zero_rate);
                    acc.push(category, spill, spill_rate, None, true);
                }
            } else if let Some(earn_left) = group_earn_left.get_mut(name) {
                acc.push(category, amount, grant.rate, Some(earn_left), false);
            } else {
                acc.push(category, amount, grant.rate, None, false);
            }
        } else {
            match tier.rate_for(category) {
                // The card does not reward this category; the amount is
                // still recorded so allocations stay accountable.
                None => acc.push(category, amount, zero_rate, None, false),
                Some(rate) => match tier.sub_cap_for_category(category) {
                    None => acc.push(category, amount, rate, None, false),
                    Some(cap) => match cap.basis {
                        CapBasis::DollarsSpent => {
                            let within = amount.min(cap.amount);
                            if within > Decimal::ZERO {
                                acc.push(category, within, rate, None, false);
                            }
                            let spill = amount - within;
                            if spill > Decimal::ZERO {
                                let spill_rate = spill_rate(tier, rate, zero_rate);
                                acc.push(category, spill, spill_rate, None, true);
                            }
                        }
                        CapBasis::DollarsEarned => {
                            let mut earn_left = cap.amount;
                            acc.push(category, amount, rate, Some(&mut earn_left), false);
                        }
                    },
                },
            }
        }
    }

    let capped = match tier.monthly_cap {
        Some(cap) if acc.credited > cap => {
            acc.any_capped = true;
            cap
        }
        _ => acc.credited,
    };
    let overflow = acc.uncapped - capped;

    CardRewardResult {
        card_id: card.id,
        card_name: card.name.clone(),
        tier_description: tier.description.clone(),
        assignment: assignment.label.clone(),
        lines: acc.lines,
        uncapped_reward: acc.uncapped,
        capped_reward: capped,
        cap_reached: acc.any_capped,
        cap_overflow: (overflow > Decimal::ZERO).then_some(overflow),
    }
}

/// Spend displaced past a `dollars_spent` cap earns the tier base rate,
/// or nothing when the base rate is what the cap was bounding.
fn spill_rate(tier: &RateTier, capped_rate: Rate, zero_rate: Rate) -> Rate {
    tier.base_rate
        .filter(|base| *base != capped_rate)
        .unwrap_or(zero_rate)
}

struct Accumulator {
    lines: Vec<RewardLineItem>,
    uncapped: Decimal,
    credited: Decimal,
    any_capped: bool,
    miles_value: Decimal,
}

impl Accumulator {
    fn new(miles_value: Decimal) -> Self {
        Self {
            lines: Vec::new(),
            uncapped: Decimal::ZERO,
            credited: Decimal::ZERO,
            any_capped: false,
            miles_value,
        }
    }

    /// Appends a line; `earn_left`, when given, is the remaining
    /// earned-basis headroom clamping what the line credits.
    fn push(
        &mut self,
        category: Category,
        amount: Decimal,
        rate: Rate,
        earn_left: Option<&mut Decimal>,
        displaced: bool,
    ) {
        let reward = amount * rate.unit_value(self.miles_value);
        let mut credit = reward;
        let mut over_cap = displaced;
        if let Some(left) = earn_left {
            if credit > *left {
                credit = *left;
                over_cap = true;
            }
            *left -= credit;
        }
        if over_cap {
            self.any_capped = true;
        }
        self.uncapped += reward;
        self.credited += credit;
        self.lines.push(RewardLineItem {
            category,
            amount,
            rate,
            reward,
            over_cap,
        });
    }
}
