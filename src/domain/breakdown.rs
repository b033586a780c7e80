use crate::domain::catalog::Rate;
use crate::domain::spending::Category;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of a card's reward breakdown. A category may produce more than
/// one line when a cap splits its spend across two rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardLineItem {
    pub category: Category,
    /// Spend assigned to this line.
    pub amount: Decimal,
    pub rate: Rate,
    /// Reward earned by `amount` at `rate`, before any earned-basis cap.
    pub reward: Decimal,
    /// True when a cap displaced this portion to a lower rate or clamped
    /// its credited contribution.
    pub over_cap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRewardResult {
    pub card_id: u16,
    pub card_name: String,
    pub tier_description: String,
    /// Label of the bonus-group assignment this result was scored under.
    pub assignment: String,
    pub lines: Vec<RewardLineItem>,
    pub uncapped_reward: Decimal,
    pub capped_reward: Decimal,
    pub cap_reached: bool,
    /// Amount by which the uncapped reward exceeded the caps, when it did.
    pub cap_overflow: Option<Decimal>,
}

impl CardRewardResult {
    /// Spend assigned to this card per category, reassembled from the
    /// breakdown lines. Zero-reward lines still carry their amounts, so
    /// this is the card's complete share of the month's spend.
    pub fn allocation(&self) -> BTreeMap<Category, Decimal> {
        let mut allocation = BTreeMap::new();
        for line in &self.lines {
            *allocation.entry(line.category).or_insert(Decimal::ZERO) += line.amount;
        }
        allocation
    }

    pub fn overflow(&self) -> Decimal {
        self.cap_overflow.unwrap_or(Decimal::ZERO)
    }
}

/// A two-card split of one month's spending. Per-category amounts across
/// both results sum exactly to the input vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationResult {
    pub first: CardRewardResult,
    pub second: CardRewardResult,
    pub combined_reward: Decimal,
}

impl CombinationResult {
    pub fn combined_overflow(&self) -> Decimal {
        self.first.overflow() + self.second.overflow()
    }
}
