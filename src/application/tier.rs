use crate::domain::catalog::{Card, RateTier, TierBasis};
use crate::domain::spending::SpendingVector;

/// Selects the tier with the highest minimum-spend threshold not exceeding
/// the card's spend figure (total spend, or one category's subtotal when
/// the card tiers on a category). Spend below every threshold falls back
/// to the lowest tier; this never fails.
pub fn resolve_tier<'a>(card: &'a Card, spending: &SpendingVector) -> &'a RateTier {
    let figure = match card.tier_basis {
        TierBasis::TotalSpend => spending.total(),
        TierBasis::Category(category) => spending.get(category),
    };
    // Tiers are validated to be in strictly ascending threshold order.
    card.tiers
        .iter()
        .rev()
        .find(|tier| tier.min_spend <= figure)
        .unwrap_or(&card.tiers[0])
}
