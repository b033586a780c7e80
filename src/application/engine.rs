use crate::application::allocator;
use crate::application::calculator::compute_reward;
use crate::application::rules::enumerate_assignments;
use crate::application::tier::resolve_tier;
use crate::domain::breakdown::{CardRewardResult, CombinationResult};
use crate::domain::catalog::{Card, CardCatalog};
use crate::domain::spending::SpendingVector;
use crate::error::{Result, RewardError};
use rayon::prelude::*;
use rust_decimal::Decimal;

/// The main entry point for reward computation.
///
/// `RewardEngine` owns the validated card catalog and the miles valuation
/// used to compare miles and cashback cards on one scale. Every operation
/// is a pure function over the catalog and a spending vector; no reward
/// state survives between calls.
pub struct RewardEngine {
    catalog: CardCatalog,
    miles_value: Decimal,
}

impl RewardEngine {
    /// Creates an engine valuing one mile at the conventional $0.02.
    pub fn new(catalog: CardCatalog) -> Self {
        Self::with_miles_value(catalog, Decimal::new(2, 2))
    }

    pub fn with_miles_value(catalog: CardCatalog, miles_value: Decimal) -> Self {
        Self {
            catalog,
            miles_value,
        }
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Single-card mode: scores the card under every legal bonus-group
    /// assignment and returns the best breakdown.
    pub fn card_reward(&self, card_id: u16, spending: &SpendingVector) -> Result<CardRewardResult> {
        let card = self.card_by_id(card_id)?;
        self.best_assignment(card, spending)
    }

    /// Scores every catalog card, best first. Ties keep catalog id order.
    pub fn rank_cards(&self, spending: &SpendingVector) -> Result<Vec<CardRewardResult>> {
        let mut results = self
            .catalog
            .cards()
            .iter()
            .map(|card| self.best_assignment(card, spending))
            .collect::<Result<Vec<_>>>()?;
        results.sort_by(|a, b| {
            b.capped_reward
                .cmp(&a.capped_reward)
                .then(a.card_id.cmp(&b.card_id))
        });
        Ok(results)
    }

    /// Two-card mode: the reward-maximizing split of the month's spending
    /// across an unordered pair of distinct cards.
    pub fn optimize_pair(
        &self,
        first_id: u16,
        second_id: u16,
        spending: &SpendingVector,
    ) -> Result<CombinationResult> {
        if first_id == second_id {
            return Err(RewardError::InvalidInput(format!(
                "a pair must name two distinct cards, got id {first_id} twice"
            )));
        }
        let first = self.card_by_id(first_id)?;
        let second = self.card_by_id(second_id)?;
        allocator::optimize(first, second, spending, self.miles_value)
    }

    /// Optimizes every unordered pair of catalog cards and returns the
    /// best combination; `None` when the catalog has fewer than two cards.
    pub fn best_combination(&self, spending: &SpendingVector) -> Result<Option<CombinationResult>> {
        let cards = self.catalog.cards();
        let mut pairs = Vec::new();
        for (i, first) in cards.iter().enumerate() {
            for second in &cards[i + 1..] {
                pairs.push((first, second));
            }
        }

        let combos: Result<Vec<CombinationResult>> = pairs
            .par_iter()
            .map(|(first, second)| allocator::optimize(first, second, spending, self.miles_value))
            .collect();

        let mut best: Option<CombinationResult> = None;
        for candidate in combos? {
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
        Ok(best)
    }

    fn card_by_id(&self, card_id: u16) -> Result<&Card> {
        self.catalog
            .card(card_id)
            .ok_or_else(|| RewardError::InvalidInput(format!("unknown card id {card_id}")))
    }

    fn best_assignment(&self, card: &Card, spending: &SpendingVector) -> Result<CardRewardResult> {
        let tier = resolve_tier(card, spending);
        let mut best: Option<CardRewardResult> = None;
        for assignment in enumerate_assignments(card, spending) {
            let result = compute_reward(card, tier, &assignment, spending, self.miles_value);
            let replace = match &best {
                None => true,
                Some(current) => {
                    result.capped_reward > current.capped_reward
                        || (result.capped_reward == current.capped_reward
                            && result.overflow() < current.overflow())
                }
            };
            if replace {
                best = Some(result);
            }
        }
        best.ok_or_else(|| {
            RewardError::DataIntegrity(format!(
                "card '{}' (id {}) produced no assignment candidates",
                card.name, card.id
            ))
        })
    }
}
