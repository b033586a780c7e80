use crate::error::{Result, RewardError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A monthly spending domain. Categories are mutually exclusive and
/// exhaustive: every dollar of a month's spend belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dining,
    Groceries,
    Petrol,
    Transport,
    Streaming,
    Entertainment,
    Utilities,
    Online,
    Travel,
    Overseas,
    Retail,
    Departmental,
    Other,
}

impl Category {
    /// All categories, in the fixed order used for deterministic iteration.
    pub const ALL: [Category; 13] = [
        Category::Dining,
        Category::Groceries,
        Category::Petrol,
        Category::Transport,
        Category::Streaming,
        Category::Entertainment,
        Category::Utilities,
        Category::Online,
        Category::Travel,
        Category::Overseas,
        Category::Retail,
        Category::Departmental,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Dining => "dining",
            Category::Groceries => "groceries",
            Category::Petrol => "petrol",
            Category::Transport => "transport",
            Category::Streaming => "streaming",
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Online => "online",
            Category::Travel => "travel",
            Category::Overseas => "overseas",
            Category::Retail => "retail",
            Category::Departmental => "departmental",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .find(|c| c.name() == s.trim().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| RewardError::InvalidInput(format!("unknown spending category '{s}'")))
    }
}

/// One month of categorized spending.
///
/// Amounts are non-negative by construction; `set` and `try_from_pairs`
/// reject negative values before any reward computation can see them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SpendingVector {
    amounts: BTreeMap<Category, Decimal>,
}

impl SpendingVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount spent in a category, replacing any previous value.
    pub fn set(&mut self, category: Category, amount: Decimal) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(RewardError::InvalidInput(format!(
                "negative amount {amount} for category '{category}'"
            )));
        }
        self.amounts.insert(category, amount);
        Ok(())
    }

    /// Builds a vector from `(category, amount)` pairs. Repeated categories
    /// accumulate, matching how interface readers surface multi-row input.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, Decimal)>,
    {
        let mut vector = Self::new();
        for (category, amount) in pairs {
            if amount < Decimal::ZERO {
                return Err(RewardError::InvalidInput(format!(
                    "negative amount {amount} for category '{category}'"
                )));
            }
            *vector.amounts.entry(category).or_insert(Decimal::ZERO) += amount;
        }
        Ok(vector)
    }

    pub fn get(&self, category: Category) -> Decimal {
        self.amounts.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total spend across all categories.
    pub fn total(&self) -> Decimal {
        self.amounts.values().copied().sum()
    }

    /// Combined spend across the given categories.
    pub fn subtotal<'a, I>(&self, categories: I) -> Decimal
    where
        I: IntoIterator<Item = &'a Category>,
    {
        categories.into_iter().map(|c| self.get(*c)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        self.amounts.iter().map(|(c, a)| (*c, *a))
    }
}
