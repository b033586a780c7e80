use crate::domain::spending::Category;
use crate::error::{Result, RewardError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How a rate turns spend into reward: a cashback percentage of the amount,
/// or miles per dollar converted through the engine's miles valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    Percentage,
    Mpd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub value: Decimal,
    pub kind: RateKind,
}

impl Rate {
    pub const fn percentage(value: Decimal) -> Self {
        Self {
            value,
            kind: RateKind::Percentage,
        }
    }

    pub const fn mpd(value: Decimal) -> Self {
        Self {
            value,
            kind: RateKind::Mpd,
        }
    }

    /// Currency value earned by one dollar of spend at this rate.
    pub fn unit_value(&self, miles_value: Decimal) -> Decimal {
        match self.kind {
            RateKind::Percentage => self.value / Decimal::ONE_HUNDRED,
            RateKind::Mpd => self.value * miles_value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RateKind::Percentage => write!(f, "{}%", self.value),
            RateKind::Mpd => write!(f, "{} mpd", self.value),
        }
    }
}

/// What a cap amount bounds: the spend that earns the governing rate, or
/// the reward credited from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapBasis {
    DollarsSpent,
    DollarsEarned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cap {
    pub amount: Decimal,
    pub basis: CapBasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapScope {
    Category(Category),
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCap {
    pub scope: CapScope,
    pub cap: Cap,
}

/// A named set of categories sharing one bonus-eligibility decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub categories: Vec<Category>,
}

impl Group {
    pub fn contains(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Card-specific constraints beyond flat per-category rates. A closed set
/// of variants dispatched by the rule engine; new shapes are additive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialRule {
    /// Exactly one group among the candidates earns the elevated rate;
    /// everything else falls back to the tier base rate.
    SingleGroupBonus { candidates: Vec<Group>, bonus_rate: Rate },
    /// Exactly two distinct groups among the candidates earn the
    /// elevated rate.
    DualGroupBonus { candidates: Vec<Group>, bonus_rate: Rate },
    /// The elevated rate applies only once a minimum spend is met:
    /// per group subtotal when `per_group`, otherwise the month's total.
    TieredBonusWithMinimum {
        groups: Vec<Group>,
        bonus_rate: Rate,
        min_spend: Decimal,
        #[serde(default)]
        per_group: bool,
    },
}

impl SpecialRule {
    pub fn groups(&self) -> &[Group] {
        match self {
            SpecialRule::SingleGroupBonus { candidates, .. }
            | SpecialRule::DualGroupBonus { candidates, .. } => candidates,
            SpecialRule::TieredBonusWithMinimum { groups, .. } => groups,
        }
    }
}

/// The spend figure a card's tier thresholds are compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierBasis {
    #[default]
    TotalSpend,
    Category(Category),
}

/// A minimum-spend-gated set of rates and caps for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    pub min_spend: Decimal,
    #[serde(default)]
    pub description: String,
    /// Explicit per-category rates. Categories not listed fall back to
    /// `base_rate`; with no base rate they earn nothing.
    #[serde(default)]
    pub rates: BTreeMap<Category, Rate>,
    #[serde(default)]
    pub base_rate: Option<Rate>,
    /// Monthly bound on reward earned across the whole tier.
    #[serde(default)]
    pub monthly_cap: Option<Decimal>,
    #[serde(default)]
    pub sub_caps: Vec<SubCap>,
}

impl RateTier {
    /// The rate a category earns outside any bonus grant. `None` means the
    /// card does not reward the category at all.
    pub fn rate_for(&self, category: Category) -> Option<Rate> {
        self.rates.get(&category).copied().or(self.base_rate)
    }

    pub fn sub_cap_for_category(&self, category: Category) -> Option<&Cap> {
        self.sub_caps.iter().find_map(|s| match &s.scope {
            CapScope::Category(c) if *c == category => Some(&s.cap),
            _ => None,
        })
    }

    pub fn sub_cap_for_group(&self, name: &str) -> Option<&Cap> {
        self.sub_caps.iter().find_map(|s| match &s.scope {
            CapScope::Group(g) if g == name => Some(&s.cap),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u16,
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub tier_basis: TierBasis,
    /// Ordered by ascending minimum-spend threshold; validated on load.
    pub tiers: Vec<RateTier>,
    #[serde(default)]
    pub special_rules: Vec<SpecialRule>,
}

/// Process-wide read-only reference data. Construction validates every
/// card so reward computation can assume well-formed inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl CardCatalog {
    pub fn new(cards: Vec<Card>) -> Result<Self> {
        let mut seen_ids = BTreeSet::new();
        for card in &cards {
            if !seen_ids.insert(card.id) {
                return Err(RewardError::DataIntegrity(format!(
                    "duplicate card id {}",
                    card.id
                )));
            }
            validate_card(card)?;
        }
        Ok(Self { cards })
    }

    pub fn card(&self, id: u16) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn validate_card(card: &Card) -> Result<()> {
    let context = |detail: String| {
        RewardError::DataIntegrity(format!("card '{}' (id {}): {detail}", card.name, card.id))
    };

    if card.tiers.is_empty() {
        return Err(context("no rate tiers defined".into()));
    }

    for pair in card.tiers.windows(2) {
        if pair[0].min_spend == pair[1].min_spend {
            return Err(context(format!(
                "duplicate tier threshold {}",
                pair[0].min_spend
            )));
        }
        if pair[0].min_spend > pair[1].min_spend {
            return Err(context(
                "tiers must be ordered by ascending minimum spend".into(),
            ));
        }
    }

    for (index, tier) in card.tiers.iter().enumerate() {
        let tier_context =
            |detail: String| context(format!("tier {index} '{}': {detail}", tier.description));

        for (category, rate) in &tier.rates {
            if rate.value < Decimal::ZERO {
                return Err(tier_context(format!("negative rate for '{category}'")));
            }
        }
        if let Some(base) = tier.base_rate
            && base.value < Decimal::ZERO
        {
            return Err(tier_context("negative base rate".into()));
        }
        if let Some(cap) = tier.monthly_cap
            && cap <= Decimal::ZERO
        {
            return Err(tier_context(format!("non-positive monthly cap {cap}")));
        }
        for sub_cap in &tier.sub_caps {
            if sub_cap.cap.amount <= Decimal::ZERO {
                return Err(tier_context(format!(
                    "non-positive sub-cap amount {}",
                    sub_cap.cap.amount
                )));
            }
            if let CapScope::Group(name) = &sub_cap.scope
                && !card
                    .special_rules
                    .iter()
                    .flat_map(|r| r.groups())
                    .any(|g| &g.name == name)
            {
                return Err(tier_context(format!(
                    "sub-cap names group '{name}' which no special rule defines"
                )));
            }
        }
    }

    let mut group_names = BTreeSet::new();
    let mut grouped_categories = BTreeSet::new();
    for rule in &card.special_rules {
        match rule {
            SpecialRule::SingleGroupBonus { candidates, .. }
            | SpecialRule::TieredBonusWithMinimum {
                groups: candidates, ..
            } => {
                if candidates.is_empty() {
                    return Err(context("special rule has no candidate groups".into()));
                }
            }
            SpecialRule::DualGroupBonus { candidates, .. } => {
                if candidates.len() < 2 {
                    return Err(context(
                        "dual-group bonus needs at least two candidate groups".into(),
                    ));
                }
            }
        }
        let bonus_rate = match rule {
            SpecialRule::SingleGroupBonus { bonus_rate, .. }
            | SpecialRule::DualGroupBonus { bonus_rate, .. }
            | SpecialRule::TieredBonusWithMinimum { bonus_rate, .. } => bonus_rate,
        };
        if bonus_rate.value < Decimal::ZERO {
            return Err(context("negative bonus rate".into()));
        }
        if let SpecialRule::TieredBonusWithMinimum { min_spend, .. } = rule
            && *min_spend < Decimal::ZERO
        {
            return Err(context("negative rule minimum spend".into()));
        }
        for group in rule.groups() {
            if group.categories.is_empty() {
                return Err(context(format!("group '{}' has no categories", group.name)));
            }
            if !group_names.insert(group.name.clone()) {
                return Err(context(format!("duplicate group name '{}'", group.name)));
            }
            for category in &group.categories {
                if !grouped_categories.insert(*category) {
                    return Err(context(format!(
                        "category '{category}' appears in more than one group"
                    )));
                }
            }
        }
    }

    Ok(())
}
