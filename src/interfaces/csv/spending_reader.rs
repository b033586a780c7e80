use crate::domain::spending::{Category, SpendingVector};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct SpendingRow {
    category: String,
    amount: Decimal,
}

/// Reads `category,amount` rows into spending pairs. Unknown category
/// names and negative amounts surface as `InvalidInput`; malformed rows
/// surface as CSV errors.
pub struct SpendingReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SpendingReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn rows(self) -> impl Iterator<Item = Result<(Category, Decimal)>> {
        self.reader.into_deserialize().map(|result| {
            let row: SpendingRow = result?;
            let category: Category = row.category.parse()?;
            Ok((category, row.amount))
        })
    }

    /// Collects every row into a validated spending vector. Repeated
    /// categories accumulate.
    pub fn into_spending(self) -> Result<SpendingVector> {
        let pairs = self.rows().collect::<Result<Vec<_>>>()?;
        SpendingVector::try_from_pairs(pairs)
    }
}
