use crate::domain::catalog::{Card, CardCatalog};
use crate::error::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loads and validates a card catalog from a JSON document: an array of
/// card records. Schema defects become `DataIntegrity` errors here, so
/// the engine only ever sees a well-formed catalog.
pub fn load_catalog(path: &Path) -> Result<CardCatalog> {
    let file = File::open(path)?;
    read_catalog(file)
}

pub fn read_catalog<R: Read>(source: R) -> Result<CardCatalog> {
    let cards: Vec<Card> = serde_json::from_reader(source)?;
    CardCatalog::new(cards)
}
