use thiserror::Error;

pub type Result<T> = std::result::Result<T, RewardError>;

#[derive(Error, Debug)]
pub enum RewardError {
    /// Catalog defects caught at construction time. The engine never raises
    /// this during reward computation.
    #[error("catalog integrity: {0}")]
    DataIntegrity(String),
    /// Malformed request data: negative amounts, unknown categories or
    /// card ids, a pair naming the same card twice.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
