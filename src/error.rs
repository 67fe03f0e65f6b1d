use thiserror::Error;

/// Failures that can abort a single ledger operation. None of them leave
/// the chain partially modified.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Data rejected by validator for block #{height}")]
    Validation { height: usize },

    #[error("Genesis block could not be hashed: {0}")]
    Hash(#[source] serde_json::Error),

    #[error("Mining failed: {0}")]
    Mining(#[from] MiningError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("difficulty {difficulty} exceeds the {max} hex digits of a digest")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    #[error("proof-of-work counter exhausted without meeting the target")]
    NonceExhausted,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
