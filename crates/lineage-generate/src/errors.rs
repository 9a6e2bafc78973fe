use thiserror::Error;

/// Errors emitted by the generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("person identifiers exhausted after {0}")]
    IdsExhausted(u32),
    #[error("identifier allocator reused {0}")]
    DuplicateId(String),
    #[error("date out of range: {0}")]
    DateOutOfRange(String),
    #[error("tree integrity error: {0}")]
    Integrity(#[from] lineage_core::Error),
    #[error("asset error: {0}")]
    Asset(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("generation failed: {0}")]
    Failed(String),
}
