use thiserror::Error;

/// Core error type shared across Lineage crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced person is not in the store.
    #[error("unknown person: {0}")]
    UnknownPerson(String),
    /// A person with the same identifier was already stored.
    #[error("duplicate person: {0}")]
    DuplicatePerson(String),
    /// Parent links are write-once.
    #[error("parents already set for {0}")]
    ParentAlreadySet(String),
    /// An identifier or key could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    /// The tree violates internal invariants.
    #[error("invalid tree: {0}")]
    InvalidTree(String),
}

/// Convenience alias for results returned by Lineage crates.
pub type Result<T> = std::result::Result<T, Error>;
