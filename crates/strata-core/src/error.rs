use thiserror::Error;

/// Top-level error type for the Strata system.
///
/// Library crates return this directly so that the `?` operator works across
/// crate boundaries without intermediate conversions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrataError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Inconsistent block state: {0}")]
    InconsistentBlockState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for StrataError {
    fn from(err: toml::de::Error) -> Self {
        StrataError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StrataError {
    fn from(err: toml::ser::Error) -> Self {
        StrataError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        StrataError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;
