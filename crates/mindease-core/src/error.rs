use thiserror::Error;

/// Top-level error type for MindEase.
///
/// Subsystem crates define their own error types and implement
/// `From<MindEaseError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MindEaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MindEaseError {
    fn from(err: toml::de::Error) -> Self {
        MindEaseError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MindEaseError {
    fn from(err: toml::ser::Error) -> Self {
        MindEaseError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MindEaseError {
    fn from(err: serde_json::Error) -> Self {
        MindEaseError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for MindEase operations.
pub type Result<T> = std::result::Result<T, MindEaseError>;
