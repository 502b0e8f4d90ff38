use thiserror::Error;

/// Top-level error type for the Aluna client.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for AlunaError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlunaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Job tracking error: {0}")]
    Job(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AlunaError {
    fn from(err: toml::de::Error) -> Self {
        AlunaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AlunaError {
    fn from(err: toml::ser::Error) -> Self {
        AlunaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AlunaError {
    fn from(err: serde_json::Error) -> Self {
        AlunaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Aluna operations.
pub type Result<T> = std::result::Result<T, AlunaError>;
