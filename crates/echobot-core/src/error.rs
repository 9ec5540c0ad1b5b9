use thiserror::Error;

/// Top-level error type for Echobot.
///
/// Subsystem crates define their own error types and implement
/// `From<EchobotError>` so configuration failures surface through `?`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EchobotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<toml::de::Error> for EchobotError {
    fn from(err: toml::de::Error) -> Self {
        EchobotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for EchobotError {
    fn from(err: toml::ser::Error) -> Self {
        EchobotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EchobotError {
    fn from(err: serde_json::Error) -> Self {
        EchobotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Echobot operations.
pub type Result<T> = std::result::Result<T, EchobotError>;
