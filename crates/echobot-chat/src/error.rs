//! Error types for the reply engine.

use echobot_core::error::EchobotError;

/// Errors from the chat engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("bot is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("conversation not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("conversation state error: {0}")]
    State(String),
}

impl From<EchobotError> for BotError {
    fn from(err: EchobotError) -> Self {
        match err {
            EchobotError::InvalidArgument(msg) => BotError::InvalidArgument(msg),
            other => BotError::Config(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Fetch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_bot_error_display() {
        assert_eq!(BotError::Disabled.to_string(), "bot is disabled");
        assert_eq!(BotError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            BotError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            BotError::InvalidArgument("strings must not be null".to_string()).to_string(),
            "invalid argument: strings must not be null"
        );
        assert_eq!(
            BotError::Fetch("timed out".to_string()).to_string(),
            "fetch error: timed out"
        );
        assert_eq!(
            BotError::Parse("bad selector".to_string()).to_string(),
            "parse error: bad selector"
        );
        assert_eq!(
            BotError::State("lock poisoned".to_string()).to_string(),
            "conversation state error: lock poisoned"
        );
    }

    #[test]
    fn test_session_not_found_preserves_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            BotError::SessionNotFound(id).to_string(),
            "conversation not found: 550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_from_echobot_error() {
        let err: BotError = EchobotError::Config("missing field".to_string()).into();
        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().contains("missing field"));

        let err: BotError = EchobotError::InvalidArgument("null".to_string()).into();
        assert!(matches!(err, BotError::InvalidArgument(_)));
    }
}
