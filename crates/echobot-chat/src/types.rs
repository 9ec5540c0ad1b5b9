//! Shared types passed between the orchestrator and the reply engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of the author of a [`ChatMessage`].
pub const ROLE_USER: &str = "user";
pub const ROLE_BOT: &str = "bot";

/// What the caller knows about the conversation when a message arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    /// Messages in the conversation, including the one being answered.
    pub message_count: usize,
    /// Display name of the user the bot is talking to.
    pub user_name: String,
}

impl TurnContext {
    pub fn new(message_count: usize, user_name: impl Into<String>) -> Self {
        Self {
            message_count,
            user_name: user_name.into(),
        }
    }

    pub fn phase(&self) -> ConversationPhase {
        ConversationPhase::from_message_count(self.message_count)
    }
}

/// Lifecycle of a bot conversation. Once warm it never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    /// No reply given yet; the next reply is the greeting.
    Fresh,
    /// Past the greeting.
    Warm,
}

impl ConversationPhase {
    pub fn from_message_count(count: usize) -> Self {
        if count <= 1 {
            Self::Fresh
        } else {
            Self::Warm
        }
    }
}

/// One message in a conversation's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    pub content: String,
    /// Unix epoch seconds.
    pub created_at: i64,
}

/// Listing entry for an open conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub user_name: String,
    /// RFC 3339 timestamp.
    pub started_at: String,
    /// RFC 3339 timestamp.
    pub last_message_at: String,
    pub message_count: usize,
}
