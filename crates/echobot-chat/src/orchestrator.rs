//! Bot orchestrator: owns the open conversations and routes messages to them.
//!
//! Each conversation has its own reply engine behind an async mutex, so turns
//! within a conversation run one at a time while separate conversations
//! proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use echobot_core::EchobotConfig;

use crate::error::BotError;
use crate::miner::fetcher::{HttpFetcher, NoopFetcher, PageFetcher};
use crate::selector::BotConversation;
use crate::types::{ChatMessage, ConversationSummary, TurnContext, ROLE_BOT, ROLE_USER};

struct ConversationEntry {
    title: String,
    user_name: String,
    started_at: i64,
    last_message_at: i64,
    message_count: usize,
    engine: Arc<AsyncMutex<BotConversation>>,
}

/// Coordinates bot conversations and their message history.
pub struct BotOrchestrator {
    config: EchobotConfig,
    fetcher: Arc<dyn PageFetcher>,
    conversations: Mutex<HashMap<Uuid, ConversationEntry>>,
    messages: Mutex<HashMap<Uuid, Vec<ChatMessage>>>,
}

impl BotOrchestrator {
    /// Create an orchestrator that fetches over HTTP when mining is enabled.
    pub fn new(config: EchobotConfig) -> Result<Self, BotError> {
        let fetcher: Arc<dyn PageFetcher> = if config.miner.enabled {
            Arc::new(HttpFetcher::new(&config.miner)?)
        } else {
            Arc::new(NoopFetcher)
        };
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Create an orchestrator with a custom page fetcher.
    pub fn with_fetcher(config: EchobotConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config,
            fetcher,
            conversations: Mutex::new(HashMap::new()),
            messages: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EchobotConfig {
        &self.config
    }

    /// Whether `title` names the designated bot conversation.
    pub fn is_bot_conversation(&self, title: &str) -> bool {
        title == self.config.bot.conversation_title
    }

    /// Open a new bot conversation with `user_name`.
    pub fn open_conversation(&self, user_name: &str) -> Result<Uuid, BotError> {
        if user_name.trim().is_empty() {
            return Err(BotError::InvalidArgument(
                "user name must not be blank".to_string(),
            ));
        }
        let id = Uuid::new_v4();
        let now = Local::now().timestamp();
        let entry = ConversationEntry {
            title: self.config.bot.conversation_title.clone(),
            user_name: user_name.to_string(),
            started_at: now,
            last_message_at: now,
            message_count: 0,
            engine: Arc::new(AsyncMutex::new(BotConversation::new(
                &self.config,
                Arc::clone(&self.fetcher),
            ))),
        };

        self.lock_conversations()?.insert(id, entry);
        self.lock_messages()?.insert(id, Vec::new());
        tracing::info!(conversation_id = %id, user = %user_name, "Conversation opened");
        Ok(id)
    }

    /// Handle a user message and return the bot's reply.
    ///
    /// The user message is added to the history before the reply is chosen,
    /// so the first message of a conversation is answered with a count of 1.
    pub async fn handle_message(
        &self,
        conversation_id: Uuid,
        text: &str,
    ) -> Result<String, BotError> {
        if !self.config.bot.enabled {
            return Err(BotError::Disabled);
        }
        if text.trim().is_empty() {
            return Err(BotError::EmptyMessage);
        }
        let max = self.config.bot.max_message_length;
        if text.chars().count() > max {
            return Err(BotError::MessageTooLong(max));
        }

        let engine = {
            let conversations = self.lock_conversations()?;
            let entry = conversations
                .get(&conversation_id)
                .ok_or(BotError::SessionNotFound(conversation_id))?;
            Arc::clone(&entry.engine)
        };

        let mut engine = engine.lock().await;
        let ctx = self.append_message(conversation_id, ROLE_USER, text)?;
        let reply = engine.produce_reply(text, &ctx).await;
        self.append_message(conversation_id, ROLE_BOT, &reply)?;

        tracing::debug!(
            conversation_id = %conversation_id,
            message_count = ctx.message_count,
            "Reply sent"
        );
        Ok(reply)
    }

    /// Message history of a conversation, oldest first.
    pub fn get_history(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>, BotError> {
        if !self.lock_conversations()?.contains_key(&conversation_id) {
            return Err(BotError::SessionNotFound(conversation_id));
        }
        Ok(self
            .lock_messages()?
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Summaries of every open conversation, oldest first.
    pub fn list_conversations(&self) -> Vec<ConversationSummary> {
        let conversations = match self.conversations.lock() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut summaries: Vec<(i64, ConversationSummary)> = conversations
            .iter()
            .map(|(id, c)| {
                (
                    c.started_at,
                    ConversationSummary {
                        id: *id,
                        title: c.title.clone(),
                        user_name: c.user_name.clone(),
                        started_at: format_epoch(c.started_at),
                        last_message_at: format_epoch(c.last_message_at),
                        message_count: c.message_count,
                    },
                )
            })
            .collect();
        summaries.sort_by_key(|(started, _)| *started);
        summaries.into_iter().map(|(_, s)| s).collect()
    }

    /// Close a conversation and drop its history and memory.
    pub fn close_conversation(&self, conversation_id: Uuid) -> Result<(), BotError> {
        let mut conversations = self.lock_conversations()?;
        if conversations.remove(&conversation_id).is_some() {
            if let Ok(mut msgs) = self.messages.lock() {
                msgs.remove(&conversation_id);
            }
            tracing::info!(conversation_id = %conversation_id, "Conversation closed");
            Ok(())
        } else {
            Err(BotError::SessionNotFound(conversation_id))
        }
    }

    // -- Private helpers --

    /// Record a message and return the context as of that message.
    fn append_message(
        &self,
        conversation_id: Uuid,
        role: &str,
        content: &str,
    ) -> Result<TurnContext, BotError> {
        let now = Local::now().timestamp();
        let ctx = {
            let mut conversations = self.lock_conversations()?;
            let entry = conversations
                .get_mut(&conversation_id)
                .ok_or(BotError::SessionNotFound(conversation_id))?;
            entry.message_count += 1;
            entry.last_message_at = now;
            TurnContext::new(entry.message_count, entry.user_name.clone())
        };

        self.lock_messages()?
            .entry(conversation_id)
            .or_default()
            .push(ChatMessage {
                id: Uuid::new_v4(),
                conversation_id,
                role: role.to_string(),
                content: content.to_string(),
                created_at: now,
            });
        Ok(ctx)
    }

    fn lock_conversations(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, ConversationEntry>>, BotError> {
        self.conversations
            .lock()
            .map_err(|e| BotError::State(format!("conversation lock poisoned: {}", e)))
    }

    fn lock_messages(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Vec<ChatMessage>>>, BotError> {
        self.messages
            .lock()
            .map_err(|e| BotError::State(format!("messages lock poisoned: {}", e)))
    }
}

/// Format epoch seconds as an RFC 3339 string.
fn format_epoch(epoch: i64) -> String {
    chrono::Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

// =============================================================================
// Tests
// =============================================================================
