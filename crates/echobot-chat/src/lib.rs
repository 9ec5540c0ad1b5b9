//! Reply engine for the echobot chat bot.
//!
//! Remembers what the user says, answers a small set of canned prompts,
//! borrows replies from movie and TV transcripts found on the web, and
//! otherwise echoes the user's own phrases back with the names swapped.

pub mod distance;
pub mod echo;
pub mod error;
pub mod matching;
pub mod miner;
pub mod orchestrator;
pub mod phrases;
pub mod scripted;
pub mod selector;
pub mod types;

pub use distance::{checked_levenshtein, levenshtein};
pub use echo::{can_add_you_too, AdjustOptions, EchoAdjuster};
pub use error::BotError;
pub use matching::{FuzzyMatch, FuzzyMatcher};
pub use miner::fetcher::PageFetcher;
pub use miner::{HttpFetcher, NoopFetcher, ScriptCache, ScriptMiner, StaticFetcher};
pub use orchestrator::BotOrchestrator;
pub use phrases::PhraseStore;
pub use scripted::ScriptedTable;
pub use selector::{BotConversation, ACKNOWLEDGMENT, FILLER};
pub use types::{ChatMessage, ConversationPhase, ConversationSummary, TurnContext};
