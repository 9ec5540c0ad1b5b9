//! Per-turn reply selection.
//!
//! A `BotConversation` holds everything the bot remembers about one
//! conversation and picks each reply by trying a fixed sequence of
//! strategies: greeting, acknowledgment, scripted reply, mined reply, "you
//! too" echo, filler, and finally a remembered phrase echoed back.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use echobot_core::EchobotConfig;

use crate::echo::{can_add_you_too, capitalize_first, AdjustOptions, EchoAdjuster};
use crate::matching::FuzzyMatcher;
use crate::miner::fetcher::PageFetcher;
use crate::miner::{ScriptCache, ScriptMiner};
use crate::phrases::PhraseStore;
use crate::scripted::ScriptedTable;
use crate::types::{ConversationPhase, TurnContext};

/// Reply to the user's answer after the bot asked how they are.
pub const ACKNOWLEDGMENT: &str = "Cool, that's good to hear";

/// Reply when there is not enough material to echo.
pub const FILLER: &str = "C'mon, send something original!";

/// First reply of every conversation.
pub fn greeting(user: &str, bot_name: &str) -> String {
    format!("Hey {}! I'm the {} :P", user, bot_name)
}

/// Conversation state and the reply strategies that read and update it.
pub struct BotConversation {
    phrases: PhraseStore,
    scripted: ScriptedTable,
    miner: ScriptMiner,
    adjuster: EchoAdjuster,
    matcher: FuzzyMatcher,
    rng: StdRng,
    options: AdjustOptions,
    last_response: String,
    matched_phrase: Option<String>,
}

impl BotConversation {
    pub fn new(config: &EchobotConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let rng = match config.bot.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            phrases: PhraseStore::new(&config.matching),
            scripted: ScriptedTable::new(),
            miner: ScriptMiner::new(
                config.miner.clone(),
                config.matching.phrase_distance_ratio,
                fetcher,
            ),
            adjuster: EchoAdjuster::new(config.bot.bot_name.clone()),
            matcher: FuzzyMatcher::new(&config.matching),
            rng,
            options: AdjustOptions::default(),
            last_response: String::new(),
            matched_phrase: None,
        }
    }

    /// Pick the reply to `body`. Never fails; the worst case is [`FILLER`].
    pub async fn produce_reply(&mut self, body: &str, ctx: &TurnContext) -> String {
        self.options = AdjustOptions::default();
        self.matched_phrase = None;
        self.scripted.seed(&ctx.user_name);

        let turn_phrases = self.phrases.extract_phrases(body, &self.last_response);

        let reply = if ctx.phase() == ConversationPhase::Fresh {
            tracing::debug!("Greeting");
            greeting(&ctx.user_name, self.adjuster.bot_name())
        } else if self.scripted.how_are_you_reply() == Some(self.last_response.as_str()) {
            tracing::debug!("Acknowledging");
            ACKNOWLEDGMENT.to_string()
        } else if let Some(reply) = self.scripted_reply(&turn_phrases) {
            reply
        } else if let Some(reply) = self.mined_reply(&turn_phrases).await {
            reply
        } else if let Some(reply) = self.you_too_reply(&ctx.user_name) {
            reply
        } else if self.wants_filler(ctx.message_count) {
            tracing::debug!(memory = self.phrases.len(), "Filler");
            FILLER.to_string()
        } else {
            self.echo_reply(&turn_phrases, &ctx.user_name)
        };

        let reply = capitalize_first(&reply);
        self.phrases.record_response(&reply);
        self.last_response = reply.clone();
        reply
    }

    fn scripted_reply(&mut self, turn_phrases: &[String]) -> Option<String> {
        let hit = self
            .matcher
            .best_match(self.scripted.triggers(), turn_phrases)?;
        tracing::debug!(trigger = %hit.key, phrase = %hit.phrase, "Scripted reply");
        let reply = self.scripted.lookup(&hit.key).map(str::to_string)?;
        self.matched_phrase = Some(hit.phrase);
        Some(reply)
    }

    /// Answer from the script cache, mining the web first if nothing cached
    /// matches.
    async fn mined_reply(&mut self, turn_phrases: &[String]) -> Option<String> {
        let cached = self
            .matcher
            .best_match(self.miner.cache().keys_with_candidates(), turn_phrases)
            .map(|hit| hit.key);

        let key = match cached {
            Some(key) => {
                tracing::debug!(phrase = %key, "Script cache hit");
                key
            }
            None => self.miner.mine(turn_phrases).await?,
        };

        let candidates = self.miner.cache().candidates(&key);
        if candidates.is_empty() {
            return None;
        }
        let reply = candidates[self.rng.random_range(0..candidates.len())].clone();
        self.matched_phrase = Some(key);
        Some(reply)
    }

    fn you_too_reply(&mut self, user: &str) -> Option<String> {
        let recent = self.phrases.most_recent()?;
        if recent == self.last_response || !can_add_you_too(recent) {
            return None;
        }
        let options = AdjustOptions {
            you_too: true,
            ..self.options
        };
        let reply = self.adjuster.adjust(recent, user, options);
        if capitalize_first(&reply) == self.last_response {
            return None;
        }
        tracing::debug!(phrase = %recent, "You-too echo");
        self.options = options;
        Some(reply)
    }

    fn wants_filler(&self, message_count: usize) -> bool {
        let remembered = self.phrases.len();
        remembered <= 1 || (message_count > 4 && remembered == 2)
    }

    /// Echo something the user said before: a phrase they sent after the bot
    /// last said one of this turn's phrases, or else any remembered phrase
    /// that neither repeats this turn nor the previous reply.
    fn echo_reply(&mut self, turn_phrases: &[String], user: &str) -> String {
        let mapped = turn_phrases
            .iter()
            .filter_map(|p| self.phrases.followups(p))
            .find(|followups| !followups.is_empty());
        if let Some(followups) = mapped {
            let pick = &followups[self.rng.random_range(0..followups.len())];
            tracing::debug!(phrase = %pick, "Mapped follow-up");
            return self.adjuster.adjust(pick, user, self.options);
        }

        let candidates: Vec<String> = self
            .phrases
            .phrases()
            .iter()
            .filter(|p| !turn_phrases.contains(p) && **p != self.last_response)
            .map(|p| self.adjuster.adjust(p, user, self.options))
            .filter(|adjusted| capitalize_first(adjusted) != self.last_response)
            .collect();
        if candidates.is_empty() {
            tracing::debug!("Nothing left to echo");
            return FILLER.to_string();
        }
        candidates[self.rng.random_range(0..candidates.len())].clone()
    }

    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    /// Phrase behind the current reply: the user's phrase that hit a scripted
    /// trigger, or the cached transcript phrase a mined reply came from.
    pub fn matched_phrase(&self) -> Option<&str> {
        self.matched_phrase.as_deref()
    }

    pub fn phrase_store(&self) -> &PhraseStore {
        &self.phrases
    }

    pub fn script_cache(&self) -> &ScriptCache {
        self.miner.cache()
    }
}
