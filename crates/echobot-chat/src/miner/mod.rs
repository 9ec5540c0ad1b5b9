//! Best-effort reply mining from movie and TV transcripts on the web.
//!
//! For a phrase the bot has no scripted answer to, the miner searches for
//! transcripts containing it, finds the phrase in each transcript and keeps
//! the line that follows as a candidate reply. Failures are logged and
//! treated as "nothing found"; mining never fails a turn.

pub mod fetcher;
pub mod search;
pub mod transcript;

use std::collections::HashMap;
use std::sync::Arc;

use echobot_core::config::MinerConfig;

use crate::distance::char_len;
use crate::miner::fetcher::PageFetcher;
use crate::miner::search::{
    build_search_url, extract_transcript_links, transcript_hosts, TranscriptLink,
};
use crate::miner::transcript::{extract_reply, merge_sentences, split_lines, TranscriptStyle};

pub use fetcher::{HttpFetcher, NoopFetcher, StaticFetcher};

/// Mined phrase → candidate replies, in the order phrases were mined.
#[derive(Debug, Clone, Default)]
pub struct ScriptCache {
    entries: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty entry for `phrase` if there is none.
    pub fn ensure(&mut self, phrase: &str) {
        if !self.entries.contains_key(phrase) {
            self.entries.insert(phrase.to_string(), Vec::new());
            self.order.push(phrase.to_string());
        }
    }

    pub fn push(&mut self, phrase: &str, reply: String) {
        self.ensure(phrase);
        if let Some(candidates) = self.entries.get_mut(phrase) {
            candidates.push(reply);
        }
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.entries.contains_key(phrase)
    }

    /// Candidate replies for `phrase`; empty if none were found.
    pub fn candidates(&self, phrase: &str) -> &[String] {
        self.entries.get(phrase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mined phrases that have at least one candidate, oldest first.
    pub fn keys_with_candidates(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(|k| !self.candidates(k).is_empty())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Searches transcripts for the turn's phrases and caches what follows them.
pub struct ScriptMiner {
    config: MinerConfig,
    phrase_distance_ratio: f64,
    hosts: Vec<(String, TranscriptStyle)>,
    fetcher: Arc<dyn PageFetcher>,
    cache: ScriptCache,
}

impl ScriptMiner {
    pub fn new(config: MinerConfig, phrase_distance_ratio: f64, fetcher: Arc<dyn PageFetcher>) -> Self {
        let hosts = transcript_hosts(&config);
        Self {
            config,
            phrase_distance_ratio,
            hosts,
            fetcher,
            cache: ScriptCache::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    /// Mine every phrase long enough to be worth searching for.
    ///
    /// Returns the last phrase that gained candidates this turn, if any.
    /// Phrases that were already mined in an earlier turn are skipped.
    pub async fn mine(&mut self, phrases: &[String]) -> Option<String> {
        if !self.config.enabled {
            return None;
        }

        let mut matched = None;
        for phrase in phrases {
            if char_len(phrase) < self.config.min_phrase_chars || self.cache.contains(phrase) {
                continue;
            }

            let links = self.search(phrase).await;
            if links.is_empty() {
                tracing::debug!(phrase = %phrase, "No transcript links found");
                continue;
            }

            self.cache.ensure(phrase);
            for link in &links {
                if let Some(reply) = self.mine_link(phrase, link).await {
                    tracing::info!(phrase = %phrase, url = %link.url, reply = %reply, "Mined reply");
                    self.cache.push(phrase, reply);
                }
            }

            if !self.cache.candidates(phrase).is_empty() {
                matched = Some(phrase.clone());
            }
        }
        matched
    }

    async fn search(&self, phrase: &str) -> Vec<TranscriptLink> {
        let url = match build_search_url(&self.config, phrase) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build search url");
                return Vec::new();
            }
        };
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Search fetch failed");
                return Vec::new();
            }
        };
        match extract_transcript_links(&page, &url, &self.hosts, self.config.max_links_per_phrase) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not read search results");
                Vec::new()
            }
        }
    }

    async fn mine_link(&self, phrase: &str, link: &TranscriptLink) -> Option<String> {
        let page = match self.fetcher.fetch(&link.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %link.url, error = %e, "Transcript fetch failed");
                return None;
            }
        };
        let raw = match split_lines(&page, link.style) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(url = %link.url, error = %e, "Could not read transcript");
                return None;
            }
        };
        let lines = merge_sentences(&raw, link.style);
        extract_reply(
            &lines,
            phrase,
            self.config.lookahead_lines,
            self.phrase_distance_ratio,
        )
    }
}
