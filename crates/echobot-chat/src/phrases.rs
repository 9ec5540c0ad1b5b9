//! Phrase memory.
//!
//! Remembers every distinct phrase the user has sent and, for each reply the
//! bot has given, the phrases the user sent right after it.

use std::collections::{HashMap, HashSet};

use echobot_core::config::MatchingConfig;

use crate::distance::{char_len, levenshtein, within};

/// Sentence terminators a message is split on.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Split a message after each `.`, `!` or `?`, trim the pieces and drop any
/// of one character or less. Duplicates keep their first position.
pub fn split_sentences(message: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, ch) in message.char_indices() {
        if TERMINATORS.contains(&ch) {
            let end = idx + ch.len_utf8();
            pieces.push(&message[start..end]);
            start = end;
        }
    }
    pieces.push(&message[start..]);

    let mut sentences: Vec<String> = Vec::new();
    for piece in pieces {
        let trimmed = piece.trim();
        if char_len(trimmed) > 1 && !sentences.iter().any(|s| s == trimmed) {
            sentences.push(trimmed.to_string());
        }
    }
    sentences
}

/// Insertion-ordered phrase memory plus the reply → follow-up map.
#[derive(Debug, Clone)]
pub struct PhraseStore {
    phrases: Vec<String>,
    seen: HashSet<String>,
    followups: HashMap<String, Vec<String>>,
    greeting_trigger: String,
    greeting_distance_ratio: f64,
}

impl PhraseStore {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            phrases: Vec::new(),
            seen: HashSet::new(),
            followups: HashMap::new(),
            greeting_trigger: config.greeting_trigger.clone(),
            greeting_distance_ratio: config.greeting_distance_ratio,
        }
    }

    /// Split `message` into phrases and remember the ones worth reusing.
    ///
    /// Greetings are never stored. Every other phrase is added to memory
    /// unless it (or a punctuated variant) is already there, and is appended
    /// to the follow-ups of `last_response` whether new or not. Returns all
    /// sentences of the message, greetings included.
    pub fn extract_phrases(&mut self, message: &str, last_response: &str) -> Vec<String> {
        let sentences = split_sentences(message);

        for phrase in &sentences {
            if self.is_greeting(phrase) {
                continue;
            }
            if !self.has_punctuated_variant(phrase) && self.seen.insert(phrase.clone()) {
                self.phrases.push(phrase.clone());
            }
            if !last_response.is_empty() {
                self.followups
                    .entry(last_response.to_string())
                    .or_default()
                    .push(phrase.clone());
            }
        }

        sentences
    }

    /// Make sure `response` has a follow-up entry, empty if new.
    pub fn record_response(&mut self, response: &str) {
        if !response.is_empty() && !self.followups.contains_key(response) {
            self.followups.insert(response.to_string(), Vec::new());
        }
    }

    /// Whether `phrase` reads as a greeting and should not be remembered.
    pub fn is_greeting(&self, phrase: &str) -> bool {
        let distance = levenshtein(phrase, &self.greeting_trigger);
        within(distance, char_len(phrase), self.greeting_distance_ratio)
            || phrase.contains("hello")
            || phrase.contains("Hello")
    }

    /// Whether the same phrase was already seen with or without a terminator.
    fn has_punctuated_variant(&self, phrase: &str) -> bool {
        let bare = phrase.trim_end_matches(TERMINATORS);
        (bare != phrase && self.seen.contains(bare))
            || TERMINATORS
                .iter()
                .any(|t| self.seen.contains(&format!("{}{}", phrase, t)))
    }

    /// The most recently added phrase.
    pub fn most_recent(&self) -> Option<&str> {
        self.phrases.last().map(String::as_str)
    }

    /// All remembered phrases in the order they were first seen.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.seen.contains(phrase)
    }

    /// Phrases the user sent right after the bot said `response`, or `None`
    /// if the bot never said it.
    pub fn followups(&self, response: &str) -> Option<&[String]> {
        self.followups.get(response).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PhraseStore {
        PhraseStore::new(&MatchingConfig::default())
    }

    #[test]
    fn test_split_keeps_terminators() {
        assert_eq!(
            split_sentences("Hi there. How is it going? Great!"),
            vec!["Hi there.", "How is it going?", "Great!"]
        );
    }

    #[test]
    fn test_split_drops_short_pieces_and_duplicates() {
        assert_eq!(split_sentences("Wait... ok. ok."), vec!["Wait.", "ok."]);
        assert!(split_sentences("a").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_split_without_terminator() {
        assert_eq!(split_sentences("  just words  "), vec!["just words"]);
    }

    #[test]
    fn test_greetings_are_not_remembered() {
        let mut s = store();
        let sentences = s.extract_phrases("How are you? Hello friend. I like pizza.", "");
        assert_eq!(sentences.len(), 3);
        assert_eq!(s.phrases(), &["I like pizza.".to_string()]);
        assert!(s.is_greeting("how are u?"));
        assert!(!s.is_greeting("I like talking to you"));
    }

    #[test]
    fn test_punctuated_duplicates_are_skipped() {
        let mut s = store();
        s.extract_phrases("I like pizza.", "");
        s.extract_phrases("I like pizza", "");
        s.extract_phrases("I like pizza.", "");
        assert_eq!(s.len(), 1);
        assert_eq!(s.most_recent(), Some("I like pizza."));
    }

    #[test]
    fn test_bare_phrase_blocks_punctuated_repeat() {
        let mut s = store();
        s.extract_phrases("I like pizza", "");
        s.extract_phrases("I like pizza.", "");
        s.extract_phrases("I like pizza!", "");
        assert_eq!(s.phrases(), &["I like pizza".to_string()]);
    }

    #[test]
    fn test_followups_record_every_phrase_after_response() {
        let mut s = store();
        s.record_response("Hey bart! I'm the Bot :P");
        s.extract_phrases("I like pizza. Do you?", "Hey bart! I'm the Bot :P");
        s.extract_phrases("I like pizza.", "Hey bart! I'm the Bot :P");
        assert_eq!(
            s.followups("Hey bart! I'm the Bot :P").unwrap(),
            &["I like pizza.", "Do you?", "I like pizza."]
        );
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_no_followups_without_last_response() {
        let mut s = store();
        s.extract_phrases("I like pizza.", "");
        assert!(s.followups("").is_none());
    }

    #[test]
    fn test_record_response_is_idempotent() {
        let mut s = store();
        s.record_response("Yeah, me too");
        s.extract_phrases("Nice one.", "Yeah, me too");
        s.record_response("Yeah, me too");
        assert_eq!(s.followups("Yeah, me too").unwrap().len(), 1);
        s.record_response("");
        assert!(s.followups("").is_none());
    }
}
