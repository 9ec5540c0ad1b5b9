//! Fuzzy trigger matching shared by the scripted table and the script cache.

use echobot_core::config::MatchingConfig;

use crate::distance::{char_len, levenshtein, within};

/// A trigger key matched by one of the turn's phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    /// The key as stored in its table.
    pub key: String,
    /// The phrase that matched it.
    pub phrase: String,
    /// Edit distance relative to the key length; lower is better.
    pub ratio: f64,
}

/// Personal statements ("I ...") never count as triggers.
pub fn is_self_referential(phrase: &str) -> bool {
    let lower = phrase.to_lowercase();
    lower.starts_with("i ") || lower.contains(" i ")
}

/// Edit-distance matcher with length-relative thresholds.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    phrase_distance_ratio: f64,
    substring_length_ratio: f64,
}

impl FuzzyMatcher {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            phrase_distance_ratio: config.phrase_distance_ratio,
            substring_length_ratio: config.substring_length_ratio,
        }
    }

    /// Whether `phrase` is close enough to `key`, returning the distance.
    ///
    /// Both sides are compared lowercased.
    pub fn accepts(&self, key: &str, phrase: &str) -> Option<usize> {
        let key_lower = key.to_lowercase();
        let phrase_lower = phrase.to_lowercase();
        let phrase_len = char_len(&phrase_lower);
        let distance = levenshtein(&key_lower, &phrase_lower);

        let close = within(distance, phrase_len, self.phrase_distance_ratio);
        let contains = phrase_lower.contains(&key_lower)
            && phrase_len as f64
                <= char_len(&key_lower) as f64 * self.substring_length_ratio + 1e-9;

        (close || contains).then_some(distance)
    }

    /// Best match across every key and phrase, by lowest distance relative
    /// to key length. Ties keep the earliest key, then the earliest phrase.
    pub fn best_match<'a, I>(&self, keys: I, phrases: &[String]) -> Option<FuzzyMatch>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidates: Vec<&String> = phrases
            .iter()
            .filter(|p| !is_self_referential(p))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let mut best: Option<FuzzyMatch> = None;
        for key in keys {
            let key_len = char_len(key);
            if key_len == 0 {
                continue;
            }
            for phrase in &candidates {
                let Some(distance) = self.accepts(key, phrase) else {
                    continue;
                };
                let ratio = distance as f64 / key_len as f64;
                if best.as_ref().map_or(true, |b| ratio < b.ratio) {
                    best = Some(FuzzyMatch {
                        key: key.to_string(),
                        phrase: (*phrase).clone(),
                        ratio,
                    });
                }
            }
        }

        if let Some(ref m) = best {
            tracing::debug!(key = %m.key, phrase = %m.phrase, ratio = m.ratio, "Fuzzy match");
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FuzzyMatcher {
        FuzzyMatcher::new(&MatchingConfig::default())
    }

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const KEYS: [&str; 4] = ["how are you?", "what's up?", "what?", "good-bye"];

    #[test]
    fn test_exact_match_ignores_case() {
        let m = matcher()
            .best_match(KEYS, &phrases(&["How are you?"]))
            .unwrap();
        assert_eq!(m.key, "how are you?");
        assert_eq!(m.phrase, "How are you?");
        assert_eq!(m.ratio, 0.0);
    }

    #[test]
    fn test_typo_tolerated() {
        let m = matcher().best_match(KEYS, &phrases(&["What's up"])).unwrap();
        assert_eq!(m.key, "what's up?");
    }

    #[test]
    fn test_best_ratio_wins_across_phrases() {
        let m = matcher()
            .best_match(KEYS, &phrases(&["Goodbye", "what?"]))
            .unwrap();
        assert_eq!(m.key, "what?");
        assert_eq!(m.phrase, "what?");
    }

    #[test]
    fn test_no_match() {
        assert!(matcher()
            .best_match(KEYS, &phrases(&["The weather is lovely today"]))
            .is_none());
        assert!(matcher().best_match(KEYS, &[]).is_none());
    }

    #[test]
    fn test_self_referential_phrases_skipped() {
        assert!(is_self_referential("I am bored"));
        assert!(is_self_referential("well i think so"));
        assert!(!is_self_referential("I'm bored"));
        assert!(!is_self_referential("Iguanas are cool"));
        assert!(matcher()
            .best_match(["i'm bored"], &phrases(&["I am bored"]))
            .is_none());
    }

    #[test]
    fn test_substring_rule_with_tight_distance() {
        let config = MatchingConfig {
            phrase_distance_ratio: 0.05,
            ..MatchingConfig::default()
        };
        let m = FuzzyMatcher::new(&config);
        // 10 chars containing the 8-char key: within 1.3x.
        assert_eq!(m.accepts("good-bye", "a good-bye"), Some(2));
        // 17 chars: too much longer than the key.
        assert_eq!(m.accepts("good-bye", "good-bye for now!"), None);
    }

    #[test]
    fn test_ties_keep_first_key() {
        let m = matcher()
            .best_match(["see ya", "see yu"], &phrases(&["see yo"]))
            .unwrap();
        assert_eq!(m.key, "see ya");
    }
}
