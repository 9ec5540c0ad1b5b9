//! Rewrites a remembered user phrase so it reads as the bot's own reply.

use regex::{Captures, Regex};

/// Per-turn adjustments applied by [`EchoAdjuster::adjust`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustOptions {
    /// Swap mentions of the bot and of the user.
    pub swap_names: bool,
    /// Insert "too" after the last "you".
    pub you_too: bool,
}

impl Default for AdjustOptions {
    fn default() -> Self {
        Self {
            swap_names: true,
            you_too: false,
        }
    }
}

/// Name swapping and "you too" insertion.
#[derive(Debug, Clone)]
pub struct EchoAdjuster {
    bot_name: String,
}

impl EchoAdjuster {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Apply the enabled adjustments to `phrase` for a conversation with
    /// `user`.
    pub fn adjust(&self, phrase: &str, user: &str, options: AdjustOptions) -> String {
        let mut adjusted = if options.swap_names {
            self.swap_names(phrase, user)
        } else {
            phrase.to_string()
        };
        if options.you_too {
            adjusted = add_you_too(&adjusted);
        }
        adjusted
    }

    /// Replace the user's name with the bot's and the bot's (either case)
    /// with the user's in a single pass, so a substituted name is never
    /// substituted again. Without a user name the phrase is left as is.
    pub fn swap_names(&self, phrase: &str, user: &str) -> String {
        if user.is_empty() {
            return phrase.to_string();
        }
        let bot_lower = self.bot_name.to_lowercase();
        let mut alternatives = vec![regex::escape(user), regex::escape(&self.bot_name)];
        if bot_lower != self.bot_name {
            alternatives.push(regex::escape(&bot_lower));
        }

        let re = match Regex::new(&alternatives.join("|")) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(error = %e, "Name swap pattern rejected; leaving phrase as is");
                return phrase.to_string();
            }
        };

        re.replace_all(phrase, |caps: &Captures| {
            if &caps[0] == user {
                self.bot_name.clone()
            } else {
                user.to_string()
            }
        })
        .into_owned()
    }
}

/// Whether the phrase ends near a "you" and is not a question, so that
/// "... you too" reads naturally.
pub fn can_add_you_too(phrase: &str) -> bool {
    match phrase.rfind("you") {
        Some(idx) => idx > 0 && idx + 4 >= phrase.len() && !phrase.ends_with('?'),
        None => false,
    }
}

/// Insert " too" right after the last "you". Phrases without one are
/// returned unchanged.
pub fn add_you_too(phrase: &str) -> String {
    match phrase.rfind("you") {
        Some(idx) => {
            let split = idx + "you".len();
            format!("{} too{}", &phrase[..split], &phrase[split..])
        }
        None => phrase.to_string(),
    }
}

/// Upper-case the first character.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("psst, bart"), "Psst, bart");
        assert_eq!(capitalize_first("\u{00e9}t\u{00e9}"), "\u{00c9}t\u{00e9}");
        assert_eq!(capitalize_first("Already"), "Already");
        assert_eq!(capitalize_first(""), "");
    }

    fn adjuster() -> EchoAdjuster {
        EchoAdjuster::new("Bot")
    }

    #[test]
    fn test_can_add_you_too() {
        assert!(can_add_you_too("I like talking to you"));
        assert!(can_add_you_too("I missed you."));
        assert!(!can_add_you_too("are you OK?"));
        assert!(!can_add_you_too("you rock, definitely"));
        assert!(!can_add_you_too("no pronoun here"));
        assert!(!can_add_you_too("you"));
    }

    #[test]
    fn test_you_too_insertion() {
        let out = adjuster().adjust(
            "I like talking to you",
            "bart",
            AdjustOptions {
                swap_names: true,
                you_too: true,
            },
        );
        assert_eq!(out, "I like talking to you too");
        assert_eq!(add_you_too("I missed you."), "I missed you too.");
    }

    #[test]
    fn test_bot_mentions_become_user() {
        let a = adjuster();
        assert_eq!(a.swap_names("the Bot is cool", "bart"), "the bart is cool");
        assert_eq!(
            a.swap_names("bot you're the best", "bart"),
            "bart you're the best"
        );
    }

    #[test]
    fn test_user_mentions_become_bot() {
        assert_eq!(
            adjuster().swap_names("My name is bart", "bart"),
            "My name is Bot"
        );
    }

    #[test]
    fn test_swap_does_not_cascade() {
        let a = adjuster();
        assert_eq!(a.swap_names("bart and Bot", "bart"), "Bot and bart");
        // The user's name contains the bot's name.
        assert_eq!(
            a.swap_names("Hi Botticelli, said the bot", "Botticelli"),
            "Hi Bot, said the Botticelli"
        );
    }

    #[test]
    fn test_swap_disabled() {
        let out = adjuster().adjust(
            "the Bot is cool",
            "bart",
            AdjustOptions {
                swap_names: false,
                you_too: false,
            },
        );
        assert_eq!(out, "the Bot is cool");
    }

    #[test]
    fn test_empty_user_name() {
        assert_eq!(adjuster().swap_names("hey bot", ""), "hey bot");
    }

    #[test]
    fn test_regex_metacharacters_in_names() {
        assert_eq!(
            adjuster().swap_names("a.b? likes Bot", "a.b?"),
            "Bot likes a.b?"
        );
    }
}
