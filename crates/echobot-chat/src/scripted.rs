//! Canned replies keyed by trigger phrase.

/// Trigger whose reply is answered by the acknowledgment on the next turn.
pub const HOW_ARE_YOU: &str = "how are you?";

/// Fixed trigger → reply table, seeded once with the user's name.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTable {
    entries: Vec<(String, String)>,
}

impl ScriptedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the table for `user`. Does nothing if already populated.
    pub fn seed(&mut self, user: &str) {
        if !self.entries.is_empty() {
            return;
        }
        let hanging_out = "Just hanging out! What about you?".to_string();
        let bye = format!("Bye {}!", user);
        let hobbies = "Sleeping, reading, chatting with cool kids like you, etc.".to_string();
        let forgetful = "Whoops, sorry - I'm forgetful like that!".to_string();

        let entries = [
            (HOW_ARE_YOU, format!("I'm good, {}, thanks. How are you?", user)),
            ("what's up?", hanging_out.clone()),
            ("what are you doing?", hanging_out),
            ("it's nice to meet you!", format!("It's nice to meet you too, {}", user)),
            ("it's great to meet you!", format!("It's great to meet you too, {}", user)),
            (
                "it's a pleasure to meet you!",
                format!("It's a pleasure to meet you too, {}", user),
            ),
            ("good-bye", bye.clone()),
            ("see ya", bye),
            ("i'm bored", "Yeah, me too".to_string()),
            ("what?", "What do you mean, 'What?'".to_string()),
            ("how's life?", "Oh, you know. Same old".to_string()),
            ("what are your hobbies?", hobbies.clone()),
            ("what do you like to do?", hobbies),
            ("you said that already", forgetful.clone()),
            ("you already told me", forgetful),
            (
                "what are you talking about?",
                "Huh? What are YOU talking about?".to_string(),
            ),
            (
                "that was random",
                "Yeah, sorry...I'm kind of random sometimes".to_string(),
            ),
        ];
        self.entries = entries
            .into_iter()
            .map(|(trigger, reply)| (trigger.to_string(), reply))
            .collect();
    }

    pub fn is_seeded(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Reply for an exact (lowercase) trigger.
    pub fn lookup(&self, trigger: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == trigger)
            .map(|(_, reply)| reply.as_str())
    }

    /// The reply given to "how are you?", if seeded.
    pub fn how_are_you_reply(&self) -> Option<&str> {
        self.lookup(HOW_ARE_YOU)
    }

    /// Triggers in table order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}
