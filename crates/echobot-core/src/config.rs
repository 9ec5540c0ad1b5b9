use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EchobotError, Result};

/// Top-level configuration for Echobot.
///
/// Loaded from `~/.echobot/config.toml` by default. Every section falls back
/// to its defaults when missing, so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchobotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

impl Default for EchobotConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            bot: BotConfig::default(),
            matching: MatchingConfig::default(),
            miner: MinerConfig::default(),
        }
    }
}

impl EchobotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EchobotConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| EchobotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.bot.bot_name.trim().is_empty() {
            return Err(EchobotError::Config("bot.bot_name must not be empty".into()));
        }
        if self.bot.max_message_length == 0 {
            return Err(EchobotError::Config(
                "bot.max_message_length must be positive".into(),
            ));
        }
        let ratios = [
            ("matching.phrase_distance_ratio", self.matching.phrase_distance_ratio),
            ("matching.substring_length_ratio", self.matching.substring_length_ratio),
            ("matching.greeting_distance_ratio", self.matching.greeting_distance_ratio),
        ];
        for (name, value) in ratios {
            if !(value.is_finite() && value > 0.0) {
                return Err(EchobotError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.miner.enabled && self.miner.timeout_secs == 0 {
            return Err(EchobotError::Config(
                "miner.timeout_secs must be positive when mining is enabled".into(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Bot identity and conversation gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Whether the bot answers at all.
    pub enabled: bool,
    /// Display name the bot uses and swaps with the user's name.
    pub bot_name: String,
    /// Title of the designated bot conversation.
    pub conversation_title: String,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
    /// Seed for reply selection. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_name: "Bot".to_string(),
            conversation_title: "Convo with Bot".to_string(),
            max_message_length: 2000,
            rng_seed: None,
        }
    }
}

/// Fuzzy-match thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// A trigger matches when `distance <= len(phrase) * ratio`.
    pub phrase_distance_ratio: f64,
    /// A phrase containing the trigger matches when it is at most this many
    /// times as long as the trigger.
    pub substring_length_ratio: f64,
    /// Phrases within `len(phrase) * ratio` of the greeting trigger are not
    /// remembered.
    pub greeting_distance_ratio: f64,
    /// Canonical greeting used by the phrase memory filter.
    pub greeting_trigger: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            phrase_distance_ratio: 1.0 / 3.0,
            substring_length_ratio: 1.3,
            greeting_distance_ratio: 0.5,
            greeting_trigger: "How are you?".to_string(),
        }
    }
}

/// Web script mining.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Whether to search the web when nothing scripted matches.
    pub enabled: bool,
    /// Search endpoint; the query goes in the `q` parameter.
    pub search_url: String,
    /// Appended to every query to bias results toward transcripts.
    pub query_suffix: String,
    /// Transcript host whose pages put one line per text line.
    pub line_break_host: String,
    /// Transcript host whose pages separate lines with `<br>` markup.
    pub markup_break_host: String,
    /// Phrases shorter than this are too generic to search for.
    pub min_phrase_chars: usize,
    /// Transcript pages fetched per phrase.
    pub max_links_per_phrase: usize,
    /// Lines scanned after a hit when looking for the other speaker.
    pub lookahead_lines: usize,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_url: "https://www.google.com/search".to_string(),
            query_suffix: "movie script".to_string(),
            line_break_host: "imsdb.com".to_string(),
            markup_break_host: "springfieldspringfield.co.uk".to_string(),
            min_phrase_chars: 10,
            max_links_per_phrase: 3,
            lookahead_lines: 4,
            user_agent: "Mozilla/5.0 (compatible; Echobot/0.1)".to_string(),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = EchobotConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert!(config.bot.enabled);
        assert_eq!(config.bot.bot_name, "Bot");
        assert_eq!(config.bot.conversation_title, "Convo with Bot");
        assert!(config.bot.rng_seed.is_none());
        assert!((config.matching.phrase_distance_ratio - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(config.matching.greeting_trigger, "How are you?");
        assert_eq!(config.miner.line_break_host, "imsdb.com");
        assert_eq!(config.miner.query_suffix, "movie script");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[bot]
bot_name = "Robo"
rng_seed = 7

[miner]
enabled = false
"#;
        let file = create_temp_config(content);
        let config = EchobotConfig::load(file.path()).unwrap();
        assert_eq!(config.bot.bot_name, "Robo");
        assert_eq!(config.bot.rng_seed, Some(7));
        assert!(!config.miner.enabled);
        // Remaining fields use defaults
        assert_eq!(config.bot.max_message_length, 2000);
        assert_eq!(config.miner.min_phrase_chars, 10);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_config_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = EchobotConfig::load(file.path()).unwrap();
        assert_eq!(config.bot.bot_name, "Bot");
        assert!(config.miner.enabled);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = EchobotConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.bot.bot_name, "Bot");
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = EchobotConfig::load(file.path());
        assert!(matches!(result, Err(EchobotError::Config(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = create_temp_config("[bot]\nbot_name = \"  \"\n");
        assert!(EchobotConfig::load(file.path()).is_err());

        let file = create_temp_config("[matching]\nphrase_distance_ratio = 0.0\n");
        assert!(EchobotConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validate_timeout_only_matters_when_mining() {
        let mut config = EchobotConfig::default();
        config.miner.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.miner.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let mut config = EchobotConfig::default();
        config.bot.rng_seed = Some(42);
        config.matching.substring_length_ratio = 1.5;
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = EchobotConfig::load(&path).unwrap();
        assert_eq!(reloaded.bot.rng_seed, Some(42));
        assert!((reloaded.matching.substring_length_ratio - 1.5).abs() < f64::EPSILON);
        assert_eq!(reloaded.miner.markup_break_host, config.miner.markup_break_host);
    }
}
