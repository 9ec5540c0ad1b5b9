//! CLI argument definitions for the echobot binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use echobot_core::EchobotConfig;

/// Echobot: a chat bot that talks back with your own words and lines from
/// movie scripts.
#[derive(Parser, Debug)]
#[command(name = "echobot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Your display name in the conversation.
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Never search the web for replies.
    #[arg(long = "no-mining")]
    pub no_mining: bool,

    /// Seed for reply selection, for reproducible conversations.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ECHOBOT_CONFIG env var > ~/.echobot/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ECHOBOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the user's display name.
    ///
    /// Priority: --user flag > USER env var > "friend".
    pub fn resolve_user(&self) -> String {
        if let Some(ref u) = self.user {
            if !u.trim().is_empty() {
                return u.trim().to_string();
            }
        }
        match std::env::var("USER") {
            Ok(u) if !u.trim().is_empty() => u,
            _ => "friend".to_string(),
        }
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut EchobotConfig) {
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if self.no_mining {
            config.miner.enabled = false;
        }
        if let Some(seed) = self.seed {
            config.bot.rng_seed = Some(seed);
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".echobot").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".echobot").join("config.toml");
    }
    PathBuf::from("config.toml")
}
