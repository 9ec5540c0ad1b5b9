//! Echobot binary: composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Build the orchestrator (HTTP fetcher unless mining is off)
//! 4. Open the bot conversation and chat over stdin/stdout

mod cli;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

use echobot_chat::{BotError, BotOrchestrator};
use echobot_core::EchobotConfig;

use cli::CliArgs;

/// Print the conversation history as JSON.
fn print_history(orch: &BotOrchestrator, id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    let history = orch.get_history(id)?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = EchobotConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);

    // Tracing. Logs go to stderr so they never interleave with replies.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting echobot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %config_file.display(),
        mining = config.miner.enabled,
        "Configuration loaded"
    );

    config.validate()?;

    let user = args.resolve_user();
    let bot_name = config.bot.bot_name.clone();
    let orch = BotOrchestrator::new(config)?;
    let id = orch.open_conversation(&user)?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "Chatting with {} as {}. Type /history to see the conversation, /quit to leave.",
        bot_name, user
    );

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" => break,
            "/history" => {
                print_history(&orch, id)?;
                continue;
            }
            _ => {}
        }

        match orch.handle_message(id, line).await {
            Ok(reply) => println!("{}: {}", bot_name, reply),
            Err(e @ BotError::MessageTooLong(_)) => eprintln!("{}", e),
            Err(e) => {
                tracing::error!(error = %e, "Message handling failed");
                return Err(e.into());
            }
        }
    }

    orch.close_conversation(id)?;
    tracing::info!("Goodbye");
    Ok(())
}
