use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use daily_verse_core::{
    parse_citation, BibleGatewayClient, Config, DailyMessageService, ExplanationGenerator,
    GeminiClient, PassageFetcher, TelegramClient,
};

#[derive(Parser)]
#[command(name = "daily-verse")]
#[command(about = "Sends the Bible Gateway verse of the day, with a short AI explanation, to Telegram")]
struct Cli {
    /// Config file (default: <config dir>/daily-verse/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build today's message and send it to the configured chat
    Send,
    /// Build today's message and print it without sending
    Preview,
    /// Expand a citation into the references that get fetched
    Refs {
        /// Citation, e.g. "1 John 1:8-10, 2:1-2"
        citation: String,
    },
    /// Fetch and print one cleaned passage
    Passage {
        /// Reference, e.g. "John 3:16-18"
        reference: String,
        /// Translation (default: configured primary version)
        #[arg(short, long)]
        version: Option<String>,
    },
    /// Fetch one passage and print its AI explanation
    Explain {
        /// Reference, e.g. "Rev 3:20"
        reference: String,
        /// Translation (default: configured primary version)
        #[arg(short, long)]
        version: Option<String>,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Send => send(&load_config(config_path)?).await?,
        Commands::Preview => preview(&load_config(config_path)?).await?,
        Commands::Refs { citation } => {
            for reference in parse_citation(&citation) {
                println!("{}", reference);
            }
        }
        Commands::Passage { reference, version } => {
            let config = load_config(config_path)?;
            let version = version.as_deref().unwrap_or(config.primary_version());
            let text = fetch_passage(&reference, version).await;
            if text.is_empty() {
                bail!("No passage text found for \"{}\" ({})", reference, version);
            }
            println!("{}", text);
        }
        Commands::Explain { reference, version } => {
            explain(&load_config(config_path)?, &reference, version.as_deref()).await?
        }
        Commands::Init { force } => init(config_path, force)?,
    }

    Ok(())
}

/// Config file (given path or the default location) with env overrides.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from(path)?.with_env(|key| std::env::var(key).ok())),
        None => Config::load(),
    }
}

async fn send(config: &Config) -> Result<()> {
    let (token, chat_id) = config.telegram()?;
    let service = DailyMessageService::from_config(config);
    let telegram = TelegramClient::new(token);

    info!("Running the send daily verse task...");
    service.deliver(&telegram, chat_id).await?;
    info!("Task finished successfully.");
    Ok(())
}

async fn preview(config: &Config) -> Result<()> {
    let service = DailyMessageService::from_config(config);
    let message = service.daily_message().await?;
    println!("{}", message);
    Ok(())
}

async fn fetch_passage(reference: &str, version: &str) -> String {
    PassageFetcher::new(BibleGatewayClient::new())
        .fetch(reference, version)
        .await
}

async fn explain(config: &Config, reference: &str, version: Option<&str>) -> Result<()> {
    let Some(api_key) = config.google_api_key.as_deref() else {
        bail!("GOOGLE_API_KEY is not configured");
    };

    let version = version.unwrap_or(config.primary_version());
    let text = fetch_passage(reference, version).await;
    if text.is_empty() {
        bail!("No passage text found for \"{}\" ({})", reference, version);
    }

    let generator = ExplanationGenerator::new(Some(GeminiClient::new(api_key)), config.max_retries());
    let explanation = generator.explain(&text, reference).await;
    if explanation.is_empty() {
        println!("(no explanation)");
    } else {
        println!("{}", explanation);
    }
    Ok(())
}

fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::get_config_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::new().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
