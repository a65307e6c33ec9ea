//! `inboxbell` - Reddit inbox to Home Assistant notifications
//!
//! Polls the unread inbox of one Reddit account and sends a Home Assistant
//! notification for every comment reply or private message, once.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::{Context, bail};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use inboxbell_core::config::SECRET_KEYS;
use inboxbell_core::{Config, HomeAssistantNotifier, PollLoop, RedditInbox, SeenLedger, credentials};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "inboxbell")]
#[command(about = "Forward unread Reddit inbox items to Home Assistant", version)]
struct Cli {
    /// Runs the poller when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a secret from stdin and store it in the system keyring
    StoreSecret {
        /// Variable the secret stands in for
        #[arg(value_parser = PossibleValuesParser::new(SECRET_KEYS))]
        name: String,
    },
    /// Remove a secret from the system keyring
    DeleteSecret {
        /// Variable the secret stands in for
        #[arg(value_parser = PossibleValuesParser::new(SECRET_KEYS))]
        name: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inboxbell=info,inboxbell_core=info,inboxbell_oauth=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        None => run().await,
        Some(Command::StoreSecret { name }) => store_secret(&name),
        Some(Command::DeleteSecret { name }) => {
            credentials::delete_secret(&name)?;
            info!("Removed {name} from keyring");
            Ok(())
        }
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting inboxbell");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        user = %config.reddit.username,
        hub = %config.hub.base_url,
        target = %config.hub.target,
        interval_secs = config.poll.refresh_interval.as_secs(),
        two_factor = config.reddit.totp_secret.is_some(),
        "Configuration loaded"
    );

    let source = RedditInbox::from_config(&config.reddit)?;
    let notifier = HomeAssistantNotifier::new(&config.hub)?;
    let ledger = SeenLedger::load(&config.ledger_path)
        .await
        .context("Failed to load seen ledger")?;
    info!(
        "Loaded {} seen items from {}",
        ledger.len(),
        ledger.path().display()
    );

    let mut poll = PollLoop::new(config.poll, source, notifier, ledger);
    tokio::select! {
        result = poll.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}

fn store_secret(name: &str) -> anyhow::Result<()> {
    let mut value = String::new();
    std::io::stdin()
        .read_line(&mut value)
        .context("Failed to read secret from stdin")?;
    let value = value.trim_end_matches(['\r', '\n']);
    if value.is_empty() {
        bail!("Refusing to store an empty {name}");
    }

    credentials::store_secret(name, value)?;
    info!("Stored {name} in keyring");
    Ok(())
}
