use anyhow::Context;
use cipherlink::{
    presentation, store::HttpRemoteStore, AppConfig, LinkCodec, PlaintextMessage,
    SecretCreationWorkflow, SecretRedemptionWorkflow,
};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cipherlink")]
#[command(about = "Share a message through a link that can be read exactly once")]
struct Cli {
    /// Extra configuration file, layered over config/default and config/local
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a message and print its one-time link
    Write {
        /// Message text; read from stdin when omitted
        message: Option<String>,
    },
    /// Fetch, destroy and print the message behind a link
    Read {
        link: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout only ever carries the link or the message.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cipherlink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.config.as_deref()).context("loading configuration")?;
    debug!(web = %config.web.base_url, api = %config.api.base_url, "configuration loaded");

    let store = Arc::new(
        HttpRemoteStore::from_config(&config.api).context("creating HTTP client")?,
    );
    let codec = LinkCodec::new(&config.web.base_url);
    let timeout = config.api.timeout();

    match cli.command {
        Commands::Write { message } => {
            let text = match message {
                Some(text) => text,
                None => read_stdin()?,
            };
            if text.is_empty() {
                eprintln!("nothing to send: the message is empty");
                return Ok(ExitCode::FAILURE);
            }

            let workflow = SecretCreationWorkflow::with_defaults(store, codec, timeout);
            match workflow.create(&PlaintextMessage::new(text)).await {
                Ok(link) => {
                    info!("One time link created");
                    println!("{}", link);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", presentation::creation_message(&e));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Read { link } => {
            let workflow = SecretRedemptionWorkflow::with_defaults(store, codec, timeout);
            match workflow.redeem(link.trim()).await {
                Ok(message) => {
                    println!("{}", message.as_str());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", presentation::redemption_message(&e));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Read the whole of stdin, dropping one trailing newline.
fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("reading message from stdin")?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}
