//! YouTube digest CLI - polls for newly published videos and emails a digest.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use youtube_digest::auth::{reauthorize, OauthClient, StdinPrompt, TokenStore};
use youtube_digest::config::{self, ConfigError, Credentials};
use youtube_digest::pipeline::{Pipeline, PipelineConfig};

/// YouTube digest CLI - poll a search keyword and email new videos.
#[derive(Parser)]
#[command(name = "youtube-digest")]
#[command(about = "Polls YouTube search for new videos and emails an HTML digest")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config directory (credentials, watermark, token)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single poll-and-email cycle (for scheduler use)
    Run {
        /// Search keyword
        #[arg(long, default_value = "emacs")]
        query: String,

        /// Max results per poll (single page, no pagination)
        #[arg(long, default_value = "50")]
        max_results: u32,
    },

    /// Interactive OAuth setup; always re-runs the consent flow and replaces
    /// any persisted token, so scheduled runs need no human at stdin
    Auth,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("youtube_digest=debug,info")
    } else {
        EnvFilter::new("youtube_digest=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => match config::default_config_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let result = match cli.command {
        Commands::Run { query, max_results } => run_cycle(config_dir, query, max_results).await,
        Commands::Auth => run_auth(config_dir).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Print setup guidance for config errors, the error chain for the rest.
fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<ConfigError>() {
        Some(ConfigError::Missing { path }) => {
            eprintln!("Please add your YouTube API credentials to {}", path.display());
        }
        Some(ConfigError::Placeholder { path }) => {
            eprintln!("Please set up your YouTube OAuth credentials.");
            eprintln!(
                "Edit {} and replace the placeholder client ID and secret.",
                path.display()
            );
        }
        _ => {
            eprintln!("Error: {e:#}");
        }
    }
}

async fn run_cycle(config_dir: PathBuf, query: String, max_results: u32) -> Result<()> {
    tracing::info!(
        config_dir = %config_dir.display(),
        query,
        max_results,
        "Starting digest cycle"
    );

    let config = PipelineConfig::new(config_dir, query, max_results);

    let prompt = StdinPrompt;
    let pipeline = Pipeline::new(config, &prompt);
    let summary = pipeline.run_cycle().await?;

    println!("\nDigest cycle summary");
    println!("   Fetched: {}", summary.fetched);
    println!("   Emailed: {}", if summary.emailed { "yes" } else { "no" });
    println!("   Watermark: {}", summary.watermark);

    Ok(())
}

async fn run_auth(config_dir: PathBuf) -> Result<()> {
    config::ensure_config_dir(&config_dir)?;
    let creds = Credentials::load(&config_dir)?;

    let oauth = OauthClient::new(creds.client_id, creds.client_secret)?;
    let store = TokenStore::new(&config_dir);

    let prompt = StdinPrompt;
    reauthorize(&oauth, &store, &prompt).await?;

    println!("Token saved to {}", store.path().display());
    Ok(())
}
