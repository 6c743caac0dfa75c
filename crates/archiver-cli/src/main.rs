//! Archiver command line
//!
//! Serves the local dashboard (the default) or runs a single API operation.
//!
//! Usage:
//! ```bash
//! # Dashboard on http://127.0.0.1:8090 with a config file
//! archiver --config archiver.yaml
//!
//! # Or with environment variables
//! ARCHIVER_API_URL=https://abc.execute-api.us-east-1.amazonaws.com/prod \
//! ARCHIVER_COGNITO_CLIENT_ID=xxxx archiver login --username alice
//!
//! archiver submit https://example.com
//! archiver versions https://example.com
//! archiver preview archives/example.com/2024-01-01.html --output snapshot.html
//! ```

mod config;

use anyhow::{Context, anyhow};
use archiver_core::{ArchiveApi, SessionProvider, types::format_capture_date};
use archiver_ui::views::{describe, url_list, versions};
use archiver_ui::{Dashboard, UiServer};
use clap::{Parser, Subcommand};
use config::ArchiverConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Archiver - submit web pages for archiving and browse their snapshots
#[derive(Parser)]
#[command(name = "archiver")]
#[command(about = "Web page archiver dashboard and API client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "ARCHIVER_CONFIG",
        global = true
    )]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the local dashboard (default if no command specified)
    Serve,
    /// Sign in to the user pool and cache the tokens
    Login {
        #[arg(long)]
        username: String,

        #[arg(long, env = "ARCHIVER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the cached session
    Logout,
    /// List archived URLs
    List,
    /// Submit a URL for archiving
    Submit { url: String },
    /// List the archived versions of a URL
    Versions { url: String },
    /// Download the HTML of one archived version
    Preview {
        /// Storage path as printed by `versions`
        storage_path: String,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ArchiverConfig::from_file(shellexpand::tilde(path).to_string())?,
        None => ArchiverConfig::default(),
    };
    // Environment variables override the config file
    let env_warnings = config.merge_env();

    init_tracing(&config.logging.level)?;
    for warning in &env_warnings {
        warn!("{}", warning);
    }
    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path);
    }
    config.validate()?;

    let sessions = config.session_provider()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config, sessions).await,
        Commands::Login { username, password } => {
            let password =
                password.context("A password is required (--password or ARCHIVER_PASSWORD)")?;
            let session = sessions.sign_in(username.trim(), &password).await?;
            println!("Signed in as {}", session.username);
            Ok(())
        }
        Commands::Logout => {
            sessions.sign_out().await?;
            println!("Signed out");
            Ok(())
        }
        Commands::List => {
            let api = config.api_client(sessions)?;
            let urls = api
                .list_urls()
                .await
                .map_err(|e| anyhow!(describe("Failed to load URLs", &e)))?;
            if urls.is_empty() {
                println!("{}", url_list::EMPTY_MESSAGE);
            }
            for item in &urls {
                let row = url_list::UrlRow::from(item);
                println!("{}\t{}\t{}", row.url, row.last_archived, row.view_label);
            }
            Ok(())
        }
        Commands::Submit { url } => {
            let api = config.api_client(sessions)?;
            api.submit_url(&url)
                .await
                .map_err(|e| anyhow!(describe("Failed to add URL", &e)))?;
            println!("URL added successfully: {}", url.trim());
            Ok(())
        }
        Commands::Versions { url } => {
            let api = config.api_client(sessions)?;
            let found = api
                .list_versions(&url)
                .await
                .map_err(|e| anyhow!(describe("Failed to load versions", &e)))?;
            if found.is_empty() {
                println!("{}", versions::EMPTY_MESSAGE);
            }
            for version in &found {
                println!(
                    "{}\t{}",
                    format_capture_date(&version.timestamp),
                    version.storage_path
                );
            }
            Ok(())
        }
        Commands::Preview {
            storage_path,
            output,
        } => {
            let api = config.api_client(sessions)?;
            let html = preview(&api, &storage_path)
                .await
                .map_err(|e| anyhow!(describe("Failed to generate preview", &e)))?;
            match output {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Saved {} to {}", storage_path, path.display());
                }
                None => print!("{}", html),
            }
            Ok(())
        }
    }
}

async fn preview(api: &impl ArchiveApi, storage_path: &str) -> archiver_core::Result<String> {
    let link = api.request_preview_link(storage_path).await?;
    api.fetch_snapshot(&link).await
}

async fn serve(config: &ArchiverConfig, sessions: Arc<dyn SessionProvider>) -> anyhow::Result<()> {
    let api: Arc<dyn ArchiveApi> = Arc::new(config.api_client(sessions.clone())?);
    let dashboard = Dashboard::new(api, sessions, config.ui.redirect_delay());
    info!("Archive API: {}", config.api.base_url);
    UiServer::new(config.ui.clone(), dashboard).serve().await
}

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
