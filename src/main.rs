use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use folio::app::{router, AppState};
use folio::auth::jwt::issue_token;
use folio::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Note-taking document backend")]
struct Cli {
    /// Path to a TOML config file (defaults to ./folio.toml if present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// Listen address, overrides `server.addr`.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Sign a development bearer token with the configured secret.
    IssueToken {
        /// User id placed in the `sub` claim.
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => serve(config, addr).await,
        Command::IssueToken {
            user,
            email,
            ttl_hours,
        } => {
            let token = issue_token(
                &config.auth,
                &user,
                email.as_deref(),
                chrono::Duration::hours(ttl_hours),
            )?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, addr: Option<String>) -> anyhow::Result<()> {
    tracing::info!("Starting Folio server...");

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;
    let app = router(state);

    let addr = addr.unwrap_or(config.server.addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
