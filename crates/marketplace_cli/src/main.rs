//! Marketplace service entry point.
//!
//! # Responsibility
//! - Read configuration from flags and `MARKETPLACE_*` environment variables.
//! - Initialize logging, open (and migrate) the store, serve HTTP until Ctrl-C.

use clap::Parser;
use log::{error, info};
use marketplace_core::{default_log_level, init_logging, Store};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "marketplace")]
#[command(version)]
#[command(about = "HTTP service for marketplace users, orders and offers")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "MARKETPLACE_DB_PATH", default_value = "marketplace.sqlite3")]
    db_path: PathBuf,

    /// Socket address to listen on
    #[arg(long, env = "MARKETPLACE_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// trace|debug|info|warn|error (defaults to debug in debug builds, info otherwise)
    #[arg(long, env = "MARKETPLACE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset
    #[arg(long, env = "MARKETPLACE_LOG_DIR")]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, cli.log_dir.as_deref()) {
        eprintln!("marketplace: {err}");
        return ExitCode::FAILURE;
    }

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=cli status=error error={err}");
            eprintln!("marketplace: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(cli: Cli) -> Result<(), String> {
    let store = Store::open(&cli.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", cli.db_path.display()))?;

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .map_err(|err| format!("failed to bind {}: {err}", cli.bind))?;
    info!(
        "event=server_start module=cli status=ok bind={} db_path={}",
        cli.bind,
        cli.db_path.display()
    );

    axum::serve(listener, marketplace_http::router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server failed: {err}"))?;

    info!("event=server_stop module=cli status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=cli status=error error={err}");
    }
}
