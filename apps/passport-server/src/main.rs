mod config;
mod logging;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use passport::{DatabaseConnection, Passport};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

/// Passport Server - passwordless authentication and tenancy
#[derive(Parser)]
#[command(name = "passport-server")]
#[command(about = "Passport Server - passwordless authentication and tenancy")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Apply database migrations and exit
    Migrate,
    /// Purge expired magic links once and exit
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref()
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);
    logging::init(&config.logging, cli.verbose > 0)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
        Commands::Migrate => migrate(&config).await,
        Commands::Cleanup => cleanup_once(&config).await,
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    config
        .passport
        .validate()
        .context("passport configuration is invalid")?;
    println!("Configuration is valid");
    Ok(())
}

async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    let db = passport::connect(&config.database.dsn, config.database.max_conns)
        .await
        .context("failed to connect to database")?;
    passport::migrate(&db)
        .await
        .context("failed to apply migrations")?;
    tracing::info!("database ready");
    Ok(db)
}

async fn migrate(config: &AppConfig) -> Result<()> {
    connect(config).await?;
    println!("Migrations applied");
    Ok(())
}

async fn cleanup_once(config: &AppConfig) -> Result<()> {
    let db = connect(config).await?;
    let passport = Passport::new(db, &config.passport)?;
    let report = passport.cleanup().await?;
    println!(
        "Removed {} expired magic links, evicted {} rate-limit windows",
        report.magic_links, report.rate_windows
    );
    Ok(())
}

async fn run_server(config: &AppConfig) -> Result<()> {
    let db = connect(config).await?;
    let passport = Arc::new(Passport::new(db, &config.passport)?);
    let cancel = CancellationToken::new();

    let sweeper = tokio::spawn(cleanup_loop(
        Arc::clone(&passport),
        config.passport.cleanup.interval,
        cancel.child_token(),
    ));

    let signals = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handling failed");
        }
        signals.cancel();
    });

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "passport server listening");

    let shutdown = cancel.clone();
    axum::serve(
        listener,
        passport
            .router()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .context("server error")?;

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "cleanup task did not stop cleanly");
    }
    tracing::info!("passport server stopped");
    Ok(())
}

async fn cleanup_loop(passport: Arc<Passport>, every: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => match passport.cleanup().await {
                Ok(report) => tracing::debug!(
                    magic_links = report.magic_links,
                    rate_windows = report.rate_windows,
                    "cleanup sweep finished"
                ),
                Err(e) => tracing::warn!(error = %e, "cleanup sweep failed"),
            },
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("failed to listen for Ctrl+C")?,
            _ = sigterm.recv() => {},
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    tracing::info!("shutdown signal received, initiating graceful shutdown");
    Ok(())
}
