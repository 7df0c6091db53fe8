//! Gatehouse Server — session-bounded form login gate
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_api::{AppState, build_router};
use gatehouse_auth::{Argon2Hasher, AuthenticationGate, InMemoryCredentialStore, SessionSweeper};
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::events::EventPublisher;
use gatehouse_core::traits::SystemClock;

/// Gatehouse — session-bounded authentication gate
#[derive(Debug, Parser)]
#[command(name = "gatehouse-server", version, about, long_about = None)]
struct Cli {
    /// Configuration environment; selects `config/{env}.toml`
    #[arg(short, long, env = "GATEHOUSE_ENV", default_value = "development")]
    env: String,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print an Argon2id hash for a `[[users]]` entry
    HashPassword {
        /// Plaintext password to hash
        #[arg(env = "GATEHOUSE_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::HashPassword { password }) = &cli.command {
        match Argon2Hasher::new().hash_password(password) {
            Ok(hash) => println!("{hash}"),
            Err(e) => {
                eprintln!("Failed to hash password: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %cli.env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    if config.remember_me.enabled && config.remember_me.key == "CHANGE_ME_IN_PRODUCTION" {
        tracing::warn!("remember_me.key is the shipped default; set GATEHOUSE__REMEMBER_ME__KEY");
    }

    // ── Step 1: Credential store ─────────────────────────────────
    let store = InMemoryCredentialStore::from_seeds(&config.users);
    if store.is_empty() {
        tracing::warn!("No users configured; every login will fail");
    }
    tracing::info!(users = store.len(), "Credential store loaded");

    // ── Step 2: Authentication gate ──────────────────────────────
    let events = EventPublisher::new();
    let gate = Arc::new(AuthenticationGate::from_config(
        &config,
        Arc::new(store),
        Arc::new(Argon2Hasher::new()),
        Arc::new(SystemClock),
        events.clone(),
    )?);
    tracing::info!(
        limit = ?gate.registry().limit(),
        overflow = %config.session.overflow_strategy,
        rules = gate.policy().rules().len(),
        "Authentication gate ready"
    );

    // ── Step 3: Session event log ────────────────────────────────
    let mut event_rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => tracing::debug!(event = ?event, "Session event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session event log lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // ── Step 4: Background sweep ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_handle = match config.session.sweep_interval_seconds {
        0 => None,
        seconds => {
            let sweeper = SessionSweeper::new(
                gate.registry().clone(),
                gate.remember_me().clone(),
                Duration::from_secs(seconds),
            );
            let cancel = shutdown_rx.clone();
            Some(tokio::spawn(async move { sweeper.run(cancel).await }))
        }
    };

    // ── Step 5: HTTP server ──────────────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(Arc::new(config), gate));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Gatehouse server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if let Some(handle) = sweep_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }

    tracing::info!("Gatehouse server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
