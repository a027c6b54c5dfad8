//! Order-grab platform server.
//!
//! Loads the flat-JSON state, wires the engine and managers, and serves the
//! HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Error};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use og_server::api;
use og_server::config::ServerConfig;
use og_server::logging;
use og_server::metrics;
use order_grab::{
    auth::AuthManager, ledger::LedgerManager, rules::RuleManager, store::JsonStore,
    task::TaskEngine, user::UserManager,
};

const HELP: &str = "\
Run the order-grab task platform server

USAGE:
  og_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8686]
  --data-dir   PATH        Data directory for JSON state [default: env DATA_DIR or ./data]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8686)
  METRICS_BIND             Prometheus scrape address (disabled when unset)
  DATA_DIR                 Data directory for JSON state files
  STORE_IO_TIMEOUT_SECS    Per-operation storage I/O timeout
  JWT_SECRET               JWT signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let data_dir_override: Option<PathBuf> = pargs.opt_value_from_str("--data-dir")?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, data_dir_override)?;
    info!("Starting order-grab server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{addr}/metrics");
    }

    // Storage and managers
    let store = Arc::new(JsonStore::new(config.store.clone()));
    store.init().await.context("Failed to prepare data directory")?;

    let users = Arc::new(
        UserManager::load(store.clone())
            .await
            .context("Failed to load users")?,
    );
    let rules = Arc::new(
        RuleManager::load(store.clone())
            .await
            .context("Failed to load inject rules")?,
    );
    let ledger = Arc::new(
        LedgerManager::load(store.clone(), users.clone())
            .await
            .context("Failed to load ledger")?,
    );
    let auth = Arc::new(
        AuthManager::load(
            store.clone(),
            config.security.password_pepper.clone(),
            config.security.jwt_secret.clone(),
        )
        .await
        .context("Failed to load admin credentials")?,
    );
    let engine = TaskEngine::new(users.clone(), rules.clone());

    let user_count = users.list().await.len();
    metrics::users_total(user_count);
    info!(
        "State loaded: {} user(s), {} inject rule(s)",
        user_count,
        rules.list(None).await.len()
    );

    let api_state = api::AppState {
        store,
        users,
        rules,
        engine,
        ledger,
        auth,
    };
    let app = api::create_router(api_state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
