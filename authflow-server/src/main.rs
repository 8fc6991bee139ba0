//! Authflow Server
//!
//! Hosts the sign-up and auth sync processors behind a small HTTP surface.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use authflow_core::events::{EventSink, emitted_event_channel};
use authflow_core::orchestrator::Orchestrator;
use authflow_core::provider::MemoryAuthProvider;
use authflow_core::store::AuthStore;
use clap::Parser;
use config::ConfigLoader;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Authflow - sign-up orchestration with throttling and auth state sync
#[derive(Parser, Debug)]
#[command(name = "authflow-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./authflow.toml", env = "AUTHFLOW_CONFIG")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting authflow-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let provider = Arc::new(MemoryAuthProvider::new(config.provider.min_password_length));

    // The store owns the only receiver; both processors share the sink.
    let (event_tx, event_rx) = emitted_event_channel();
    let store = AuthStore::new();
    let store_task = tokio::spawn(store.clone().run(event_rx));

    let (sign_up, tasks) = Orchestrator::start(provider.clone(), EventSink::new(event_tx));

    let state = AppState::new(sign_up, store, provider);
    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", config.server.listen);
    let result = run_server(router, config.server.listen).await;

    // Aborting the processors drops the last sink, which ends the store.
    tasks.shutdown();
    if let Err(e) = store_task.await {
        tracing::error!("Auth store task failed: {}", e);
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,authflow_core=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
