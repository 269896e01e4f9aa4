//! # patchworkd — patchwork daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`patchwork.toml`, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct both privilege backends and the command gateway over them
//! - Register one automation module per configured trigger, load their
//!   persisted automations and apply the persisted global switch
//! - Build the tile board and the axum router
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), stopping every module
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use patchwork_adapter_http_axum::router;
use patchwork_adapter_http_axum::state::AppState;
use patchwork_adapter_root_shell::RootShell;
use patchwork_adapter_storage_sqlite_sqlx::SqliteSettingsStore;
use patchwork_adapter_virtual::VirtualPrivilegedService;
use patchwork_app::executors::ExecutorSet;
use patchwork_app::gateway::CommandGateway;
use patchwork_app::module::TriggeredModule;
use patchwork_app::registry::ModuleRegistry;
use patchwork_app::tiles::{GatewaySettingsReader, SettingTile, TileBoard};
use patchwork_app::trigger_bus::InProcessTriggerBus;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let settings = Arc::new(SqliteSettingsStore::connect(config.database_url()).await?);

    // Backends
    let root = RootShell::new(config.root_shell());
    let service = VirtualPrivilegedService::default();
    let gateway = Arc::new(CommandGateway::new(Arc::clone(&settings), root, service));
    let status = gateway.status().await;
    tracing::info!(
        backend = %status.backend,
        available = status.available,
        permitted = status.permitted,
        "privilege backend probed"
    );

    // Modules
    let executors = Arc::new(ExecutorSet::with_defaults(Arc::clone(&gateway)));
    let bus = Arc::new(InProcessTriggerBus::default());
    let mut registry = ModuleRegistry::new();
    for trigger in config.module_triggers()? {
        let module =
            TriggeredModule::for_trigger(trigger, Arc::clone(&bus), Arc::clone(&executors))?;
        registry.register(Arc::new(module)).await?;
    }
    registry.reload(&settings).await?;
    let enabled = registry.apply_persisted_enabled(&settings).await?;
    tracing::info!(
        modules = registry.ids().count(),
        enabled,
        "automation modules ready"
    );
    let registry = Arc::new(registry);

    // Tiles
    let reader = GatewaySettingsReader::new(Arc::clone(&gateway));
    let tiles = Arc::new(
        TileBoard::new().with(Arc::new(SettingTile::mono_audio(Arc::clone(&gateway), reader))),
    );

    // HTTP
    let state = AppState::from_arcs(settings, gateway, bus, Arc::clone(&registry), tiles);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "patchworkd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.set_global_enabled(false).await;
    tracing::info!("patchworkd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
