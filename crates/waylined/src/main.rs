//! waylined: session history daemon.

use std::sync::Arc;

use anyhow::{Context, Result};

use wayline_core::config::WaylineConfig;
use wayline_services::{EventBus, ServiceSessionTable, SessionHistory};

mod storage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = WaylineConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = WaylineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        WaylineConfig::default()
    });
    tracing::info!(
        backend = ?config.storage.backend,
        collection = %config.history.collection,
        "waylined starting"
    );

    // Shared state
    let storage = storage::open_storage(&config.storage)?;
    let service_sessions = ServiceSessionTable::new();
    let bus = EventBus::new();

    let history = Arc::new(
        SessionHistory::new(storage, Arc::new(service_sessions.clone()))
            .with_collection(config.history.collection.clone()),
    );
    history
        .subscribe(&bus)
        .context("failed to subscribe session history to the event bus")?;

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── API ──────────────────────────────────────────────────────────────────
    let state = wayline_api::ApiState {
        history: history.clone(),
        bus: bus.clone(),
        service_sessions,
    };
    let api_port = config.api.port;
    let api_task = tokio::spawn(async move {
        if let Err(e) = wayline_api::serve(state, api_port).await {
            tracing::error!(error = %e, "API server failed");
        }
    });

    // ── Wait for exit ────────────────────────────────────────────────────────
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = api_task           => tracing::error!("API task exited: {:?}", r),
    }

    bus.close();
    tracing::info!(active = history.active_count(), "session history closed");
    Ok(())
}
