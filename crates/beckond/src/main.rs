//! beckond — Beckon call-signaling daemon.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use beckon_api::ApiState;
use beckon_core::config::BeckonConfig;
use beckon_services::{SignalingHub, UserDirectory};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = BeckonConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = BeckonConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        BeckonConfig::default()
    });

    tracing::info!(
        bind_addr = %config.network.bind_addr,
        port = config.network.api_port,
        duplicate_login = ?config.presence.duplicate_login,
        "beckond starting"
    );

    let directory = if config.directory.seed_demo_users {
        let directory = UserDirectory::with_demo_users();
        tracing::info!(users = directory.len(), "demo users seeded");
        directory
    } else {
        UserDirectory::new()
    };

    let hub = Arc::new(SignalingHub::new(directory, config.presence.duplicate_login));

    let state = ApiState {
        hub,
        started_at: Instant::now(),
    };

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    let server_task = {
        let bind_addr = config.network.bind_addr.clone();
        let port = config.network.api_port;
        tokio::spawn(async move { beckon_api::serve(state, &bind_addr, port).await })
    };

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = server_task        => tracing::error!("server exited: {:?}", r),
    }

    Ok(())
}
