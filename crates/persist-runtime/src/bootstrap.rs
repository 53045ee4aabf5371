//! Process wiring: load config, stand up logging/DB/dead-letter/dispatch/
//! server, then run until a shutdown signal arrives. See SPEC_FULL.md §4.G.

use persist_config::PersistConfig;
use persist_deadletter::DeadLetterSink;
use persist_dispatch::Dispatcher;
use persist_reconcile::EntityStore;
use persist_server::IngestionServer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let config = PersistConfig::load(config_path)
        .map_err(|err| anyhow::anyhow!("failed to load config {config_path}: {err}"))?;

    // `_log_guard` must outlive the whole run — dropping it early stops
    // the file layer's background flush thread.
    let _log_guard = crate::logging::init(&config)?;

    tracing::info!(config_path, "persist-runtime starting up");

    let pool = persist_db::connect(&config)
        .await
        .map_err(|err| anyhow::anyhow!("database connection failed: {err}"))?;
    persist_db::bootstrap_schema(&pool)
        .await
        .map_err(|err| anyhow::anyhow!("schema bootstrap failed: {err}"))?;
    tracing::info!("schema bootstrap complete");

    let deadletter = Arc::new(DeadLetterSink::new(&config.deadletter_path));
    let store = EntityStore::new(config.similarity.clone());
    let dispatcher = Arc::new(Dispatcher::new(
        pool,
        store,
        deadletter,
        config.max_retries,
        config.delay_secs,
    ));

    let server = IngestionServer::bind(&config.bind_host, config.bind_port)
        .await
        .map_err(|err| anyhow::anyhow!("failed to bind {}:{}: {err}", config.bind_host, config.bind_port))?;
    tracing::info!(addr = ?server.local_addr()?, "ingestion server bound");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(wait_for_shutdown_signal(shutdown_tx));

    let reap_interval = Duration::from_secs(config.unactive_conn_listen_seconds);
    let max_idle = Duration::from_secs(config.max_unactive_connection_seconds);

    server
        .run(dispatcher, reap_interval, max_idle, shutdown_rx)
        .await
        .map_err(|err| anyhow::anyhow!("ingestion server failed: {err}"))?;

    tracing::info!("persist-runtime shut down cleanly");
    Ok(())
}

/// Waits for Ctrl+C (all platforms) or SIGTERM (unix), then flips the
/// shutdown watch so the server's accept loop and reaper exit.
async fn wait_for_shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sig) => sig,
            Err(err) => {
                tracing::warn!(%err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                let _ = shutdown_tx.send(true);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("received Ctrl+C"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received Ctrl+C");
    }

    let _ = shutdown_tx.send(true);
}
