//! TCP accept loop, idle reaper, and graceful shutdown for the ingestion
//! server. Grounded on the original `SynchroSocketServer`'s bind/accept/
//! spawn-per-connection structure; response-writing is intentionally
//! dropped per SPEC_FULL.md §4.F.

use crate::connection;
use crate::registry::ConnectionRegistry;
use persist_dispatch::Dispatcher;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use uuid::Uuid;

pub struct IngestionServer {
    listener: TcpListener,
    registry: Arc<ConnectionRegistry>,
}

impl IngestionServer {
    pub async fn bind(host: &str, port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind((host, port)).await?;
        tracing::info!(host, port, "ingestion server listening");
        Ok(Self {
            listener,
            registry: Arc::new(ConnectionRegistry::new()),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop and idle reaper until `shutdown` reports
    /// `true`, then aborts every live connection and returns.
    pub async fn run(
        self,
        dispatcher: Arc<Dispatcher>,
        reap_interval: Duration,
        max_idle: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> io::Result<()> {
        let registry = self.registry;

        let reaper = {
            let registry = Arc::clone(&registry);
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(reap_interval);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let reaped = registry.reap_stale(max_idle).await;
                            if reaped > 0 {
                                tracing::info!(reaped, "idle reaper closed stale connections");
                            }
                        }
                        _ = shutdown.changed() => break,
                    }
                }
            })
        };

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            tracing::warn!(%err, "accept failed");
                            continue;
                        }
                    };
                    let id = Uuid::new_v4();
                    let dispatcher = Arc::clone(&dispatcher);
                    let registry = Arc::clone(&registry);
                    let task_registry = Arc::clone(&registry);
                    let handle = tokio::spawn(async move {
                        connection::handle(socket, peer, id, task_registry, dispatcher).await;
                    });
                    registry.register(id, handle.abort_handle()).await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("ingestion server shutting down, closing live connections");
                    break;
                }
            }
        }

        reaper.abort();
        let aborted = registry.abort_all().await;
        if aborted > 0 {
            tracing::info!(aborted, "closed live connections on shutdown");
        }
        Ok(())
    }
}
