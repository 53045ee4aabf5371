//! Per-connection worker: read loop, newline framing, idle timeout, and
//! guaranteed registry cleanup on every exit path. Grounded on the
//! original `SynchroSocketServer`'s thread-per-connection loop, redesigned
//! as fire-and-forget (no response is written back to the peer) per
//! SPEC_FULL.md §4.F Design Notes.

use crate::registry::ConnectionRegistry;
use persist_dispatch::Dispatcher;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use uuid::Uuid;

/// Matches the original server's 1024-byte recv buffer.
const READ_CHUNK: usize = 1024;

/// A connection idle for this long without a readable byte is dropped,
/// independent of the registry's own idle-reaper sweep.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1200);

#[tracing::instrument(skip(socket, registry, dispatcher), fields(conn_id = %id, peer = %peer))]
pub async fn handle(
    mut socket: TcpStream,
    peer: SocketAddr,
    id: Uuid,
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<Dispatcher>,
) {
    tracing::info!("connection accepted");

    let mut carry = Vec::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let read = match tokio::time::timeout(READ_TIMEOUT, socket.read(&mut buf)).await {
            Ok(Ok(0)) => {
                tracing::info!("connection closed by peer");
                break;
            }
            Ok(Ok(n)) => n,
            Ok(Err(err)) => {
                tracing::warn!(%err, "socket read error, closing connection");
                break;
            }
            Err(_) => {
                tracing::warn!("connection idle past read timeout, closing");
                break;
            }
        };

        registry.touch(id).await;
        carry.extend_from_slice(&buf[..read]);

        while let Some(pos) = carry.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = carry.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            dispatcher.dispatch_line(line).await;
        }
    }

    registry.remove(id).await;
    let _ = socket.shutdown().await;
    tracing::info!("connection worker exiting");
}
