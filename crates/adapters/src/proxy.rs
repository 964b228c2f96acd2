// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy-activation TCP proxy (§4.5): accept on `bind_address`, assert the
//! backing job is started, dial `forward_address` with retry until
//! `spin_up_timeout`, then bridge the two streams with half-close.

use async_trait::async_trait;
use ignite_core::{JobState, Listener, ProxyDialError};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// Ensures the lazy job backing a listener is running before a connection is
/// forwarded. Implemented by the restart controller (§9: Common vs Lazy
/// dispatch); kept as a trait so the proxy doesn't depend on the engine
/// crate.
#[async_trait]
pub trait JobActivator: Send + Sync + 'static {
    async fn ensure_started(&self) -> std::io::Result<()>;
}

/// Runs one listener's accept loop until `cancel` fires: a single accept
/// loop, one spawned task per connection, cancellation closes the socket
/// rather than draining in-flight connections.
pub async fn run_listener(
    state: JobState,
    listener_config: Listener,
    activator: Arc<dyn JobActivator>,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let socket = TcpListener::bind(&listener_config.bind_address).await?;
    tracing::info!(address = %listener_config.bind_address, "starting TCP listener");

    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job = state.name(), "listener cancelled, closing socket");
                return Ok(());
            }
            accepted = socket.accept() => accepted,
        };

        let (conn, peer) = match accepted {
            Ok(pair) => pair,
            Err(err) => return Err(err),
        };
        tracing::info!(client.addr = %peer, "accepted connection");

        if let Err(err) = activator.ensure_started().await {
            tracing::error!(error = %err, "job did not become ready, dropping connection");
            continue;
        }

        let state = state.clone();
        let forward_address = listener_config.forward_address.clone();
        let spin_up_timeout = spin_up_timeout(&state);
        let job_name = state.name().to_string();

        tokio::spawn(async move {
            state.increment_connections();
            let result =
                serve_connection(conn, &job_name, &forward_address, spin_up_timeout).await;
            if let Err(err) = result {
                tracing::error!(error = %err, "proxy connection failed");
            }
            state.mark_connection_closed(chrono::Utc::now());
            state.decrement_connections();
        });
    }
}

fn spin_up_timeout(state: &JobState) -> Duration {
    state
        .config()
        .laziness
        .as_ref()
        .map(|l| l.spin_up_timeout())
        .unwrap_or(Duration::from_secs(5))
}

/// Dial `forward_address` with retry every 20ms until `timeout` elapses,
/// then bridge both directions, half-closing the write side of whichever
/// stream finishes first so the peer observes EOF (§4.5 step 3).
async fn serve_connection(
    mut client: TcpStream,
    job_name: &str,
    forward_address: &str,
    timeout: Duration,
) -> Result<(), ProxyDialError> {
    let mut upstream = dial_with_retry(job_name, forward_address, timeout).await?;

    let (mut client_r, mut client_w) = client.split();
    let (mut upstream_r, mut upstream_w) = upstream.split();

    let to_upstream = async {
        let result = tokio::io::copy(&mut client_r, &mut upstream_w).await;
        let _ = upstream_w.shutdown().await;
        result
    };
    let from_upstream = async {
        let result = tokio::io::copy(&mut upstream_r, &mut client_w).await;
        let _ = client_w.shutdown().await;
        result
    };

    // Wait for both directions, not just whichever finishes first, so a
    // half-duplex close on one side doesn't truncate the other.
    let (_, _) = tokio::join!(to_upstream, from_upstream);
    Ok(())
}

async fn dial_with_retry(
    job_name: &str,
    address: &str,
    timeout: Duration,
) -> Result<TcpStream, ProxyDialError> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut interval = tokio::time::interval(Duration::from_millis(20));

    loop {
        interval.tick().await;
        if let Ok(stream) = TcpStream::connect(address).await {
            return Ok(stream);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ProxyDialError {
                job: job_name.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    }
}
