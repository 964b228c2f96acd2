// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket client for `job logs` (§4.6/§11): dials either transport via
//! [`Stream`], then hands it to `tokio-tungstenite`'s client handshake.

use futures_util::StreamExt;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Message;

use crate::addr::ApiAddr;
use crate::transport::{self};

#[derive(Debug, Error)]
pub enum WsError {
    #[error("failed to connect: {0}")]
    Connect(#[from] std::io::Error),
    #[error("websocket handshake or stream error: {0}")]
    Protocol(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Prints each text frame to stdout until the server closes the stream;
/// returns once the EOF close frame (or any close frame) arrives.
pub async fn print_log_stream(
    addr: &ApiAddr,
    job: &str,
    follow: bool,
    taillen: i64,
) -> Result<(), WsError> {
    let stream = transport::connect(addr).await?;
    let url = format!(
        "ws://{host}/v1/job/{job}/logs?follow={follow}&taillen={taillen}",
        host = addr.host_header()
    );

    let (mut socket, _response) = tokio_tungstenite::client_async(url, stream).await?;

    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => println!("{text}"),
            Message::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}
