// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log streaming (§4.6 "Log streaming"): `GET /v1/job/{name}/logs` upgrades
//! to a WebSocket and tails the job's stdout/stderr files.

use super::AppState;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    follow: bool,
    #[serde(default = "default_taillen")]
    taillen: i64,
}

fn default_taillen() -> i64 {
    -1
}

pub async fn logs_handler(
    State(control): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LogsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_logs(socket, control, name, query))
}

async fn stream_logs(mut socket: WebSocket, control: AppState, name: String, query: LogsQuery) {
    let Some(status) = control.status(&name) else {
        let _ = socket
            .send(Message::Text("job not found or not controllable".into()))
            .await;
        let _ = socket.close().await;
        return;
    };

    let stdout_path = status.config.base.stdout_path.clone();
    let stderr_path = status.config.base.stderr_path.clone();

    if stdout_path.is_none() && stderr_path.is_none() {
        let _ = socket
            .send(Message::Text(
                "job has no stdout or stderr path configured".into(),
            ))
            .await;
        let _ = socket.close().await;
        return;
    }

    if !status.running {
        let _ = socket
            .send(Message::Text(explain_not_running("stdout", &stdout_path)))
            .await;
        let _ = socket
            .send(Message::Text(explain_not_running("stderr", &stderr_path)))
            .await;
        let _ = socket.close().await;
        return;
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    if let Some(p) = &stdout_path {
        paths.push(p.clone());
    }
    if let Some(p) = &stderr_path {
        if Some(p) != stdout_path.as_ref() {
            paths.push(p.clone());
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<LogEvent>();
    let cancel = CancellationToken::new();
    let mut readers = Vec::new();
    let mut pending_streams = paths.len();

    for path in paths {
        let tx = tx.clone();
        let cancel = cancel.clone();
        let follow = query.follow;
        let taillen = query.taillen;
        readers.push(tokio::spawn(async move {
            if let Err(err) = tail_file(&path, taillen, follow, &tx, &cancel).await {
                tracing::warn!(path = %path.display(), error = %err, "log tail ended with error");
            }
            let _ = tx.send(LogEvent::StreamDone);
        }));
    }
    drop(tx);

    'stream: loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        cancel.cancel();
                        break 'stream;
                    }
                    Some(Err(_)) => {
                        cancel.cancel();
                        break 'stream;
                    }
                    _ => continue,
                }
            }
            event = rx.recv() => {
                match event {
                    Some(LogEvent::Line(line)) => {
                        if socket.send(Message::Text(line.into())).await.is_err() {
                            cancel.cancel();
                            break 'stream;
                        }
                    }
                    Some(LogEvent::StreamDone) => {
                        pending_streams = pending_streams.saturating_sub(1);
                        if pending_streams == 0 {
                            break 'stream;
                        }
                    }
                    None => break 'stream,
                }
            }
        }
    }

    for reader in readers {
        let _ = reader.await;
    }
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "EOF".into(),
        })))
        .await;
}

fn explain_not_running(label: &str, path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("job is not running; last known {label} at {}", p.display()),
        None => format!("job is not running and has no {label} path configured"),
    }
}

enum LogEvent {
    Line(String),
    StreamDone,
}

/// Tails one log file per the §4.6 seek rules: `taillen < 0` reads
/// everything from the start, `0` seeks to the current end (only new
/// lines), `n > 0` keeps a ring buffer of the last `n` lines before
/// continuing from wherever that scan left off.
async fn tail_file(
    path: &PathBuf,
    taillen: i64,
    follow: bool,
    tx: &UnboundedSender<LogEvent>,
    cancel: &CancellationToken,
) -> std::io::Result<()> {
    let mut file = tokio::fs::File::open(path).await?;

    if taillen > 0 {
        let mut ring: VecDeque<String> = VecDeque::with_capacity(taillen as usize);
        {
            let mut scan = BufReader::new(&mut file);
            let mut line = String::new();
            loop {
                line.clear();
                if scan.read_line(&mut line).await? == 0 {
                    break;
                }
                if ring.len() == taillen as usize {
                    ring.pop_front();
                }
                ring.push_back(line.trim_end_matches('\n').to_string());
            }
        }
        for line in ring {
            if tx.send(LogEvent::Line(line)).is_err() {
                return Ok(());
            }
        }
    } else if taillen == 0 {
        file.seek(std::io::SeekFrom::End(0)).await?;
    }
    // taillen < 0: no seek — the read loop below starts from byte 0.

    let mut reader = BufReader::new(file);
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            if !follow {
                return Ok(());
            }
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(std::time::Duration::from_millis(200)) => continue,
            }
        }
        if tx
            .send(LogEvent::Line(line.trim_end_matches('\n').to_string()))
            .is_err()
        {
            return Ok(());
        }
    }
}
