// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal HTTP/1.1 request/response helper over [`Stream`]. Neither
//! stdlib nor this workspace carries an HTTP client that speaks both TCP
//! and Unix sockets uniformly, so requests are hand-rolled the same way
//! the Go client's `buildHttpClientAndAddress` papers over the two
//! transports — just one level lower, since there is no `net/http` here.

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::addr::ApiAddr;
use crate::transport::{self, Stream};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to connect to {0:?}: {1}")]
    Connect(String, std::io::Error),
    #[error("request failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response status line: {0:?}")]
    BadStatusLine(String),
}

pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn get(addr: &ApiAddr, path: &str) -> Result<HttpResponse, HttpError> {
    request(addr, "GET", path, None).await
}

pub async fn post(addr: &ApiAddr, path: &str) -> Result<HttpResponse, HttpError> {
    request(addr, "POST", path, Some(&[])).await
}

async fn request(
    addr: &ApiAddr,
    method: &str,
    path: &str,
    body: Option<&[u8]>,
) -> Result<HttpResponse, HttpError> {
    let mut stream = transport::connect(addr)
        .await
        .map_err(|err| HttpError::Connect(format!("{addr:?}", addr = addr.host_header()), err))?;

    let mut request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n",
        host = addr.host_header()
    );
    if let Some(body) = body {
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await?;
    if let Some(body) = body {
        stream.write_all(body).await?;
    }

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> Result<HttpResponse, HttpError> {
    let split = find_header_body_split(raw);
    let (head, body) = raw.split_at(split.unwrap_or(raw.len()));
    let body = body
        .strip_prefix(b"\r\n\r\n")
        .or_else(|| body.strip_prefix(b"\n\n"))
        .unwrap_or(body);

    let head = String::from_utf8_lossy(head);
    let status_line = head
        .lines()
        .next()
        .ok_or_else(|| HttpError::BadStatusLine(head.to_string()))?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| HttpError::BadStatusLine(status_line.to_string()))?;

    Ok(HttpResponse {
        status,
        body: body.to_vec(),
    })
}

fn find_header_body_split(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}
