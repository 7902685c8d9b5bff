// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing for the daemon socket.
//!
//! Each frame is a big-endian `u32` byte count followed by that many bytes
//! of JSON. Both directions use the same framing.

use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

use super::{Request, Response};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("socket i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },

    #[error("peer closed the connection")]
    ConnectionClosed,

    #[error("timed out")]
    Timeout,
}

/// Upper bound on one frame's payload
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Per-frame budget for the daemon side of a connection
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const LEN_PREFIX: usize = 4;

fn within_limit(size: usize) -> Result<usize, ProtocolError> {
    if size > MAX_MESSAGE_SIZE {
        Err(ProtocolError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        })
    } else {
        Ok(size)
    }
}

async fn deadline<T, F>(timeout: Duration, fut: F) -> Result<T, ProtocolError>
where
    F: Future<Output = Result<T, ProtocolError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(ProtocolError::Timeout))
}

/// JSON payload of one frame, size-checked.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(msg)?;
    within_limit(payload.len())?;
    Ok(payload)
}

pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(payload).map_err(ProtocolError::from)
}

/// Read one frame's payload. EOF before the prefix is `ConnectionClosed`.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LEN_PREFIX];
    if let Err(e) = reader.read_exact(&mut prefix).await {
        return Err(match e.kind() {
            ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
            _ => e.into(),
        });
    }
    let len = within_limit(u32::from_be_bytes(prefix) as usize)?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Write one frame and flush.
pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(within_limit(payload.len())?).map_err(|_| {
        ProtocolError::MessageTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        }
    })?;
    let mut frame = Vec::with_capacity(LEN_PREFIX + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<Request, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let payload = deadline(timeout, read_message(reader)).await?;
    decode(&payload)
}

pub async fn write_response<W>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = encode(response)?;
    deadline(timeout, write_message(writer, &payload)).await
}

/// Send `request` to the daemon at `socket` and wait for its response.
///
/// `timeout` covers connecting, sending and however long the daemon takes
/// to answer, so a `WaitReady` caller must allow for its own wait.
pub async fn call(
    socket: &Path,
    request: &Request,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    deadline(timeout, async {
        let mut stream = UnixStream::connect(socket).await?;
        write_message(&mut stream, &encode(request)?).await?;
        decode(&read_message(&mut stream).await?)
    })
    .await
}
