//! IPC layer for promemoriad
//!
//! One JSON document per line over a Unix domain socket. Requests and
//! responses are correlated by `request_id`; subscribed connections also
//! receive the event stream interleaved with their responses.
//!
//! The peer's UID decides its role when it connects. Observers get
//! `PermissionDenied` for anything that changes alert state, without the
//! request ever reaching the engine.

mod client;
mod server;

pub use client::*;
pub use server::*;

use promemoria_api::ErrorCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// IPC errors
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Server not started")]
    NotStarted,

    /// The service answered with an error result
    #[error("Request rejected ({code:?}): {message}")]
    Rejected { code: ErrorCode, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type IpcResult<T> = Result<T, IpcError>;

/// Serialize one frame, newline included
pub fn encode_frame<T: Serialize>(value: &T) -> IpcResult<String> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

/// Read the next non-blank frame. EOF is `ConnectionClosed`.
pub async fn read_frame<T, R>(reader: &mut R, buf: &mut String) -> IpcResult<T>
where
    T: DeserializeOwned,
    R: AsyncBufRead + Unpin,
{
    loop {
        buf.clear();
        if reader.read_line(buf).await? == 0 {
            return Err(IpcError::ConnectionClosed);
        }
        let line = buf.trim();
        if !line.is_empty() {
            return Ok(serde_json::from_str(line)?);
        }
    }
}
