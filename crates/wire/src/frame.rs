// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing: `[u32 big-endian length][JSON bytes]`.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame too short: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("json encode/decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode `value` as `[len:u32 BE][json bytes]`.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(value)?;
    let mut framed = Vec::with_capacity(4 + body.len());
    framed.extend_from_slice(&(body.len() as u32).to_be_bytes());
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Decode a single `[len:u32 BE][json bytes]` frame from the front of
/// `buf`, returning the value and the number of bytes consumed. Returns
/// `Truncated` if `buf` does not yet hold a complete frame — callers
/// should keep buffering and retry.
pub fn decode<T: DeserializeOwned>(buf: &[u8]) -> Result<(T, usize), ProtocolError> {
    if buf.len() < 4 {
        return Err(ProtocolError::Truncated { need: 4, have: buf.len() });
    }
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let total = 4 + len;
    if buf.len() < total {
        return Err(ProtocolError::Truncated { need: total, have: buf.len() });
    }
    let value = serde_json::from_slice(&buf[4..total])?;
    Ok((value, total))
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
