//! Invocation event translation.
//!
//! # Data Flow
//! ```text
//! Request direction (infallible):
//!     method, URI, HeaderMap, body
//!     → to_event → InvocationEvent
//!     → to_payload → JSON bytes for FunctionInvoke
//!
//! Reply direction:
//!     raw reply bytes
//!     → from_reply → InvocationResult {code, headers, data}
//!     → DecodeError if the bytes are not that structure
//! ```
//!
//! # Wire Format
//! - Event: `{"method": str, "path": str, "headers": {str: [str]}, "data": base64}`
//! - Reply: `{"code": int, "headers": {str: [str]}, "data": base64}`
//! - Header names are sent in canonical form (`Content-Type`), keys sorted

pub mod serde_ext;

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::serde_ext::{base64_bytes, de_null_default};

/// Header name to every value sent under it, in arrival order.
pub type HeaderMultimap = BTreeMap<String, Vec<String>>;

/// Payload sent to a backend function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub method: String,
    pub path: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub headers: HeaderMultimap,
    #[serde(default, with = "base64_bytes")]
    pub data: Bytes,
}

impl InvocationEvent {
    /// Serialize for transport.
    pub fn to_payload(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

/// Decoded reply of a backend function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(rename = "code")]
    pub status_code: u16,
    #[serde(default, deserialize_with = "de_null_default")]
    pub headers: HeaderMultimap,
    #[serde(default, with = "base64_bytes")]
    pub data: Bytes,
}

impl InvocationResult {
    /// Encode in the reply wire format.
    pub fn to_reply(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    pub fn status(&self) -> StatusCode {
        // Checked by from_reply; hand-built results fall back to 502.
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_GATEWAY)
    }
}

/// The function replied, but not with `{code, headers, data}`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed function reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("function reply carries invalid status code {0}")]
    InvalidStatus(u16),
}

/// Origin-form request URI: path plus query string.
pub fn request_uri(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Canonical MIME form of a header name: `x-request-id` → `X-Request-Id`.
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Collect a header map into the wire multimap.
///
/// `Host` is not forwarded; it is part of the request target, not a header
/// the function sees.
pub fn header_multimap(headers: &HeaderMap) -> HeaderMultimap {
    let mut out = HeaderMultimap::new();
    for (name, value) in headers {
        if name == header::HOST {
            continue;
        }
        out.entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

/// Build the invocation event for a request.
pub fn to_event(method: &Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> InvocationEvent {
    InvocationEvent {
        method: method.as_str().to_string(),
        path: request_uri(uri),
        headers: header_multimap(headers),
        data: body,
    }
}

/// Decode a function's raw reply.
pub fn from_reply(raw: &[u8]) -> Result<InvocationResult, DecodeError> {
    let result: InvocationResult = serde_json::from_slice(raw)?;
    if StatusCode::from_u16(result.status_code).is_err() {
        return Err(DecodeError::InvalidStatus(result.status_code));
    }
    Ok(result)
}
