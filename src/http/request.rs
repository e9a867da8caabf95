//! Request correlation.
//!
//! # Responsibilities
//! - Pick a request ID (incoming `x-request-id`, else a fresh UUID v4)
//! - Open the per-request tracing span carrying it
//!
//! # Design Decisions
//! - The ID lives in the span only; request and response headers are
//!   forwarded untouched so functions see exactly what the client sent

use axum::http::{HeaderMap, Request};
use tracing::Span;
use uuid::Uuid;

/// Header carrying a caller-supplied request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The caller's request ID, or a new one.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Span for one dispatch; used by the trace layer.
pub fn make_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "dispatch",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        uri = %request.uri(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_uses_incoming_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[test]
    fn test_generates_uuid_when_absent() {
        let id = request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, request_id(&HeaderMap::new()));
    }
}
