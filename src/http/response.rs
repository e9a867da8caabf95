//! Response writing.
//!
//! # Responsibilities
//! - Turn a decoded function reply into the outbound HTTP response
//!
//! # Design Decisions
//! - Status is the reply's `code`, body is the reply's `data`
//! - Headers are set, not appended: the last value for a name wins
//! - Header names or values that are not legal HTTP are skipped and logged

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;

use crate::event::InvocationResult;

/// Build the client response for a function reply.
pub fn write_response(result: InvocationResult) -> Response {
    let mut response = Response::new(Body::from(result.data.clone()));
    *response.status_mut() = result.status();

    let headers = response.headers_mut();
    for (name, values) in &result.headers {
        let header_name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(header = %name, "Skipping invalid header name from function");
                continue;
            }
        };
        for value in values {
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(header_name.clone(), v);
                }
                Err(_) => {
                    tracing::warn!(header = %name, "Skipping invalid header value from function");
                }
            }
        }
    }

    response
}
