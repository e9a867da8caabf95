//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, outcome
//! - `gateway_request_duration_seconds` (histogram): latency by outcome
//! - `gateway_invocations_total` (counter): invocations by service, function
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Outcome labels are the dispatcher's terminal states

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("gateway_requests_total", "Requests handled by the gateway");
            describe_histogram!(
                "gateway_request_duration_seconds",
                "End-to-end dispatch latency"
            );
            describe_counter!("gateway_invocations_total", "Backend function invocations");
            tracing::info!(address = %addr, "Metrics endpoint started");
        }
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Label value for a request method; extension methods share one label.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "PATCH" => "PATCH",
        "TRACE" => "TRACE",
        _ => "OTHER",
    }
}

/// Record a finished request.
pub fn record_request(method: &Method, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method_label(method),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a function invocation attempt.
pub fn record_invocation(service: &str, function: &str) {
    counter!(
        "gateway_invocations_total",
        "service" => service.to_string(),
        "function" => function.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::PATCH), "PATCH");
        assert_eq!(method_label(&Method::from_bytes(b"PURGE").unwrap()), "OTHER");
        assert_eq!(method_label(&Method::from_bytes(b"X-RANDOM-1").unwrap()), "OTHER");
    }
}
