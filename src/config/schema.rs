//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Where the routing document lives in the object store.
    pub routes: RoutesConfig,

    /// Object store holding the routing document.
    pub object_store: ObjectStoreConfig,

    /// Function service settings.
    pub invoker: InvokerConfig,

    /// Client-side deadlines for backend calls.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body buffered for an invocation, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 6 * 1024 * 1024, // function payload ceiling
        }
    }
}

/// Routing document location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Object key of the routing document.
    pub path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            path: "qi/router.json".to_string(),
        }
    }
}

/// Object store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectStoreConfig {
    /// Objects are files under `root`.
    Fs { root: String },

    /// Objects are served over HTTP(S) from a bucket.
    Http {
        #[serde(default)]
        bucket: String,
        #[serde(default = "default_oss_endpoint")]
        endpoint: String,
    },
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self::Fs {
            root: ".".to_string(),
        }
    }
}

fn default_oss_endpoint() -> String {
    "oss-cn-beijing.aliyuncs.com".to_string()
}

/// Function service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Account that owns the services.
    pub account_id: String,

    /// Regional endpoint host, or a full base URL.
    pub endpoint: String,

    /// API version path prefix.
    pub api_version: String,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            endpoint: "cn-beijing.fc.aliyuncs.com".to_string(),
            api_version: "2016-08-15".to_string(),
        }
    }
}

impl InvokerConfig {
    /// Base URL for invocations.
    pub fn base_url(&self) -> String {
        service_url(&self.account_id, &self.endpoint)
    }
}

impl ObjectStoreConfig {
    /// Base URL for object fetches, when served over HTTP.
    pub fn base_url(&self) -> Option<String> {
        match self {
            Self::Fs { .. } => None,
            Self::Http { bucket, endpoint } => Some(service_url(bucket, endpoint)),
        }
    }
}

/// `https://<prefix>.<endpoint>`, or `endpoint` verbatim when it has a scheme.
pub fn service_url(prefix: &str, endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else if prefix.is_empty() {
        format!("https://{}", endpoint)
    } else {
        format!("https://{}.{}", prefix, endpoint)
    }
}

/// Timeout configuration for backend calls.
///
/// Unset means no deadline: a hung backend hangs the request.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Routing document fetch timeout in seconds.
    pub fetch_secs: Option<u64>,

    /// Function invocation timeout in seconds.
    pub invoke_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn fetch(&self) -> Option<Duration> {
        self.fetch_secs.map(Duration::from_secs)
    }

    pub fn invoke(&self) -> Option<Duration> {
        self.invoke_secs.map(Duration::from_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
