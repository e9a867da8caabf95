//! Backend capabilities subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → ObjectFetch::fetch(path)                     (route table blob)
//!     → FunctionInvoke::invoke(service, fn, payload) (function reply bytes)
//!
//! Implementations:
//!     fs.rs   → FsObjectStore (local directory)
//!     http.rs → HttpObjectStore, HttpFunctionInvoker (reqwest)
//! ```
//!
//! # Design Decisions
//! - Capabilities are injected into the dispatcher, never global
//! - Both traits are `Send + Sync`: one instance serves every in-flight request
//! - No retries and no deadline here; a client may be built with a timeout

pub mod fs;
pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use fs::FsObjectStore;
pub use http::{ClientError, HttpFunctionInvoker, HttpObjectStore};

/// Errors from fetching an object.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No object exists at the path.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure talking to the object store.
    #[error("object store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The object store answered with an unexpected status.
    #[error("object store returned {status} for {path}")]
    Status { status: u16, path: String },
}

/// Errors from invoking a function.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Transport failure talking to the function service.
    #[error("invocation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The function service rejected the invocation.
    #[error("function service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The function ran and raised an error.
    #[error("function error ({kind}): {message}")]
    Function { kind: String, message: String },

    /// The invocation event could not be encoded.
    #[error("failed to encode invocation event: {0}")]
    Payload(#[from] serde_json::Error),

    /// Any other invoker failure.
    #[error("{0}")]
    Other(String),
}

/// Fetch a configuration blob by path.
#[async_trait]
pub trait ObjectFetch: Send + Sync {
    /// Return the full contents stored at `path`.
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError>;
}

/// Invoke a named function with a byte payload.
#[async_trait]
pub trait FunctionInvoke: Send + Sync {
    /// Call `function` of `service` and return its raw reply.
    async fn invoke(
        &self,
        service: &str,
        function: &str,
        payload: Bytes,
    ) -> Result<Bytes, InvokeError>;
}
