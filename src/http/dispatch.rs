//! Request dispatch.
//!
//! # States
//! ```text
//! Start        → load route table       ✗ 500 "router compile failed"
//! Routed?      → first matching route   ✗ 404 "lambda not found"
//! ReadBody     → buffer request body    ✗ 400 "bad request body"
//! BuildEvent   → InvocationEvent bytes  (cannot fail)
//! Invoke       → FunctionInvoke         ✗ 500 "invoke function failed"
//! DecodeReply  → InvocationResult       ✗ 502 "unmarshal resp from function failed"
//! WriteResponse→ reply code, headers, body
//! ```
//!
//! # Design Decisions
//! - Every step runs in order inside one request; nothing survives it
//! - The first failing step ends the dispatch; no retries, no partial replies
//! - Errors stop here: each becomes a status code plus a log record
//! - The dispatcher sets no deadline of its own

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::backend::{
    ClientError, FsObjectStore, FunctionInvoke, HttpFunctionInvoker, HttpObjectStore,
    InvokeError, ObjectFetch,
};
use crate::config::{GatewayConfig, ObjectStoreConfig};
use crate::event::{self, DecodeError};
use crate::http::response::write_response;
use crate::observability::metrics;
use crate::routing::{AlwaysReload, LoadError, RouteTableSource};

/// Default request body ceiling, matching the function payload limit.
pub const DEFAULT_MAX_BODY_SIZE: usize = 6 * 1024 * 1024;

/// Why a dispatch stopped before the function's reply was written.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The route table could not be fetched, parsed or compiled.
    #[error("router compile failed: {0}")]
    RouteTable(#[source] LoadError),

    /// No route matched the request URI.
    #[error("lambda not found for {uri}")]
    RouteNotFound { uri: String },

    /// The request body could not be read.
    #[error("bad request body: {0}")]
    RequestBody(#[source] axum::Error),

    /// The function could not be invoked.
    #[error("invoke {service}/{function} failed: {source}")]
    Invocation {
        service: String,
        function: String,
        #[source]
        source: InvokeError,
    },

    /// The function replied with something other than `{code, headers, data}`.
    #[error("unmarshal resp from function failed: {0}")]
    ResponseDecode(#[source] DecodeError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteTable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::RequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Invocation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResponseDecode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Fixed message sent to the client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::RouteTable(_) => "router compile failed",
            Self::RouteNotFound { .. } => "lambda not found",
            Self::RequestBody(_) => "bad request body",
            Self::Invocation { .. } => "invoke function failed",
            Self::ResponseDecode(_) => "unmarshal resp from function failed",
        }
    }

    /// Metrics label for the terminal state.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::RouteTable(_) => "route_table_error",
            Self::RouteNotFound { .. } => "not_found",
            Self::RequestBody(_) => "bad_body",
            Self::Invocation { .. } => "invoke_error",
            Self::ResponseDecode(_) => "decode_error",
        }
    }

    fn log(&self) {
        match self {
            Self::RouteTable(e) => tracing::error!(error = %e, "router compile failed"),
            Self::RouteNotFound { uri } => tracing::warn!(uri = %uri, "lambda not found"),
            Self::RequestBody(e) => tracing::warn!(error = %e, "bad request body"),
            Self::Invocation {
                service,
                function,
                source,
            } => tracing::error!(
                service = %service,
                function = %function,
                error = %source,
                "invoke function failed"
            ),
            Self::ResponseDecode(e) => {
                tracing::error!(error = %e, "unmarshal resp from function failed")
            }
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

/// Runs the load → route → invoke → respond cycle for each request.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<dyn RouteTableSource>,
    invoker: Arc<dyn FunctionInvoke>,
    max_body_size: usize,
}

impl Dispatcher {
    pub fn new(routes: Arc<dyn RouteTableSource>, invoker: Arc<dyn FunctionInvoke>) -> Self {
        Self {
            routes,
            invoker,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Dispatcher that reloads the routing document at `routes_path` from `store`.
    pub fn with_store(
        store: Arc<dyn ObjectFetch>,
        routes_path: impl Into<String>,
        invoker: Arc<dyn FunctionInvoke>,
    ) -> Self {
        Self::new(Arc::new(AlwaysReload::new(store, routes_path)), invoker)
    }

    /// Build the object store and invoker described by `config`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ClientError> {
        let store: Arc<dyn ObjectFetch> = match &config.object_store {
            ObjectStoreConfig::Fs { root } => Arc::new(FsObjectStore::new(root)),
            ObjectStoreConfig::Http { bucket, endpoint } => Arc::new(HttpObjectStore::new(
                &crate::config::schema::service_url(bucket, endpoint),
                config.timeouts.fetch(),
            )?),
        };
        let invoker = Arc::new(HttpFunctionInvoker::new(
            &config.invoker.base_url(),
            config.invoker.api_version.clone(),
            config.timeouts.invoke(),
        )?);

        Ok(Self::with_store(store, config.routes.path.clone(), invoker)
            .with_max_body_size(config.listener.max_body_size))
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Run one dispatch cycle.
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response, DispatchError> {
        let uri = event::request_uri(request.uri());

        let table = self
            .routes
            .route_table()
            .await
            .map_err(DispatchError::RouteTable)?;

        let route = table
            .match_uri(&uri)
            .ok_or_else(|| DispatchError::RouteNotFound { uri: uri.clone() })?;
        tracing::debug!(
            pattern = %route.original_url(),
            service = %route.service_name(),
            function = %route.function_name(),
            "Route matched"
        );

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(DispatchError::RequestBody)?;

        let invocation_failed = |source| DispatchError::Invocation {
            service: route.service_name().to_string(),
            function: route.function_name().to_string(),
            source,
        };

        let payload = event::to_event(&parts.method, &parts.uri, &parts.headers, body)
            .to_payload()
            .map_err(|e| invocation_failed(InvokeError::Payload(e)))?;
        tracing::debug!(event = %String::from_utf8_lossy(&payload), "Invocation event");

        metrics::record_invocation(route.service_name(), route.function_name());
        let reply = self
            .invoker
            .invoke(route.service_name(), route.function_name(), payload)
            .await
            .map_err(invocation_failed)?;

        let result = event::from_reply(&reply).map_err(|e| {
            tracing::info!(reply = %String::from_utf8_lossy(&reply), "Undecodable function reply");
            DispatchError::ResponseDecode(e)
        })?;

        Ok(write_response(result))
    }

    /// Run one dispatch cycle and map any failure to its status code.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();

        match self.dispatch(request).await {
            Ok(response) => {
                metrics::record_request(&method, response.status().as_u16(), "success", start);
                response
            }
            Err(e) => {
                e.log();
                metrics::record_request(&method, e.status().as_u16(), e.outcome(), start);
                e.into_response()
            }
        }
    }
}

/// Axum handler for every method and path.
pub async fn dispatch_handler(
    State(dispatcher): State<Dispatcher>,
    request: Request<Body>,
) -> Response {
    dispatcher.handle(request).await
}
