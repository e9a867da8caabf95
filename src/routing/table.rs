//! Route table loading.
//!
//! # Responsibilities
//! - Fetch the routing document through [`ObjectFetch`]
//! - Parse the JSON array of `{url, name, service}` records
//! - Compile every pattern, then order routes by path segment count
//!
//! # Design Decisions
//! - Ordering is ascending segment count of the source URL; ties keep
//!   document order (stable sort). Shorter patterns are tried first.
//! - A bad pattern fails the whole load, naming the offending URL
//! - Tables are never cached or mutated; see [`AlwaysReload`]

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{FetchError, ObjectFetch};
use crate::routing::pattern::{CompileError, Pattern};

/// Errors loading a route table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The routing document could not be fetched.
    #[error("failed to fetch route table '{path}': {source}")]
    ConfigFetch {
        path: String,
        #[source]
        source: FetchError,
    },

    /// The routing document is not a JSON array of route records.
    #[error("failed to parse route table: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A route's pattern did not compile.
    #[error("failed to compile route '{url}': {source}")]
    RouteCompile {
        url: String,
        #[source]
        source: CompileError,
    },
}

/// One record of the routing document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteRecord {
    /// Route pattern.
    pub url: String,
    /// Function name.
    pub name: String,
    /// Service the function belongs to.
    pub service: String,
}

/// A compiled route bound to a backend function.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: Pattern,
    service_name: String,
    function_name: String,
}

impl Route {
    /// Compile a route from its document record.
    pub fn compile(record: RouteRecord) -> Result<Self, LoadError> {
        let pattern = Pattern::compile(&record.url).map_err(|source| LoadError::RouteCompile {
            url: record.url.clone(),
            source,
        })?;

        Ok(Self {
            pattern,
            service_name: record.service,
            function_name: record.name,
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The URL pattern as written in the routing document.
    pub fn original_url(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Number of `/`-separated pieces in the original URL.
    pub fn segment_count(&self) -> usize {
        segment_count(self.original_url())
    }
}

/// Number of pieces `url` splits into on `/` (`"/a/b"` is 3, `""` is 1).
pub fn segment_count(url: &str) -> usize {
    url.split('/').count()
}

/// Routes ordered for matching.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from document records.
    pub fn from_records(records: Vec<RouteRecord>) -> Result<Self, LoadError> {
        let mut routes = records
            .into_iter()
            .map(Route::compile)
            .collect::<Result<Vec<_>, _>>()?;

        // sort_by_key is stable: equal counts keep document order.
        routes.sort_by_key(Route::segment_count);

        Ok(Self { routes })
    }

    /// Parse and compile a routing document.
    pub fn from_json(document: &[u8]) -> Result<Self, LoadError> {
        let records: Vec<RouteRecord> = serde_json::from_slice(document)?;
        Self::from_records(records)
    }

    /// Fetch `path` from `store` and build a table from it.
    pub async fn load(path: &str, store: &dyn ObjectFetch) -> Result<Self, LoadError> {
        let document = store
            .fetch(path)
            .await
            .map_err(|source| LoadError::ConfigFetch {
                path: path.to_string(),
                source,
            })?;

        let table = Self::from_json(&document)?;
        tracing::debug!(path = %path, routes = table.len(), "Route table loaded");
        Ok(table)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Supplies a route table for one dispatch cycle.
#[async_trait]
pub trait RouteTableSource: Send + Sync {
    async fn route_table(&self) -> Result<RouteTable, LoadError>;
}

/// Reloads the routing document on every call.
pub struct AlwaysReload {
    store: Arc<dyn ObjectFetch>,
    path: String,
}

impl AlwaysReload {
    pub fn new(store: Arc<dyn ObjectFetch>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl RouteTableSource for AlwaysReload {
    async fn route_table(&self) -> Result<RouteTable, LoadError> {
        RouteTable::load(&self.path, self.store.as_ref()).await
    }
}
