//! Route lookup.
//!
//! # Responsibilities
//! - Walk a [`RouteTable`] in stored order
//! - Return the first route whose pattern occurs in the request URI
//!
//! # Design Decisions
//! - Linear scan, first match wins: deterministic for a fixed table and URI
//! - Tables are ordered least-specific first and patterns are unanchored, so
//!   a short pattern can shadow a longer one that also matches
//! - No match is `None`, not an error

use crate::routing::table::{Route, RouteTable};

/// Find the first route in `table` matching `request_uri`.
pub fn match_route<'a>(table: &'a RouteTable, request_uri: &str) -> Option<&'a Route> {
    table
        .routes()
        .iter()
        .find(|route| route.pattern().matches(request_uri))
}

impl RouteTable {
    /// See [`match_route`].
    pub fn match_uri(&self, request_uri: &str) -> Option<&Route> {
        match_route(self, request_uri)
    }
}
