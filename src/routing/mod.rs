//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Routing document (JSON, fetched per request)
//!     → table.rs (parse records, compile patterns, stable sort by segment count)
//!     → pattern.rs (`?` → single-segment wildcard, unanchored regex)
//!     → router.rs (first route whose pattern occurs in the request URI)
//!     → Return: matched Route or None
//! ```
//!
//! # Design Decisions
//! - Tables are rebuilt for every request and never shared
//! - Deterministic: same table and URI always match the same route
//! - First match wins, least specific routes first

pub mod pattern;
pub mod router;
pub mod table;

pub use pattern::{CompileError, Pattern};
pub use router::match_route;
pub use table::{AlwaysReload, LoadError, Route, RouteRecord, RouteTable, RouteTableSource};
