//! Serverless HTTP gateway library.
//!
//! Resolves each inbound request to a backend function through a routing
//! document held in an object store, invokes the function with a JSON event
//! and replays its reply as the HTTP response.

pub mod backend;
pub mod config;
pub mod event;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::{Dispatcher, HttpServer};
pub use lifecycle::Shutdown;
