//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace layer)
//!     → request.rs (request ID span)
//!     → dispatch.rs (route table → route → event → invoke → decode)
//!     → response.rs (reply code, headers, body)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{DispatchError, Dispatcher};
pub use request::{request_id, X_REQUEST_ID};
pub use server::HttpServer;
