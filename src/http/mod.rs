//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, body parsing)
//!     → todos.rs / echo.rs / status.rs (handlers)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod echo;
pub mod request;
pub mod response;
pub mod server;
pub mod status;
pub mod todos;

pub use request::{TodoBody, UuidRequestId, X_REQUEST_ID};
pub use response::{GatewayError, Message};
pub use server::{AppState, HttpServer};
