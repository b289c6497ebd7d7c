//! Upstream integration.
//!
//! # Data Flow
//! ```text
//! Handler
//!     → types.rs (validate TodoPayload into NewTodo / TodoUpdate / delete id)
//!     → client.rs (one HTTP call, credential on writes, deadline)
//!     → Todo or UpstreamError
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::UpstreamClient;
pub use error::{UpstreamError, UpstreamResult};
pub use types::{NewTodo, PayloadError, Todo, TodoPayload, TodoUpdate};
