//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (reject origins outside the allow-list)
//!     → handler parses path and body
//!     → rate_limit.rs (take a token from the shared bucket)
//!     → validation and forwarding
//! ```
//!
//! # Design Decisions
//! - One bucket per process, owned by the composition root
//! - Denied requests never reach the upstream
//! - Every response carries an allow-origin header

pub mod cors;
pub mod rate_limit;

pub use cors::{origin_policy_middleware, OriginPolicy};
pub use rate_limit::{BucketSnapshot, TokenBucket};
