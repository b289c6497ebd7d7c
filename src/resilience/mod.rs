//! Resilience subsystem.
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - No retries or backoff: a failed upstream call is reported to the client as-is

pub mod timeouts;
