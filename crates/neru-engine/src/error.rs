//! Crate-local result alias.
//!
//! The error taxonomy itself lives in `neru-protocol` so the engine, the
//! IPC dispatcher and wire responses all share one set of variants and one
//! mapping to response codes.
pub use neru_protocol::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
