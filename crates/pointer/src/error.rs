//! Error types and result alias for mouse-event synthesis.
use std::result::Result as StdResult;

use thiserror::Error;

/// Crate-local `Result` alias.
pub type Result<T> = StdResult<T, Error>;

/// Errors that can occur while synthesizing or posting a mouse event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Failure creating a CoreGraphics event source.
    #[error("Failed to create CGEventSource")]
    EventSource,
    /// Failure creating a CoreGraphics mouse or scroll event.
    #[error("Failed to create {0} event")]
    EventCreate(&'static str),
    /// Required Accessibility permission is missing.
    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),
    /// `drag_end` was called with no drag held.
    #[error("no drag is currently held")]
    NoDragHeld,
    /// Reading the current cursor position failed.
    #[error("failed to read cursor position: {0}")]
    CursorQuery(String),
}
