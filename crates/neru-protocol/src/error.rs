use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire-level result code carried in an IPC response.
///
/// Serializes as its bare name (`"ErrTimeout"`, `"OK"`, ...) so the JSON on
/// the wire matches the external interface's error taxonomy exactly.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Code {
    /// Request succeeded.
    #[serde(rename = "OK")]
    Ok,
    /// `action` named a command the dispatcher does not recognize.
    ErrUnknownCommand,
    /// A `stop`-only or mode-activation action was sent while disabled.
    ErrNotRunning,
    /// `start` was sent while already enabled.
    ErrAlreadyRunning,
    /// The requested mode is disabled in configuration.
    ErrModeDisabled,
    /// Malformed request parameters; no side effects occurred.
    ErrInvalidInput,
    /// Pointer synthesis reported failure.
    ErrActionFailed,
    /// A synchronous-adapter call exceeded its internal timeout.
    ErrTimeout,
    /// The request's protocol version did not match the server's.
    ErrVersionMismatch,
    /// An internal error with no more specific IPC-visible cause, surfaced
    /// only when it escapes directly from a command handler.
    ErrInternal,
}

/// The engine-internal error taxonomy.
///
/// Propagation policy: every variant is either absorbed locally (one
/// hotkey registration failing) or promoted to a mode exit (any error
/// during activation or resolve). Nothing here crashes the process; fatal
/// startup conditions are handled before the engine exists.
#[derive(Error, Clone, Debug)]
pub enum Error {
    /// Configuration failed validation; the reload is aborted and the
    /// current configuration is retained.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The OS accessibility permission has not been granted.
    #[error("accessibility permission not granted")]
    AccessibilityDenied,
    /// A collect, read, or synthesize call into the accessibility adapter
    /// failed; the current router aborts.
    #[error("accessibility call failed: {0}")]
    AccessibilityFailed(String),
    /// A window create or draw call failed; mode activation aborts back to
    /// Idle.
    #[error("overlay operation failed: {0}")]
    OverlayFailed(String),
    /// One hotkey binding failed to register; that binding is dropped,
    /// others continue.
    #[error("failed to register hotkey {0}: {1}")]
    HotkeyRegisterFailed(String, String),
    /// IPC transport, decode, or encode failure.
    #[error("IPC failure: {0}")]
    IpcFailed(String),
    /// A request's arguments were malformed; no side effects occurred.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Pointer synthesis reported failure; the engine exits to Idle.
    #[error("action failed: {0}")]
    ActionFailed(String),
    /// A synchronous adapter call exceeded its internal timeout.
    #[error("operation timed out")]
    Timeout,
    /// Request protocol version did not match the server's.
    #[error("protocol version mismatch")]
    VersionMismatch,
    /// Action required the daemon to be enabled, but it is not.
    #[error("not running")]
    NotRunning,
    /// `start` requested while already enabled.
    #[error("already running")]
    AlreadyRunning,
    /// The requested mode is disabled in configuration.
    #[error("mode disabled in configuration")]
    ModeDisabled,
    /// An unclassified internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Maps this error onto the wire-level response code.
    pub fn code(&self) -> Code {
        match self {
            Error::InvalidConfig(_) | Error::InvalidInput(_) => Code::ErrInvalidInput,
            Error::ActionFailed(_) => Code::ErrActionFailed,
            Error::Timeout => Code::ErrTimeout,
            Error::VersionMismatch => Code::ErrVersionMismatch,
            Error::NotRunning => Code::ErrNotRunning,
            Error::AlreadyRunning => Code::ErrAlreadyRunning,
            Error::ModeDisabled => Code::ErrModeDisabled,
            Error::AccessibilityDenied
            | Error::AccessibilityFailed(_)
            | Error::OverlayFailed(_)
            | Error::HotkeyRegisterFailed(_, _)
            | Error::IpcFailed(_)
            | Error::Internal(_) => Code::ErrInternal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_serializes_to_external_names() {
        assert_eq!(serde_json::to_string(&Code::Ok).unwrap(), "\"OK\"");
        assert_eq!(
            serde_json::to_string(&Code::ErrTimeout).unwrap(),
            "\"ErrTimeout\""
        );
    }

    #[test]
    fn timeout_maps_to_err_timeout() {
        assert_eq!(Error::Timeout.code(), Code::ErrTimeout);
    }
}
