use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Code;

/// The protocol version this crate implements, advertised by the server
/// and checked against every non-empty request version.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Alias for the semver string carried on the wire.
pub type ProtocolVersion = String;

/// A single IPC command, one per newline-delimited JSON line on the
/// `neru.sock` connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Request {
    /// Caller's protocol version. Empty string skips the version check.
    pub version: ProtocolVersion,
    /// The command to run.
    pub action: Action,
    /// Structured parameters, used by mode-activation actions to carry a
    /// pending action name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// Positional arguments, used by `action` (e.g. `--x=N --y=N`, or a
    /// bare action name like `left_click`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Request {
    /// Builds a minimal request with no params or args.
    pub fn new(version: impl Into<String>, action: Action) -> Self {
        Self {
            version: version.into(),
            action,
            params: None,
            args: Vec::new(),
        }
    }
}

/// Recognized IPC command names.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Liveness check; always answers `"pong"`.
    Ping,
    /// Flips the enabled flag on.
    Start,
    /// Flips the enabled flag off.
    Stop,
    /// Activates the Hints mode.
    Hints,
    /// Activates the Grid mode.
    Grid,
    /// Activates the Recursive Grid mode.
    RecursiveGrid,
    /// Activates the Scroll mode.
    Scroll,
    /// Exits to Idle.
    Idle,
    /// Reports current engine status.
    Status,
    /// Returns the active configuration.
    Config,
    /// Reloads configuration from disk.
    ReloadConfig,
    /// Reports a per-service health map.
    Health,
    /// Performs a single pointer operation.
    Action,
    /// Flips `hide-for-screen-share` and notifies subscribers.
    ToggleScreenShare,
}

/// Structured parameters for a mode-activation request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Params {
    /// The pending action to attach to the activated mode, e.g.
    /// `"double_click"`. Absent means the default left click.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// The reply to a [`Request`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Response {
    /// Echoes the server's protocol version.
    pub version: ProtocolVersion,
    /// Whether the command succeeded.
    pub success: bool,
    /// Human-readable detail, e.g. `"pong"` or an error description.
    pub message: String,
    /// Machine-readable result code.
    pub code: Code,
    /// Command-specific payload (status snapshots, health maps, config).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    /// Builds a success response with no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            success: true,
            message: message.into(),
            code: Code::Ok,
            data: None,
        }
    }

    /// Builds a success response carrying `data`.
    pub fn ok_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok(message)
        }
    }

    /// Builds a failure response from an engine error.
    pub fn from_error(err: &crate::Error) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            success: false,
            message: err.to_string(),
            code: err.code(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_json() {
        let req = Request {
            version: "1.0.0".to_string(),
            action: Action::Hints,
            params: Some(Params {
                action: Some("double_click".to_string()),
            }),
            args: Vec::new(),
        };
        let line = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&line).unwrap();
        assert_eq!(back.action, Action::Hints);
        assert_eq!(back.params.unwrap().action.as_deref(), Some("double_click"));
    }

    #[test]
    fn ping_response_is_success() {
        let resp = Response::ok("pong");
        assert!(resp.success);
        assert_eq!(resp.code, Code::Ok);
    }
}
