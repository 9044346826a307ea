use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::key::KeyEvent;

/// What a hotkey binding does when triggered: run an internal engine
/// command, or spawn a shell command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// An internal command token, e.g. `"hints left_click"`.
    Internal(String),
    /// A shell command string to execute, e.g. `exec <shell-string>`.
    Exec(String),
}

impl Command {
    /// Parses a binding value of the form `"hints left_click"` or
    /// `"exec open -a Terminal"`.
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix("exec ") {
            Some(rest) => Command::Exec(rest.to_string()),
            None => Command::Internal(spec.to_string()),
        }
    }
}

/// The process-wide map of canonical key string to command, rebuilt on
/// enable, on focus change, and on config reload.
pub type HotkeyBinding = HashMap<KeyEvent, Command>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exec_prefix() {
        assert_eq!(
            Command::parse("exec open -a Terminal"),
            Command::Exec("open -a Terminal".to_string())
        );
    }

    #[test]
    fn parses_internal_token() {
        assert_eq!(
            Command::parse("hints left_click"),
            Command::Internal("hints left_click".to_string())
        );
    }
}
