//! Loads and validates neru's TOML configuration.
#![warn(missing_docs)]

use std::{env, path::PathBuf};

mod error;
mod loader;
mod types;

pub use error::Error;
pub use loader::{load_from_path, load_from_str};
pub use types::{
    Config, General, Grid, Hints, Hotkeys, Logging, Metrics, RecursiveGrid, Scroll,
    DEFAULT_ALPHABET,
};

impl Config {
    /// Canonicalizes and parses every `[hotkeys.bindings]` entry into the
    /// engine's binding table. Entries that fail canonicalization have
    /// already been rejected by [`load_from_str`]'s validation pass, so
    /// this only re-derives the canonical form.
    pub fn hotkey_bindings(&self) -> neru_protocol::HotkeyBinding {
        self.hotkeys
            .bindings
            .iter()
            .filter_map(|(raw, action)| {
                neru_protocol::canonicalize(raw)
                    .map(|key| (key, neru_protocol::Command::parse(action)))
            })
            .collect()
    }
}

/// The XDG-preferred config path, `$XDG_CONFIG_HOME/neru/config.toml` or
/// `~/.config/neru/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("neru");
        p.push("config.toml");
        return p;
    }
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".config");
    p.push("neru");
    p.push("config.toml");
    p
}

/// The legacy fallback path, `~/.neru/config.toml`.
pub fn legacy_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".neru");
    p.push("config.toml");
    p
}

/// Resolves the effective config path.
///
/// Policy:
/// 1. Use `explicit` when provided.
/// 2. Else use [`default_config_path`] when it exists.
/// 3. Else use [`legacy_config_path`] when it exists.
/// 4. Else fall back to a default-valued `Config` with no file: callers
///    that want strict "must have a file" behavior check existence
///    themselves before calling [`load_from_path`].
pub fn resolve_config_path(explicit: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let preferred = default_config_path();
    if preferred.exists() {
        return Some(preferred);
    }
    let legacy = legacy_config_path();
    if legacy.exists() {
        return Some(legacy);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotkey_bindings_canonicalizes_raw_keys() {
        let mut cfg = Config::default();
        cfg.hotkeys
            .bindings
            .insert("SHIFT+cmd+H".to_string(), "hints".to_string());
        let bindings = cfg.hotkey_bindings();
        assert_eq!(
            bindings.get("cmd+shift+h"),
            Some(&neru_protocol::Command::Internal("hints".to_string()))
        );
    }
}
