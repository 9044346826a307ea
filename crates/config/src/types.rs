//! The resolved configuration tree and its TOML field defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default alphabet for hint labels: a full lower-case run, cheapest to
/// read and type.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

fn default_true() -> bool {
    true
}

fn default_hint_characters() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_clickable_roles() -> Vec<String> {
    vec![
        "AXButton".to_string(),
        "AXLink".to_string(),
        "AXCheckBox".to_string(),
        "AXRadioButton".to_string(),
        "AXMenuItem".to_string(),
        "AXMenuButton".to_string(),
        "AXPopUpButton".to_string(),
        "AXTextField".to_string(),
        "AXStaticText".to_string(),
    ]
}

fn default_grid_characters() -> String {
    "asdfghjkl".to_string()
}

fn default_recursive_grid_size() -> u8 {
    3
}

fn default_pixel_threshold() -> u32 {
    2
}

fn default_scroll_step() -> u32 {
    60
}

fn default_scroll_step_half() -> u32 {
    300
}

fn default_scroll_step_full() -> u32 {
    10_000
}

fn default_logging_level() -> String {
    "info".to_string()
}

/// `[general]`: daemon-wide behavior and the app exclusion list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct General {
    /// Save the cursor position on mode entry and restore it on exit.
    pub restore_cursor_position: bool,
    /// Verify the Accessibility permission at startup and exit fatally if
    /// it's missing.
    pub accessibility_check_on_start: bool,
    /// Hide overlay windows while screen sharing is detected.
    pub hide_overlay_in_screen_share: bool,
    /// Bundle identifiers the Focus Watcher treats as exclusion targets.
    pub excluded_apps: Vec<String>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            restore_cursor_position: true,
            accessibility_check_on_start: true,
            hide_overlay_in_screen_share: false,
            excluded_apps: Vec::new(),
        }
    }
}

/// `[hints]`: the Hints Router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Hints {
    /// Whether the Hints Router is reachable from the hotkey table.
    pub enabled: bool,
    /// Alphabet labels are drawn from, most-significant digit first.
    #[serde(default = "default_hint_characters")]
    pub hint_characters: String,
    /// AX roles collected as clickable targets.
    #[serde(default = "default_clickable_roles")]
    pub clickable_roles: Vec<String>,
    /// Include the menu bar's items in collection.
    pub include_menubar: bool,
    /// Include the Dock's items in collection.
    pub include_dock: bool,
    /// Include Notification Center's items in collection.
    pub include_notification_center: bool,
    /// Extra menu-bar-hosted app bundle ids to collect from (e.g. status
    /// bar extras System UI Server owns on an app's behalf).
    pub additional_menubar_targets: Vec<String>,
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            enabled: true,
            hint_characters: default_hint_characters(),
            clickable_roles: default_clickable_roles(),
            include_menubar: false,
            include_dock: false,
            include_notification_center: false,
            additional_menubar_targets: Vec::new(),
        }
    }
}

/// `[grid]`: the Grid Router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Grid {
    /// Whether the Grid Router is reachable from the hotkey table.
    pub enabled: bool,
    /// Alphabet for the top-level row/column addressing.
    #[serde(default = "default_grid_characters")]
    pub characters: String,
    /// Alphabet for the subgrid cell addressing; falls back to
    /// `characters`, then to [`DEFAULT_ALPHABET`], when empty.
    pub sublayer_keys: Option<String>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            enabled: true,
            characters: default_grid_characters(),
            sublayer_keys: None,
        }
    }
}

impl Grid {
    /// Resolves the effective subgrid alphabet per the fallback chain.
    pub fn effective_sublayer_keys(&self) -> &str {
        match self.sublayer_keys.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ if !self.characters.is_empty() => &self.characters,
            _ => DEFAULT_ALPHABET,
        }
    }
}

/// `[recursive_grid]`: the Recursive Grid Router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct RecursiveGrid {
    /// Whether the Recursive Grid Router is reachable from the hotkey table.
    pub enabled: bool,
    /// Quadrant count per subdivision step, 2..=8.
    #[serde(default = "default_recursive_grid_size")]
    pub size: u8,
    /// Stop subdividing once the shorter side of the frame is at or below
    /// this many pixels.
    #[serde(default = "default_pixel_threshold")]
    pub pixel_threshold: u32,
}

impl Default for RecursiveGrid {
    fn default() -> Self {
        Self {
            enabled: true,
            size: default_recursive_grid_size(),
            pixel_threshold: default_pixel_threshold(),
        }
    }
}

/// `[scroll]`: the Scroll Router's step sizes, in scroll-wheel line units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Scroll {
    /// Step size for a single `j`/`k`/`h`/`l` press.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u32,
    /// Step size for a half-page scroll.
    #[serde(default = "default_scroll_step_half")]
    pub scroll_step_half: u32,
    /// Step size for a full-page (top/bottom) scroll.
    #[serde(default = "default_scroll_step_full")]
    pub scroll_step_full: u32,
}

impl Default for Scroll {
    fn default() -> Self {
        Self {
            scroll_step: default_scroll_step(),
            scroll_step_half: default_scroll_step_half(),
            scroll_step_full: default_scroll_step_full(),
        }
    }
}

/// `[hotkeys]`: the global hotkey table, canonical key string to action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Hotkeys {
    /// Raw key-string to action-string bindings, as written in the file.
    /// Canonicalized and parsed into [`neru_protocol::HotkeyBinding`] by
    /// [`crate::Config::hotkey_bindings`].
    pub bindings: HashMap<String, String>,
}

/// `[metrics]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Metrics {
    /// Whether metrics collection is enabled. Not implemented by this
    /// system; carried as a recognized, inert key.
    pub enabled: bool,
}

/// `[logging]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Logging {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"info"` or
    /// `"neru_engine=debug"`.
    #[serde(default = "default_logging_level")]
    pub level: String,
    /// Optional log file path; stderr only when absent.
    pub file: Option<String>,
    /// Rotation policy for `file`: `"daily"`, `"hourly"`, or `"never"`.
    pub rotation: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            file: None,
            rotation: None,
        }
    }
}

/// The fully resolved configuration tree: one field per §6 table, each
/// filled with its documented default when the file omits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// `[general]`.
    pub general: General,
    /// `[hints]`.
    pub hints: Hints,
    /// `[grid]`.
    pub grid: Grid,
    /// `[recursive_grid]`.
    pub recursive_grid: RecursiveGrid,
    /// `[scroll]`.
    pub scroll: Scroll,
    /// `[hotkeys]`.
    pub hotkeys: Hotkeys,
    /// `[metrics]`.
    pub metrics: Metrics,
    /// `[logging]`.
    pub logging: Logging,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_resolves_to_documented_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.general.restore_cursor_position);
        assert_eq!(cfg.scroll.scroll_step, 60);
        assert_eq!(cfg.scroll.scroll_step_half, 300);
        assert_eq!(cfg.scroll.scroll_step_full, 10_000);
    }

    #[test]
    fn grid_sublayer_keys_falls_back_to_characters_then_default_alphabet() {
        let mut grid = Grid {
            characters: "xyz".to_string(),
            ..Default::default()
        };
        assert_eq!(grid.effective_sublayer_keys(), "xyz");
        grid.characters = String::new();
        assert_eq!(grid.effective_sublayer_keys(), DEFAULT_ALPHABET);
        grid.sublayer_keys = Some("qwe".to_string());
        assert_eq!(grid.effective_sublayer_keys(), "qwe");
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = toml::from_str::<Config>("bogus = true").unwrap_err();
        assert!(err.message().contains("unknown field"));
    }
}
