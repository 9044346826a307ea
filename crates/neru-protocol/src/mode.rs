use serde::{Deserialize, Serialize};

/// The engine's current activity. Exactly one variant is live at a time;
/// transitions are serialized through the mode engine's command queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No router is live; the key-event tap is disabled.
    Idle,
    /// Labelled-target selection over clickable elements.
    Hints,
    /// Two-level row/column grid subdivision.
    Grid,
    /// Repeated quadrant subdivision down to a pixel threshold.
    RecursiveGrid,
    /// Vim-style scroll key map, held open until exited explicitly.
    Scroll,
    /// A single one-shot pointer operation with no target selection.
    Action,
}

impl Mode {
    /// Whether this mode paints an overlay and consumes the key tap.
    ///
    /// `Action` resolves synchronously without ever becoming "current" in a
    /// way that shows on screen, but it is still tracked as non-idle while
    /// the pointer operation is in flight.
    pub fn is_idle(self) -> bool {
        matches!(self, Mode::Idle)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Idle
    }
}

/// The pointer operation performed when a Hints/Grid/RecursiveGrid target
/// resolves. Absent means the default: a single left click.
pub type PendingAction = Option<String>;
