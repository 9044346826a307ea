use serde::{Deserialize, Serialize};

/// A screen-space rectangle, origin at the top-left of the primary screen,
/// units in points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, always non-negative.
    pub w: f64,
    /// Height, always non-negative.
    pub h: f64,
}

impl Rect {
    /// Builds a rect from its edges.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The rect's center point.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether `(px, py)` falls within the rect, edges inclusive.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    /// The length of the rect's shorter side.
    pub fn min_side(&self) -> f64 {
        self.w.min(self.h)
    }
}

/// A foreground application, identified the way the focus watcher and the
/// exclusion list both key on: bundle identifier.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// Platform bundle identifier, e.g. `"com.apple.finder"`.
    pub bundle_id: String,
    /// Process id, when known.
    pub pid: Option<i32>,
}

/// A clickable target produced by the accessibility collector.
///
/// Lifetime is one mode activation: the set is invalidated and dropped on
/// mode exit, never carried across activations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    /// Screen-space bounds of the element.
    pub bounds: Rect,
    /// Accessibility role, e.g. `"AXButton"`.
    pub role: String,
    /// Owning application's bundle identifier, when available.
    pub bundle_id: Option<String>,
    /// A stable-ish identifier for the containing window or frame, when
    /// the platform exposes one.
    pub frame_id: Option<String>,
}

/// Filter configuration for a Hints-router element collection request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectFilter {
    /// Include items from the menu bar.
    pub include_menubar: bool,
    /// Include items from the Dock.
    pub include_dock: bool,
    /// Include items from the notification center.
    pub include_notification_center: bool,
    /// Extra menu-bar item titles to include even when `include_menubar` is
    /// false (e.g. a specific status-bar extra).
    pub additional_menubar_targets: Vec<String>,
    /// Accessibility roles considered clickable targets.
    pub clickable_roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_inclusive_bounds() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(10.0, 10.0));
        assert!(!r.contains(10.1, 5.0));
    }

    #[test]
    fn rect_center_is_midpoint() {
        let r = Rect::new(10.0, 20.0, 4.0, 8.0);
        assert_eq!(r.center(), (12.0, 24.0));
    }
}
