//! Synthesizes mouse clicks, drags, and scrolls on macOS.
//!
//! A `Pointer` posts CGEvents to the HID event system: clicks and drags at
//! an absolute screen point, and line-unit scroll wheel events. Pointer
//! moves that don't need hardware-accurate tracking (jumping the cursor to
//! a hint or grid cell before a click) go through `mac-winops::warp_cursor`
//! instead, which this crate does not duplicate.
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

mod error;

use std::sync::Arc;

use core_graphics::event::{self as cge, CGEventSource, CGEventSourceStateID};
use parking_lot::Mutex;
use tracing::{info, trace, warn};

pub use error::{Error, Result};

/// Which mouse button an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// The primary (left) button.
    Left,
    /// The secondary (right) button.
    Right,
    /// The middle button.
    Middle,
}

impl MouseButton {
    fn cg_button(self) -> cge::CGMouseButton {
        match self {
            MouseButton::Left => cge::CGMouseButton::Left,
            MouseButton::Right => cge::CGMouseButton::Right,
            MouseButton::Middle => cge::CGMouseButton::Center,
        }
    }

    fn down_type(self) -> cge::CGEventType {
        match self {
            MouseButton::Left => cge::CGEventType::LeftMouseDown,
            MouseButton::Right => cge::CGEventType::RightMouseDown,
            MouseButton::Middle => cge::CGEventType::OtherMouseDown,
        }
    }

    fn up_type(self) -> cge::CGEventType {
        match self {
            MouseButton::Left => cge::CGEventType::LeftMouseUp,
            MouseButton::Right => cge::CGEventType::RightMouseUp,
            MouseButton::Middle => cge::CGEventType::OtherMouseUp,
        }
    }

    fn dragged_type(self) -> cge::CGEventType {
        match self {
            MouseButton::Left => cge::CGEventType::LeftMouseDragged,
            MouseButton::Right => cge::CGEventType::RightMouseDragged,
            MouseButton::Middle => cge::CGEventType::OtherMouseDragged,
        }
    }
}

pub(crate) trait Poster: Send + Sync {
    fn post_down(&self, point: (f64, f64), button: MouseButton) -> Result<()>;
    fn post_up(&self, point: (f64, f64), button: MouseButton) -> Result<()>;
    fn post_dragged(&self, point: (f64, f64), button: MouseButton) -> Result<()>;
    fn post_click(&self, point: (f64, f64), button: MouseButton, click_count: i64) -> Result<()>;
    fn post_move(&self, point: (f64, f64)) -> Result<()>;
    fn post_scroll(&self, delta_x: i32, delta_y: i32) -> Result<()>;
}

struct MacPoster {
    /// When true, do not set the HOTK_TAG on injected events so upstream
    /// taps can observe them (used by tools/smoketests).
    untagged: bool,
}

impl MacPoster {
    fn source(&self) -> Result<CGEventSource> {
        CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| {
            if !permissions::accessibility_ok() {
                warn!("accessibility_permission_missing_for_event_source");
                Error::PermissionDenied("Accessibility")
            } else {
                Error::EventSource
            }
        })
    }

    fn tag(&self, e: &cge::CGEvent) {
        if !self.untagged {
            e.set_integer_value_field(cge::EventField::EVENT_SOURCE_USER_DATA, eventtag::HOTK_TAG);
        }
    }

    fn mouse_event(
        &self,
        point: (f64, f64),
        event_type: cge::CGEventType,
        button: MouseButton,
        click_count: i64,
    ) -> Result<cge::CGEvent> {
        let source = self.source()?;
        let cgpoint = core_graphics::geometry::CGPoint::new(point.0, point.1);
        let e = cge::CGEvent::new_mouse_event(source, event_type, cgpoint, button.cg_button())
            .map_err(|_| {
                if !permissions::accessibility_ok() {
                    warn!("accessibility_permission_missing_for_event_create");
                    Error::PermissionDenied("Accessibility")
                } else {
                    Error::EventCreate("mouse")
                }
            })?;
        if click_count > 0 {
            e.set_integer_value_field(cge::EventField::MOUSE_EVENT_CLICK_STATE, click_count);
        }
        self.tag(&e);
        Ok(e)
    }
}

impl Poster for MacPoster {
    fn post_down(&self, point: (f64, f64), button: MouseButton) -> Result<()> {
        trace!(?point, ?button, "post_down");
        let e = self.mouse_event(point, button.down_type(), button, 1)?;
        e.post(cge::CGEventTapLocation::HID);
        Ok(())
    }

    fn post_up(&self, point: (f64, f64), button: MouseButton) -> Result<()> {
        trace!(?point, ?button, "post_up");
        let e = self.mouse_event(point, button.up_type(), button, 1)?;
        e.post(cge::CGEventTapLocation::HID);
        Ok(())
    }

    fn post_dragged(&self, point: (f64, f64), button: MouseButton) -> Result<()> {
        trace!(?point, ?button, "post_dragged");
        let e = self.mouse_event(point, button.dragged_type(), button, 0)?;
        e.post(cge::CGEventTapLocation::HID);
        Ok(())
    }

    fn post_click(&self, point: (f64, f64), button: MouseButton, click_count: i64) -> Result<()> {
        trace!(?point, ?button, click_count, "post_click");
        let down = self.mouse_event(point, button.down_type(), button, click_count)?;
        down.post(cge::CGEventTapLocation::HID);
        let up = self.mouse_event(point, button.up_type(), button, click_count)?;
        up.post(cge::CGEventTapLocation::HID);
        info!(?point, ?button, click_count, "synthesized_click");
        Ok(())
    }

    fn post_move(&self, point: (f64, f64)) -> Result<()> {
        let e = self.mouse_event(point, cge::CGEventType::MouseMoved, MouseButton::Left, 0)?;
        e.post(cge::CGEventTapLocation::HID);
        Ok(())
    }

    fn post_scroll(&self, delta_x: i32, delta_y: i32) -> Result<()> {
        trace!(delta_x, delta_y, "post_scroll");
        let source = self.source()?;
        let e = cge::CGEvent::new_scroll_event(
            source,
            cge::ScrollEventUnit::LINE,
            2,
            delta_y,
            delta_x,
            0,
        )
        .map_err(|_| {
            if !permissions::accessibility_ok() {
                warn!("accessibility_permission_missing_for_event_create");
                Error::PermissionDenied("Accessibility")
            } else {
                Error::EventCreate("scroll")
            }
        })?;
        self.tag(&e);
        e.post(cge::CGEventTapLocation::HID);
        Ok(())
    }
}

/// Synthesizes clicks, drags and scrolls at a screen point, holding at most
/// one drag at a time.
pub struct Pointer {
    poster: Arc<dyn Poster>,
    held_drag: Mutex<Option<MouseButton>>,
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pointer {
    /// Creates a pointer that tags its synthetic events with `HOTK_TAG`.
    pub fn new() -> Self {
        Self {
            poster: Arc::new(MacPoster { untagged: false }),
            held_drag: Mutex::new(None),
        }
    }

    /// Creates a pointer that does NOT tag events with `HOTK_TAG`. Used by
    /// tools/smoketests to drive input like a real user.
    pub fn new_unlabeled() -> Self {
        Self {
            poster: Arc::new(MacPoster { untagged: true }),
            held_drag: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn new_with_poster(poster: Arc<dyn Poster>) -> Self {
        Self {
            poster,
            held_drag: Mutex::new(None),
        }
    }

    /// Creates a pointer with a mock poster that performs no real event
    /// synthesis, for use in tests and non-macOS tooling.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_with_mock_poster() -> Self {
        Self {
            poster: Arc::new(MockPoster),
            held_drag: Mutex::new(None),
        }
    }

    /// Moves the cursor to `point` without pressing a button.
    pub fn move_to(&self, point: (f64, f64)) -> Result<()> {
        self.poster.post_move(point)
    }

    /// Moves the cursor by `(dx, dy)` relative to its current position.
    pub fn move_by(&self, dx: f64, dy: f64) -> Result<()> {
        let (x, y) = mac_winops::cursor_position().map_err(|e| Error::CursorQuery(e.to_string()))?;
        self.poster.post_move((x + dx, y + dy))
    }

    /// Clicks the primary button once at `point`.
    pub fn left_click(&self, point: (f64, f64)) -> Result<()> {
        self.poster.post_click(point, MouseButton::Left, 1)
    }

    /// Clicks the secondary button once at `point`.
    pub fn right_click(&self, point: (f64, f64)) -> Result<()> {
        self.poster.post_click(point, MouseButton::Right, 1)
    }

    /// Clicks the middle button once at `point`.
    pub fn middle_click(&self, point: (f64, f64)) -> Result<()> {
        self.poster.post_click(point, MouseButton::Middle, 1)
    }

    /// Double-clicks the primary button at `point`.
    pub fn double_click(&self, point: (f64, f64)) -> Result<()> {
        self.poster.post_click(point, MouseButton::Left, 2)
    }

    /// Triple-clicks the primary button at `point`.
    pub fn triple_click(&self, point: (f64, f64)) -> Result<()> {
        self.poster.post_click(point, MouseButton::Left, 3)
    }

    /// Presses `button` at `point` and holds it until [`Pointer::drag_end`].
    /// Replaces any drag already held.
    pub fn drag_start(&self, point: (f64, f64), button: MouseButton) -> Result<()> {
        self.poster.post_down(point, button)?;
        *self.held_drag.lock() = Some(button);
        Ok(())
    }

    /// Moves the held button to `point` and releases it at `point`.
    pub fn drag_end(&self, point: (f64, f64)) -> Result<()> {
        let button = self
            .held_drag
            .lock()
            .take()
            .ok_or(Error::NoDragHeld)?;
        self.poster.post_dragged(point, button)?;
        self.poster.post_up(point, button)
    }

    /// Posts a line-unit scroll wheel event. Positive `delta_y` scrolls up,
    /// positive `delta_x` scrolls right, matching the vim-style Scroll
    /// Router's `j`/`k`/`h`/`l` key mapping.
    pub fn scroll(&self, delta_x: i32, delta_y: i32) -> Result<()> {
        self.poster.post_scroll(delta_x, delta_y)
    }
}

#[cfg(any(test, feature = "test-utils"))]
struct MockPoster;

#[cfg(any(test, feature = "test-utils"))]
impl Poster for MockPoster {
    fn post_down(&self, _point: (f64, f64), _button: MouseButton) -> Result<()> {
        Ok(())
    }
    fn post_up(&self, _point: (f64, f64), _button: MouseButton) -> Result<()> {
        Ok(())
    }
    fn post_dragged(&self, _point: (f64, f64), _button: MouseButton) -> Result<()> {
        Ok(())
    }
    fn post_click(&self, _point: (f64, f64), _button: MouseButton, _click_count: i64) -> Result<()> {
        Ok(())
    }
    fn post_move(&self, _point: (f64, f64)) -> Result<()> {
        Ok(())
    }
    fn post_scroll(&self, _delta_x: i32, _delta_y: i32) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingPoster {
        downs: AtomicUsize,
        ups: AtomicUsize,
        clicks: AtomicUsize,
        scrolls: AtomicUsize,
    }

    impl CountingPoster {
        fn new() -> Self {
            Self {
                downs: AtomicUsize::new(0),
                ups: AtomicUsize::new(0),
                clicks: AtomicUsize::new(0),
                scrolls: AtomicUsize::new(0),
            }
        }
    }

    impl Poster for CountingPoster {
        fn post_down(&self, _point: (f64, f64), _button: MouseButton) -> Result<()> {
            self.downs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn post_up(&self, _point: (f64, f64), _button: MouseButton) -> Result<()> {
            self.ups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn post_dragged(&self, _point: (f64, f64), _button: MouseButton) -> Result<()> {
            Ok(())
        }
        fn post_click(
            &self,
            _point: (f64, f64),
            _button: MouseButton,
            _click_count: i64,
        ) -> Result<()> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn post_move(&self, _point: (f64, f64)) -> Result<()> {
            Ok(())
        }
        fn post_scroll(&self, _delta_x: i32, _delta_y: i32) -> Result<()> {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn click_posts_one_click() {
        let poster = Arc::new(CountingPoster::new());
        let pointer = Pointer::new_with_poster(poster.clone());
        pointer.left_click((10.0, 20.0)).unwrap();
        assert_eq!(poster.clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drag_end_without_start_is_an_error() {
        let poster = Arc::new(CountingPoster::new());
        let pointer = Pointer::new_with_poster(poster);
        assert!(matches!(pointer.drag_end((0.0, 0.0)), Err(Error::NoDragHeld)));
    }

    #[test]
    fn drag_start_then_end_posts_down_and_up() {
        let poster = Arc::new(CountingPoster::new());
        let pointer = Pointer::new_with_poster(poster.clone());
        pointer.drag_start((0.0, 0.0), MouseButton::Left).unwrap();
        pointer.drag_end((5.0, 5.0)).unwrap();
        assert_eq!(poster.downs.load(Ordering::SeqCst), 1);
        assert_eq!(poster.ups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_drag_start_replaces_held_button() {
        let poster = Arc::new(CountingPoster::new());
        let pointer = Pointer::new_with_poster(poster.clone());
        pointer.drag_start((0.0, 0.0), MouseButton::Left).unwrap();
        pointer.drag_start((1.0, 1.0), MouseButton::Right).unwrap();
        pointer.drag_end((2.0, 2.0)).unwrap();
        assert_eq!(poster.downs.load(Ordering::SeqCst), 2);
        assert_eq!(poster.ups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scroll_posts_one_event() {
        let poster = Arc::new(CountingPoster::new());
        let pointer = Pointer::new_with_poster(poster.clone());
        pointer.scroll(0, -3).unwrap();
        assert_eq!(poster.scrolls.load(Ordering::SeqCst), 1);
    }
}
