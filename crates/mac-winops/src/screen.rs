//! Active-screen lookup: which display the pointer currently sits on.

use objc2_app_kit::NSScreen;
use objc2_foundation::MainThreadMarker;
use tracing::debug;

use crate::Error;
use crate::Result;
use crate::geom::Rect;

/// The visible frame (excludes the menu bar and Dock) of the screen
/// containing the point `(x, y)`, in global AppKit coordinates (origin
/// bottom-left). Falls back to the main screen, then the first available
/// screen, if no screen's frame contains the point.
pub fn active_screen_frame(x: f64, y: f64) -> Result<Rect> {
    let mtm = MainThreadMarker::new().ok_or(Error::MainThread)?;
    let screens = NSScreen::screens(mtm);

    for s in screens.iter() {
        let fr = s.frame();
        let r = Rect::new(fr.origin.x, fr.origin.y, fr.size.width, fr.size.height);
        if r.contains(x, y) {
            return Ok(frame_of(&s));
        }
    }

    debug!(x, y, "active_screen_frame: no screen contains point, using main");
    if let Some(s) = NSScreen::mainScreen(mtm) {
        return Ok(frame_of(&s));
    }
    if let Some(s) = screens.iter().next() {
        return Ok(frame_of(&s));
    }
    Err(Error::System("no screens available"))
}

fn frame_of(s: &NSScreen) -> Rect {
    let fr = s.visibleFrame();
    Rect::new(fr.origin.x, fr.origin.y, fr.size.width, fr.size.height)
}

/// The maximum top edge (`y + height`) across every screen's full frame, in
/// AppKit's bottom-left-origin coordinate space.
///
/// Overlay placement works in top-left coordinates; subtracting a
/// bottom-left `y` from this value converts it, the same flip AppKit itself
/// uses for multi-display arrangements.
pub fn global_top() -> Result<f64> {
    let mtm = MainThreadMarker::new().ok_or(Error::MainThread)?;
    let screens = NSScreen::screens(mtm);
    let mut top = f64::MIN;
    for s in screens.iter() {
        let fr = s.frame();
        top = top.max(fr.origin.y + fr.size.height);
    }
    if top == f64::MIN {
        return Err(Error::System("no screens available"));
    }
    Ok(top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_reflexive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(5.0, 5.0));
    }
}
