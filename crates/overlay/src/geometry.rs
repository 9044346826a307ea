//! Coordinate conversion between AppKit's bottom-left screen origin and the
//! top-left origin `neru_protocol::Rect` and egui/winit both use.
//!
//! Accessibility bounds ([`neru_protocol::Rect`]) are already top-left; only
//! values that come straight from a CoreGraphics call (cursor position,
//! screen frames) need the flip.

use egui::{pos2, Pos2, Rect as EguiRect, Vec2};
use neru_protocol::Rect;

/// Converts an AppKit point (bottom-left origin) to egui/winit's top-left
/// origin. Falls back to treating `y` as already top-left if the global top
/// edge can't be queried (no screens attached, off the main thread).
pub fn point_to_top_left(x: f64, y: f64) -> Pos2 {
    let top = mac_winops::global_top().unwrap_or(y);
    pos2(x as f32, (top - y) as f32)
}

/// Converts an AppKit rect (bottom-left origin) to egui/winit's top-left
/// origin.
pub fn rect_to_top_left(x: f64, y: f64, w: f64, h: f64) -> EguiRect {
    let top = mac_winops::global_top().unwrap_or(y + h);
    let top_left_y = top - (y + h);
    EguiRect::from_min_size(pos2(x as f32, top_left_y as f32), Vec2::new(w as f32, h as f32))
}

/// Narrows a [`neru_protocol::Rect`] (already top-left oriented) to egui's
/// `f32` rect type.
pub fn protocol_rect_to_egui(r: &Rect) -> EguiRect {
    EguiRect::from_min_size(pos2(r.x as f32, r.y as f32), Vec2::new(r.w as f32, r.h as f32))
}

/// The active screen's frame (the screen under the cursor), in top-left
/// egui coordinates. Falls back to a fixed default when no screen can be
/// queried (headless test environments).
pub fn active_screen_frame_top_left() -> EguiRect {
    match mac_winops::cursor_position() {
        Ok((cx, cy)) => match mac_winops::active_screen_frame(cx, cy) {
            Ok(r) => rect_to_top_left(r.x, r.y, r.w, r.h),
            Err(_) => default_frame(),
        },
        Err(_) => default_frame(),
    }
}

fn default_frame() -> EguiRect {
    EguiRect::from_min_size(pos2(0.0, 0.0), Vec2::new(1440.0, 900.0))
}
