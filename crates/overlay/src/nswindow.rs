//! NSWindow tweaks applied to overlay viewports after creation: transparency,
//! rounded corners, all-Spaces membership, and screen-recording visibility.
//!
//! Every function here requires the AppKit main thread and is a silent
//! no-op off it or when no window matches; they're called from inside
//! `eframe`'s `show_viewport_immediate` callback, which always runs on the
//! main thread, so the no-op path is test/headless-only.

use objc2::rc::autoreleasepool;
use objc2_app_kit::{
    NSApplication, NSColor, NSWindow, NSWindowCollectionBehavior, NSWindowSharingType,
};
use objc2_foundation::MainThreadMarker;

fn window_title_matches(window: &NSWindow, title_match: &str) -> bool {
    let title = window.title();
    autoreleasepool(|pool| unsafe { title.to_str(pool) == title_match })
}

/// Applies full transparency and rounded corners to the window titled
/// `title_match`.
pub fn apply_transparent_rounded(title_match: &str, radius: f64) {
    let Some(mtm) = MainThreadMarker::new() else {
        return;
    };
    let app = NSApplication::sharedApplication(mtm);
    for w in app.windows().iter() {
        let window = &*w;
        if !window_title_matches(window, title_match) {
            continue;
        }
        window.setOpaque(false);
        window.setHasShadow(false);
        window.setBackgroundColor(Some(&NSColor::clearColor()));
        if let Some(view) = window.contentView() {
            view.setWantsLayer(true);
            if let Some(layer) = view.layer() {
                layer.setMasksToBounds(true);
                layer.setCornerRadius(radius);
            }
        }
        window.setAlphaValue(1.0);
    }
}

/// Marks the window titled `title_match` to appear on every Space.
pub fn set_on_all_spaces(title_match: &str) {
    let Some(mtm) = MainThreadMarker::new() else {
        return;
    };
    let app = NSApplication::sharedApplication(mtm);
    for w in app.windows().iter() {
        let window = &*w;
        if window_title_matches(window, title_match) {
            window.setCollectionBehavior(NSWindowCollectionBehavior::CanJoinAllSpaces);
        }
    }
}

/// Sets every window whose title is in `titles` to the screen-recording
/// visibility §4.7's `set_sharing` requests: `hide_for_screen_share` makes
/// overlay content invisible to screen-recording APIs while remaining
/// visible to the local display.
pub fn set_sharing_for_all(titles: &[&str], hide_for_screen_share: bool) {
    let Some(mtm) = MainThreadMarker::new() else {
        return;
    };
    let app = NSApplication::sharedApplication(mtm);
    let sharing_type = if hide_for_screen_share {
        NSWindowSharingType::None
    } else {
        NSWindowSharingType::ReadOnly
    };
    for w in app.windows().iter() {
        let window = &*w;
        if titles.iter().any(|t| window_title_matches(window, t)) {
            window.setSharingType(sharing_type);
        }
    }
}
