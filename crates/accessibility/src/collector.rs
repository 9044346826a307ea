use std::ffi::c_void;

use neru_protocol::{CollectFilter, Rect, UiElement};
use objc2_app_kit::{NSApplicationActivationPolicy, NSWorkspace};
use objc2_foundation::MainThreadMarker;

use crate::{
    error::{Error, Result},
    ffi::{ax_application, ax_check, ax_get_children, ax_get_point, ax_get_size, ax_get_string, cfstr},
};

const MAX_WALK_DEPTH: u32 = 8;

/// Produces the filtered set of clickable elements a mode activation needs.
///
/// A collection's lifetime is one activation: callers re-collect on every
/// Hints entry and on every screen-change refresh rather than caching
/// across activations.
pub trait Collector: Send + Sync {
    /// Collects every element matching `filter`, sorted top-to-bottom then
    /// left-to-right so spatially close elements get spatially close
    /// labels. An empty result is an error: the caller aborts entry.
    fn collect(&self, filter: &CollectFilter) -> Result<Vec<UiElement>>;
}

/// Walks the live AXUIElement tree of every regular, unhidden running
/// application, plus the menu bar, Dock and notification center when the
/// filter asks for them.
#[derive(Default)]
pub struct RealCollector;

impl RealCollector {
    /// Builds a collector. AX calls happen lazily, on `collect`.
    pub fn new() -> Self {
        Self
    }

    fn running_regular_apps() -> Vec<(i32, Option<String>)> {
        let Some(_mtm) = MainThreadMarker::new() else {
            return Vec::new();
        };
        let workspace = unsafe { NSWorkspace::sharedWorkspace() };
        let apps = unsafe { workspace.runningApplications() };
        apps.iter()
            .filter(|app| {
                unsafe { app.activationPolicy() } == NSApplicationActivationPolicy::Regular
                    && !unsafe { app.isHidden() }
            })
            .map(|app| {
                let pid = unsafe { app.processIdentifier() };
                let bundle_id = unsafe { app.bundleIdentifier() }.map(|s| s.to_string());
                (pid, bundle_id)
            })
            .collect()
    }

    fn pid_for_bundle_id(bundle_id: &str) -> Option<i32> {
        let _mtm = MainThreadMarker::new()?;
        let workspace = unsafe { NSWorkspace::sharedWorkspace() };
        let apps = unsafe { workspace.runningApplications() };
        apps.iter().find_map(|app| {
            let this_id = unsafe { app.bundleIdentifier() }?;
            if this_id.to_string() == bundle_id {
                Some(unsafe { app.processIdentifier() })
            } else {
                None
            }
        })
    }

    fn walk(
        element: *mut c_void,
        bundle_id: Option<&str>,
        filter: &CollectFilter,
        depth: u32,
        out: &mut Vec<UiElement>,
    ) {
        if depth > MAX_WALK_DEPTH {
            return;
        }
        if let Some(role) = ax_get_string(element, cfstr("AXRole")) {
            if filter.clickable_roles.iter().any(|r| r == &role) {
                if let (Ok(pos), Ok(size)) = (
                    ax_get_point(element, cfstr("AXPosition")),
                    ax_get_size(element, cfstr("AXSize")),
                ) {
                    out.push(UiElement {
                        bounds: Rect::new(pos.0, pos.1, size.0, size.1),
                        role,
                        bundle_id: bundle_id.map(str::to_string),
                        frame_id: ax_get_string(element, cfstr("AXIdentifier")),
                    });
                }
            }
        }
        for child in ax_get_children(element, cfstr("AXChildren")) {
            Self::walk(child, bundle_id, filter, depth + 1, out);
        }
    }

    fn collect_menubar(&self, filter: &CollectFilter, out: &mut Vec<UiElement>) {
        for (pid, bundle_id) in Self::running_regular_apps() {
            let app = ax_application(pid);
            for menubar in ax_get_children(app, cfstr("AXMenuBar")) {
                Self::walk(menubar, bundle_id.as_deref(), filter, 0, out);
            }
        }
        if !filter.additional_menubar_targets.is_empty() {
            if let Some(pid) = Self::pid_for_bundle_id("com.apple.systemuiserver") {
                let app = ax_application(pid);
                for item in ax_get_children(app, cfstr("AXChildren")) {
                    let title = ax_get_string(item, cfstr("AXTitle")).unwrap_or_default();
                    if filter.additional_menubar_targets.iter().any(|t| t == &title) {
                        Self::walk(item, Some("com.apple.systemuiserver"), filter, 0, out);
                    }
                }
            }
        }
    }

    fn collect_bundle_tree(&self, bundle_id: &str, filter: &CollectFilter, out: &mut Vec<UiElement>) {
        let Some(pid) = Self::pid_for_bundle_id(bundle_id) else {
            return;
        };
        let app = ax_application(pid);
        for child in ax_get_children(app, cfstr("AXChildren")) {
            Self::walk(child, Some(bundle_id), filter, 0, out);
        }
    }
}

impl Collector for RealCollector {
    fn collect(&self, filter: &CollectFilter) -> Result<Vec<UiElement>> {
        ax_check()?;
        let mut out = Vec::new();

        for (pid, bundle_id) in Self::running_regular_apps() {
            let app = ax_application(pid);
            for window in ax_get_children(app, cfstr("AXWindows")) {
                Self::walk(window, bundle_id.as_deref(), filter, 0, &mut out);
            }
        }

        if filter.include_menubar || !filter.additional_menubar_targets.is_empty() {
            self.collect_menubar(filter, &mut out);
        }
        if filter.include_dock {
            self.collect_bundle_tree("com.apple.dock", filter, &mut out);
        }
        if filter.include_notification_center {
            self.collect_bundle_tree("com.apple.notificationcenterui", filter, &mut out);
        }

        sort_reading_order(&mut out);
        if out.is_empty() {
            return Err(Error::EmptyCollection);
        }
        Ok(out)
    }
}

/// Sorts top-to-bottom, then left-to-right, so base-k label assignment
/// keeps spatially close elements' labels close.
fn sort_reading_order(elements: &mut [UiElement]) {
    elements.sort_by(|a, b| {
        a.bounds
            .y
            .partial_cmp(&b.bounds.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.bounds
                    .x
                    .partial_cmp(&b.bounds.x)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
}

/// A fixed collection, for router tests that don't want live AX access.
pub struct MockCollector {
    elements: Vec<UiElement>,
}

impl MockCollector {
    /// Builds a mock that always returns `elements` regardless of filter.
    pub fn new(elements: Vec<UiElement>) -> Self {
        Self { elements }
    }
}

impl Collector for MockCollector {
    fn collect(&self, _filter: &CollectFilter) -> Result<Vec<UiElement>> {
        if self.elements.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let mut out = self.elements.clone();
        sort_reading_order(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(x: f64, y: f64) -> UiElement {
        UiElement {
            bounds: Rect::new(x, y, 10.0, 10.0),
            role: "AXButton".to_string(),
            bundle_id: None,
            frame_id: None,
        }
    }

    #[test]
    fn mock_collector_sorts_reading_order() {
        let mock = MockCollector::new(vec![elem(50.0, 0.0), elem(0.0, 0.0), elem(0.0, 10.0)]);
        let out = mock.collect(&CollectFilter::default()).unwrap();
        assert_eq!(out[0].bounds.x, 0.0);
        assert_eq!(out[0].bounds.y, 0.0);
        assert_eq!(out[2].bounds.y, 10.0);
    }

    #[test]
    fn empty_collection_is_an_error() {
        let mock = MockCollector::new(Vec::new());
        assert!(mock.collect(&CollectFilter::default()).is_err());
    }
}
