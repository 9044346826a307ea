//! Focus Watcher and Exclusions (§4.9): gates whether the global hotkey
//! table is registered, based on the foreground application's bundle id.

use std::collections::HashSet;

/// Tracks the current exclusion list and answers whether a given bundle id
/// should have hotkeys registered.
pub struct FocusGate {
    excluded: HashSet<String>,
}

impl FocusGate {
    /// Builds a gate from the configured exclusion list.
    pub fn new(excluded_apps: &[String]) -> Self {
        Self {
            excluded: excluded_apps.iter().cloned().collect(),
        }
    }

    /// Replaces the exclusion list wholesale, used by config reload.
    pub fn set_excluded(&mut self, excluded_apps: &[String]) {
        self.excluded = excluded_apps.iter().cloned().collect();
    }

    /// Whether `bundle_id` (absent means unknown, treated as not excluded)
    /// is on the exclusion list.
    pub fn is_excluded(&self, bundle_id: Option<&str>) -> bool {
        match bundle_id {
            Some(id) => self.excluded.contains(id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_bundle_is_flagged() {
        let gate = FocusGate::new(&["com.apple.finder".to_string()]);
        assert!(gate.is_excluded(Some("com.apple.finder")));
        assert!(!gate.is_excluded(Some("com.apple.safari")));
        assert!(!gate.is_excluded(None));
    }

    #[test]
    fn set_excluded_replaces_list() {
        let mut gate = FocusGate::new(&["com.apple.finder".to_string()]);
        gate.set_excluded(&["com.apple.safari".to_string()]);
        assert!(!gate.is_excluded(Some("com.apple.finder")));
        assert!(gate.is_excluded(Some("com.apple.safari")));
    }
}
