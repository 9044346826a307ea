use serde::{Deserialize, Serialize};

use crate::UiElement;

/// A labelled target in the Hints router's live set.
///
/// Within one activation, labels are unique and prefix-free: no label is a
/// proper prefix of another. `matched_prefix_len` tracks how much of the
/// label the user has typed so far, for rendering the matched/unmatched
/// split of each label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    /// The target this hint resolves to.
    pub element: UiElement,
    /// The generated label, e.g. `"fj"`.
    pub label: String,
    /// Count of leading characters of `label` the typed prefix has matched.
    pub matched_prefix_len: usize,
}

impl Hint {
    /// Builds a fresh, unmatched hint.
    pub fn new(element: UiElement, label: String) -> Self {
        Self {
            element,
            label,
            matched_prefix_len: 0,
        }
    }

    /// Whether `prefix` is a prefix of this hint's label.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.label.starts_with(prefix)
    }
}

/// Checks that no label in `labels` is a proper prefix of another, the
/// invariant the Hints router must uphold for every generated set.
pub fn labels_are_prefix_free<S: AsRef<str>>(labels: &[S]) -> bool {
    for (i, a) in labels.iter().enumerate() {
        for (j, b) in labels.iter().enumerate() {
            if i != j && b.as_ref().starts_with(a.as_ref()) && a.as_ref().len() < b.as_ref().len()
            {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;

    fn elem() -> UiElement {
        UiElement {
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            role: "AXButton".to_string(),
            bundle_id: None,
            frame_id: None,
        }
    }

    #[test]
    fn matches_prefix_checks_start() {
        let h = Hint::new(elem(), "fj".to_string());
        assert!(h.matches_prefix(""));
        assert!(h.matches_prefix("f"));
        assert!(h.matches_prefix("fj"));
        assert!(!h.matches_prefix("j"));
    }

    #[test]
    fn prefix_free_rejects_proper_prefix() {
        assert!(labels_are_prefix_free(&["fj", "fk", "d"]));
        assert!(!labels_are_prefix_free(&["f", "fj"]));
    }
}
