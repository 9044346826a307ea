//! The Hints Router (§4.2): label-prefix target selection over a collected
//! set of clickable elements.

use std::sync::Arc;

use accessibility::Collector;
use neru_protocol::{CollectFilter, Hint, PendingAction, UiElement};
use pointer::Pointer;

use super::{perform, Outcome};
use crate::{Error, Result};

/// Chooses the shortest label length `L` such that `alphabet_len^L >= count`,
/// falling back to 1 for an empty collection (never resolved to, but keeps
/// the function total).
fn label_length(alphabet_len: usize, count: usize) -> usize {
    if count <= 1 || alphabet_len <= 1 {
        return 1;
    }
    let mut len = 1;
    let mut capacity = alphabet_len;
    while capacity < count {
        capacity *= alphabet_len;
        len += 1;
    }
    len
}

/// Renders `index` as a length-`len` base-`alphabet.len()` label, most
/// significant digit first.
fn label_for_index(alphabet: &[char], index: usize, len: usize) -> String {
    let base = alphabet.len();
    let mut digits = vec![0usize; len];
    let mut rem = index;
    for slot in digits.iter_mut().rev() {
        *slot = rem % base;
        rem /= base;
    }
    digits.into_iter().map(|d| alphabet[d]).collect()
}

/// Sorts elements top-to-bottom then left-to-right so spatially close
/// elements receive spatially close labels.
fn sort_reading_order(elements: &mut [UiElement]) {
    elements.sort_by(|a, b| {
        a.bounds
            .y
            .partial_cmp(&b.bounds.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.bounds.x.partial_cmp(&b.bounds.x).unwrap_or(std::cmp::Ordering::Equal))
    });
}

/// Builds the live, prefix-free label set for a freshly collected element
/// list.
fn build_hints(mut elements: Vec<UiElement>, alphabet: &[char]) -> Vec<Hint> {
    sort_reading_order(&mut elements);
    let len = label_length(alphabet.len(), elements.len());
    elements
        .into_iter()
        .enumerate()
        .map(|(i, el)| Hint::new(el, label_for_index(alphabet, i, len)))
        .collect()
}

/// Label-prefix target selection over the accessibility tree.
pub struct HintsRouter {
    collector: Arc<dyn Collector>,
    filter: CollectFilter,
    alphabet: Vec<char>,
    pending_action: PendingAction,
    hints: Vec<Hint>,
    prefix: String,
}

impl HintsRouter {
    /// Collects elements and builds the initial label set. Returns an
    /// error (entry aborts) if the collection comes back empty.
    pub fn new(
        collector: Arc<dyn Collector>,
        filter: CollectFilter,
        alphabet: &str,
        pending_action: PendingAction,
    ) -> Result<Self> {
        let alphabet: Vec<char> = alphabet.chars().collect();
        let elements = collector
            .collect(&filter)
            .map_err(|e| Error::AccessibilityFailed(e.to_string()))?;
        if elements.is_empty() {
            return Err(Error::AccessibilityFailed("empty element collection".to_string()));
        }
        let hints = build_hints(elements, &alphabet);
        Ok(Self {
            collector,
            filter,
            alphabet,
            pending_action,
            hints,
            prefix: String::new(),
        })
    }

    /// The current live hint set, for the overlay to draw.
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    fn subset(&self) -> Vec<&Hint> {
        self.hints.iter().filter(|h| h.matches_prefix(&self.prefix)).collect()
    }

    /// Feeds one canonical key; see §4.2's per-key algorithm.
    pub fn handle_key(&mut self, key: &str, pointer: &Pointer) -> Result<Outcome> {
        if key == crate::keys::BACKSPACE {
            self.prefix.pop();
            self.recompute_matches();
            return Ok(Outcome::Continue);
        }
        if key.chars().count() != 1 || !self.alphabet.contains(&key.chars().next().unwrap()) {
            return Ok(Outcome::Continue);
        }
        let mut candidate = self.prefix.clone();
        candidate.push_str(key);
        let matches = self.hints.iter().filter(|h| h.matches_prefix(&candidate)).count();
        if matches == 0 {
            return Ok(Outcome::Abort);
        }
        self.prefix = candidate;
        if matches == 1 {
            let hint = self.hints.iter().find(|h| h.matches_prefix(&self.prefix)).unwrap();
            let point = hint.element.bounds.center();
            perform(pointer, &self.pending_action, point)?;
            return Ok(Outcome::Resolved);
        }
        self.recompute_matches();
        Ok(Outcome::Continue)
    }

    fn recompute_matches(&mut self) {
        let prefix = self.prefix.clone();
        for hint in &mut self.hints {
            hint.matched_prefix_len = if hint.matches_prefix(&prefix) { prefix.len() } else { 0 };
        }
    }

    /// Re-collects elements and regenerates labels on a screen-parameter
    /// change. Typed prefix is reset: surviving-element identity across a
    /// screen change can't be guaranteed in general.
    pub fn refresh(&mut self) -> Result<()> {
        let elements = self
            .collector
            .collect(&self.filter)
            .map_err(|e| Error::AccessibilityFailed(e.to_string()))?;
        if elements.is_empty() {
            return Err(Error::AccessibilityFailed("empty element collection".to_string()));
        }
        self.hints = build_hints(elements, &self.alphabet);
        self.prefix.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessibility::MockCollector;
    use neru_protocol::Rect;

    fn elem(x: f64, y: f64) -> UiElement {
        UiElement {
            bounds: Rect::new(x, y, 10.0, 10.0),
            role: "AXButton".to_string(),
            bundle_id: None,
            frame_id: None,
        }
    }

    #[test]
    fn label_length_grows_with_alphabet_exhaustion() {
        assert_eq!(label_length(26, 5), 1);
        assert_eq!(label_length(26, 27), 2);
        assert_eq!(label_length(2, 5), 3);
    }

    #[test]
    fn single_match_resolves() {
        let collector = Arc::new(MockCollector::new(vec![elem(0.0, 0.0)]));
        let mut router =
            HintsRouter::new(collector, CollectFilter::default(), "ab", None).unwrap();
        let pointer = Pointer::new_with_mock_poster();
        let outcome = router.handle_key("a", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Resolved));
    }

    #[test]
    fn unmatched_key_aborts() {
        // 4 elements over a 3-letter alphabet forces length-2 labels
        // (aa, ab, ac, ba); no label starts with 'c', so it's a valid
        // alphabet key with zero matches.
        let collector = Arc::new(MockCollector::new(vec![
            elem(0.0, 0.0),
            elem(20.0, 0.0),
            elem(40.0, 0.0),
            elem(60.0, 0.0),
        ]));
        let mut router =
            HintsRouter::new(collector, CollectFilter::default(), "abc", None).unwrap();
        let pointer = Pointer::new_with_mock_poster();
        let outcome = router.handle_key("c", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Abort));
    }

    #[test]
    fn out_of_alphabet_key_continues() {
        let collector = Arc::new(MockCollector::new(vec![elem(0.0, 0.0), elem(20.0, 0.0)]));
        let mut router =
            HintsRouter::new(collector, CollectFilter::default(), "ab", None).unwrap();
        let pointer = Pointer::new_with_mock_poster();
        let outcome = router.handle_key("z", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
    }

    #[test]
    fn empty_collection_aborts_entry() {
        let collector = Arc::new(MockCollector::new(vec![]));
        let result = HintsRouter::new(collector, CollectFilter::default(), "ab", None);
        assert!(result.is_err());
    }

    #[test]
    fn backspace_restores_wider_subset() {
        let collector = Arc::new(MockCollector::new(vec![
            elem(0.0, 0.0),
            elem(20.0, 0.0),
            elem(40.0, 0.0),
        ]));
        let mut router =
            HintsRouter::new(collector, CollectFilter::default(), "ab", None).unwrap();
        let pointer = Pointer::new_with_mock_poster();
        // 3 elements over a 2-char alphabet need length-2 labels.
        let first_label = router.hints[0].label.clone();
        let first_char = first_label.chars().next().unwrap().to_string();
        let outcome = router.handle_key(&first_char, &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        let outcome = router.handle_key(crate::keys::BACKSPACE, &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        assert_eq!(router.subset().len(), 3);
    }
}
