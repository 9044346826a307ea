//! The Scroll Router (§4.5): a vim-style binding map driving one-shot
//! `scroll(dx, dy)` calls. Scroll mode is held open until `Escape` or a
//! mode-switch IPC command; it never resolves on its own.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use pointer::Pointer;

use super::Outcome;
use crate::Error;

const SEQUENCE_TIMEOUT: Duration = Duration::from_millis(500);

/// A scroll action name bound by `[scroll]`-style key maps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    PageUp,
    PageDown,
    GoTop,
    GoBottom,
}

/// A scroll distance: a single character step, a half page, or the full
/// extent (used by the top/bottom actions).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Magnitude {
    Char,
    HalfPage,
    End,
}

fn direction_and_magnitude(action: Action) -> ((i32, i32), Magnitude) {
    match action {
        Action::ScrollUp => ((0, -1), Magnitude::Char),
        Action::ScrollDown => ((0, 1), Magnitude::Char),
        Action::ScrollLeft => ((-1, 0), Magnitude::Char),
        Action::ScrollRight => ((1, 0), Magnitude::Char),
        Action::PageUp => ((0, -1), Magnitude::HalfPage),
        Action::PageDown => ((0, 1), Magnitude::HalfPage),
        Action::GoTop => ((0, -1), Magnitude::End),
        Action::GoBottom => ((0, 1), Magnitude::End),
    }
}

/// Step sizes backing [`Magnitude`], in the accessibility adapter's scroll
/// units.
pub struct StepSizes {
    pub char: i32,
    pub half_page: i32,
    pub full_page: i32,
}

fn magnitude_to_steps(m: Magnitude, steps: &StepSizes) -> i32 {
    match m {
        Magnitude::Char => steps.char,
        Magnitude::HalfPage => steps.half_page,
        Magnitude::End => steps.full_page,
    }
}

/// The externally-supplied map from action name to its bound canonical
/// keys, parsed once at router construction from configuration.
pub struct BindingMap {
    single: HashMap<String, Action>,
    sequence_starts: HashMap<String, (String, Action)>,
}

impl BindingMap {
    /// Builds a binding map from `(keys, action)` pairs. A two-letter,
    /// letters-only key string registers its first character as a
    /// sequence start; everything else is a single-key binding.
    pub fn new(bindings: &[(&str, Action)]) -> Self {
        let mut single = HashMap::new();
        let mut sequence_starts = HashMap::new();
        for (keys, action) in bindings {
            let is_two_letter_sequence =
                keys.chars().count() == 2 && keys.chars().all(|c| c.is_ascii_alphabetic());
            if is_two_letter_sequence {
                let mut chars = keys.chars();
                let first = chars.next().unwrap().to_string();
                sequence_starts.insert(first, (keys.to_string(), *action));
            } else {
                single.insert(keys.to_string(), *action);
            }
        }
        Self { single, sequence_starts }
    }
}

/// Vim-style scroll key map, resolving each recognized key (or completed
/// two-key sequence) into exactly one `scroll(dx, dy)` call.
pub struct ScrollRouter {
    bindings: BindingMap,
    steps: StepSizes,
    pending_sequence: Option<(String, Instant)>,
}

impl ScrollRouter {
    /// Builds the router over an externally supplied binding map.
    pub fn new(bindings: BindingMap, steps: StepSizes) -> Self {
        Self {
            bindings,
            steps,
            pending_sequence: None,
        }
    }

    fn resolve(&self, action: Action, pointer: &Pointer) -> crate::Result<()> {
        let ((dx_sign, dy_sign), magnitude) = direction_and_magnitude(action);
        let distance = magnitude_to_steps(magnitude, &self.steps);
        pointer
            .scroll(dx_sign * distance, dy_sign * distance)
            .map_err(|e| Error::AccessibilityFailed(e.to_string()))
    }

    /// Feeds one canonical key. Scroll mode never resolves or aborts on
    /// its own; `Escape` is handled by the mode engine before reaching
    /// here.
    pub fn handle_key(&mut self, key: &str, pointer: &Pointer) -> crate::Result<Outcome> {
        if let Some((started, at)) = self.pending_sequence.take() {
            if at.elapsed() <= SEQUENCE_TIMEOUT {
                let mut completed = started.clone();
                completed.push_str(key);
                if let Some((full, action)) = self.bindings.sequence_starts.get(&started) {
                    if *full == completed {
                        self.resolve(*action, pointer)?;
                        return Ok(Outcome::Continue);
                    }
                }
            }
            // Timed out or didn't complete: fall through and treat this
            // key as a fresh one.
        }

        if let Some(action) = self.bindings.single.get(key) {
            self.resolve(*action, pointer)?;
            return Ok(Outcome::Continue);
        }
        if self.bindings.sequence_starts.contains_key(key) {
            self.pending_sequence = Some((key.to_string(), Instant::now()));
        }
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps() -> StepSizes {
        StepSizes { char: 60, half_page: 300, full_page: 10_000 }
    }

    #[test]
    fn single_key_resolves_immediately() {
        let bindings = BindingMap::new(&[("j", Action::ScrollDown)]);
        let mut router = ScrollRouter::new(bindings, steps());
        let pointer = Pointer::new_with_mock_poster();
        let outcome = router.handle_key("j", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
    }

    #[test]
    fn two_key_sequence_resolves_on_completion() {
        let bindings = BindingMap::new(&[("gg", Action::GoTop)]);
        let mut router = ScrollRouter::new(bindings, steps());
        let pointer = Pointer::new_with_mock_poster();
        router.handle_key("g", &pointer).unwrap();
        assert!(router.pending_sequence.is_some());
        router.handle_key("g", &pointer).unwrap();
        assert!(router.pending_sequence.is_none());
    }

    #[test]
    fn unbound_key_is_dropped() {
        let bindings = BindingMap::new(&[("j", Action::ScrollDown)]);
        let mut router = ScrollRouter::new(bindings, steps());
        let pointer = Pointer::new_with_mock_poster();
        let outcome = router.handle_key("q", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
    }
}
