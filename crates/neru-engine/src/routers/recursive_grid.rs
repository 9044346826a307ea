//! The Recursive Grid Router (§4.4): repeated n x n quadrant subdivision
//! down to a pixel threshold, addressed by a single keystroke per level.

use neru_protocol::{PendingAction, RecursiveGridFrame, Rect};
use pointer::Pointer;

use super::{perform, Outcome};
use crate::Result;

/// Repeated quadrant subdivision; its entire state is the frame stack.
pub struct RecursiveGridRouter {
    alphabet: Vec<char>,
    subdivisions: u8,
    threshold_px: f64,
    pending_action: PendingAction,
    stack: Vec<RecursiveGridFrame>,
}

impl RecursiveGridRouter {
    /// Builds the router over the active `screen`, subdividing into
    /// `subdivisions x subdivisions` quadrants at each step.
    pub fn new(screen: Rect, subdivisions: u8, threshold_px: f64, alphabet: &str, pending_action: PendingAction) -> Self {
        let n2 = (subdivisions as usize).saturating_mul(subdivisions as usize);
        let alphabet: Vec<char> = alphabet.chars().take(n2.max(1)).collect();
        Self {
            alphabet,
            subdivisions,
            threshold_px,
            pending_action,
            stack: vec![RecursiveGridFrame::root(screen, subdivisions)],
        }
    }

    /// The current (topmost) frame, for the overlay to draw.
    pub fn current_frame(&self) -> &RecursiveGridFrame {
        self.stack.last().expect("stack is never empty")
    }

    /// Feeds one canonical key; see §4.4's per-key algorithm.
    pub fn handle_key(&mut self, key: &str, pointer: &Pointer) -> Result<Outcome> {
        if key == crate::keys::BACKSPACE {
            if self.stack.len() > 1 {
                self.stack.pop();
            }
            return Ok(Outcome::Continue);
        }
        let Some(ch) = key.chars().next().filter(|_| key.chars().count() == 1) else {
            return Ok(Outcome::Continue);
        };
        let Some(idx) = self.alphabet.iter().position(|c| *c == ch) else {
            return Ok(Outcome::Continue);
        };
        let next_bounds = self.current_frame().subdivision_bounds(idx);
        let next = RecursiveGridFrame::root(next_bounds, self.subdivisions);
        self.stack.push(next.clone());
        if next.below_threshold(self.threshold_px) {
            perform(pointer, &self.pending_action, next.bounds.center())?;
            return Ok(Outcome::Resolved);
        }
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdivides_until_threshold() {
        let mut router = RecursiveGridRouter::new(
            Rect::new(0.0, 0.0, 16.0, 16.0),
            2,
            2.0,
            "abcd",
            None,
        );
        let pointer = Pointer::new_with_mock_poster();
        // 16 -> 8 -> 4 -> 2 (below 2.0? no, 2 is not < 2.0) -> 1 (< 2.0)
        let mut outcome = router.handle_key("a", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        outcome = router.handle_key("a", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        outcome = router.handle_key("a", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        outcome = router.handle_key("a", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Resolved));
    }

    #[test]
    fn backspace_pops_one_frame() {
        let mut router = RecursiveGridRouter::new(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            2,
            2.0,
            "abcd",
            None,
        );
        let pointer = Pointer::new_with_mock_poster();
        router.handle_key("a", &pointer).unwrap();
        let after_first = router.current_frame().bounds;
        router.handle_key("a", &pointer).unwrap();
        router.handle_key(crate::keys::BACKSPACE, &pointer).unwrap();
        assert_eq!(router.current_frame().bounds, after_first);
    }

    #[test]
    fn unmapped_key_continues_without_change() {
        let mut router = RecursiveGridRouter::new(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            2,
            2.0,
            "abcd",
            None,
        );
        let pointer = Pointer::new_with_mock_poster();
        let before = router.current_frame().bounds;
        let outcome = router.handle_key("z", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        assert_eq!(router.current_frame().bounds, before);
    }
}
