//! The Grid Router (§4.3): two-level row/column addressing, then a fixed
//! subgrid over the chosen cell.

use neru_protocol::{GridCell, PendingAction, Rect};
use pointer::Pointer;

use super::{perform, Outcome};
use crate::Result;

const DEFAULT_SUBGRID: usize = 3;

fn tile(bounds: Rect, rows: usize, cols: usize, alphabet: &[char]) -> Vec<GridCell> {
    let w = bounds.w / cols as f64;
    let h = bounds.h / rows as f64;
    let mut cells = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let label: String = [alphabet[r], alphabet[c]].iter().collect();
            cells.push(GridCell {
                label,
                bounds: Rect::new(bounds.x + c as f64 * w, bounds.y + r as f64 * h, w, h),
            });
        }
    }
    cells
}

/// Two-level row/column addressing, then a fixed-size subgrid.
pub struct GridRouter {
    alphabet: Vec<char>,
    sublayer_alphabet: Vec<char>,
    rows: usize,
    cols: usize,
    pending_action: PendingAction,
    top: Vec<GridCell>,
    row_key: Option<char>,
    subgrid: Option<Vec<GridCell>>,
}

impl GridRouter {
    /// Builds the top-level row x col tiling over `screen`, sized so
    /// `rows * cols <= alphabet.len()`.
    pub fn new(screen: Rect, alphabet: &str, sublayer_alphabet: &str, pending_action: PendingAction) -> Self {
        let alphabet: Vec<char> = alphabet.chars().collect();
        let sublayer_alphabet: Vec<char> = sublayer_alphabet.chars().collect();
        let n = alphabet.len().max(1);
        // Tile to maximize columns rather than forcing a square: rows is
        // the largest factor-friendly value not exceeding sqrt(n), cols
        // takes the rest, both row- and column-addressed by the same
        // alphabet (e.g. 8 keys -> 2 rows x 4 cols, not 2x2).
        let rows = (n as f64).sqrt().floor().max(1.0) as usize;
        let cols = (n / rows).max(1);
        let top = tile(screen, rows, cols, &alphabet);
        Self {
            alphabet,
            sublayer_alphabet,
            rows,
            cols,
            pending_action,
            top,
            row_key: None,
            subgrid: None,
        }
    }

    /// The cells currently being shown: the top-level tiling before any
    /// key, the chosen cell's subgrid after the second key.
    pub fn visible_cells(&self) -> &[GridCell] {
        self.subgrid.as_deref().unwrap_or(&self.top)
    }

    fn current_rect(&self) -> Rect {
        if self.subgrid.is_some() {
            // Smallest enclosing rectangle is the union of the subgrid,
            // which is exactly the chosen top-level cell.
            return self.chosen_cell_bounds();
        }
        if let Some(row) = self.row_key {
            if let Some(first) = self.top.iter().find(|c| c.label.starts_with(row)) {
                return first.bounds;
            }
        }
        // No selection yet: the whole screen is the enclosing rectangle.
        let (min_x, min_y, max_x, max_y) = self.top.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(minx, miny, maxx, maxy), c| {
                (
                    minx.min(c.bounds.x),
                    miny.min(c.bounds.y),
                    maxx.max(c.bounds.x + c.bounds.w),
                    maxy.max(c.bounds.y + c.bounds.h),
                )
            },
        );
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    fn chosen_cell_bounds(&self) -> Rect {
        let label = match &self.row_key {
            Some(row) => self.top.iter().find(|c| c.label.starts_with(*row)),
            None => None,
        };
        label.map(|c| c.bounds).unwrap_or_default()
    }

    /// Feeds one canonical key; see §4.3's two-level addressing algorithm.
    pub fn handle_key(&mut self, key: &str, pointer: &Pointer) -> Result<Outcome> {
        if key == crate::keys::ENTER {
            let rect = self.current_rect();
            perform(pointer, &self.pending_action, rect.center())?;
            return Ok(Outcome::Resolved);
        }
        let Some(ch) = key.chars().next().filter(|_| key.chars().count() == 1) else {
            return Ok(Outcome::Continue);
        };

        if let Some(subgrid) = &self.subgrid {
            let Some(cell) = subgrid.iter().find(|c| c.label.ends_with(ch)) else {
                return Ok(Outcome::Continue);
            };
            let point = cell.bounds.center();
            perform(pointer, &self.pending_action, point)?;
            return Ok(Outcome::Resolved);
        }

        match self.row_key {
            None => {
                if !self.alphabet.contains(&ch) {
                    return Ok(Outcome::Continue);
                }
                self.row_key = Some(ch);
                Ok(Outcome::Continue)
            }
            Some(row) => {
                if !self.alphabet.contains(&ch) {
                    return Ok(Outcome::Continue);
                }
                let label: String = [row, ch].iter().collect();
                let Some(cell) = self.top.iter().find(|c| c.label == label) else {
                    self.row_key = None;
                    return Ok(Outcome::Continue);
                };
                let sub_alphabet = &self.sublayer_alphabet;
                let sub_side = DEFAULT_SUBGRID.min(sub_alphabet.len().max(1));
                self.subgrid = Some(tile(cell.bounds, sub_side, sub_side, sub_alphabet));
                Ok(Outcome::Continue)
            }
        }
    }

    /// Row/col count chosen for the top-level tiling, for tests and
    /// diagnostics.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::new(0.0, 0.0, 900.0, 900.0)
    }

    #[test]
    fn enter_with_no_selection_resolves_at_screen_center() {
        let mut router = GridRouter::new(screen(), "asdfghjkl", "asdfghjkl", None);
        let pointer = Pointer::new_with_mock_poster();
        let outcome = router.handle_key(crate::keys::ENTER, &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Resolved));
    }

    #[test]
    fn two_keys_open_a_subgrid() {
        let mut router = GridRouter::new(screen(), "asdfghjkl", "asdfghjkl", None);
        let pointer = Pointer::new_with_mock_poster();
        router.handle_key("a", &pointer).unwrap();
        let outcome = router.handle_key("s", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        assert!(!router.visible_cells().is_empty());
    }

    #[test]
    fn subgrid_key_resolves() {
        let mut router = GridRouter::new(screen(), "asdfghjkl", "asdfghjkl", None);
        let pointer = Pointer::new_with_mock_poster();
        router.handle_key("a", &pointer).unwrap();
        router.handle_key("a", &pointer).unwrap();
        let third = router.visible_cells()[0].label.chars().nth(1).unwrap().to_string();
        let outcome = router.handle_key(&third, &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Resolved));
    }

    #[test]
    fn eight_char_alphabet_tiles_two_by_four() {
        let mut router = GridRouter::new(screen(), "asdfjkl;", "asdfjkl;", None);
        assert_eq!(router.dimensions(), (2, 4));
        let pointer = Pointer::new_with_mock_poster();
        router.handle_key("a", &pointer).unwrap();
        let outcome = router.handle_key("d", &pointer).unwrap();
        assert!(matches!(outcome, Outcome::Continue));
        // "a" then "d" selects the top row's third column (900 / 4 = 225
        // wide per column); the opened subgrid's origin cell sits there.
        let cell = router.visible_cells()[0].bounds;
        assert_eq!(cell.x, 450.0);
        assert_eq!(cell.y, 0.0);
    }
}
