use serde::{Deserialize, Serialize};

use crate::Rect;

/// One cell of a Grid router's row x col tiling, or of its subgrid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Two-character label, e.g. `"bc"` (row key then column key).
    pub label: String,
    /// Screen-space bounds of this cell.
    pub bounds: Rect,
}

/// One frame of the Recursive Grid router's zoom stack.
///
/// Each key replaces the top frame with the selected n x n subdivision;
/// `Backspace` pops one frame back off the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecursiveGridFrame {
    /// The frame's screen-space bounds.
    pub bounds: Rect,
    /// Subdivision count along each axis (2..=8).
    pub subdivisions: u8,
}

impl RecursiveGridFrame {
    /// The root frame covering the whole active screen.
    pub fn root(bounds: Rect, subdivisions: u8) -> Self {
        Self {
            bounds,
            subdivisions,
        }
    }

    /// Whether this frame is small enough to resolve, per `threshold_px`.
    pub fn below_threshold(&self, threshold_px: f64) -> bool {
        self.bounds.min_side() < threshold_px
    }

    /// The sub-rectangle for quadrant index `idx` (row-major, 0..subdivisions^2).
    pub fn subdivision_bounds(&self, idx: usize) -> Rect {
        let n = self.subdivisions as usize;
        let row = idx / n;
        let col = idx % n;
        let w = self.bounds.w / n as f64;
        let h = self.bounds.h / n as f64;
        Rect::new(
            self.bounds.x + col as f64 * w,
            self.bounds.y + row as f64 * h,
            w,
            h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdivision_bounds_tiles_without_gaps() {
        let f = RecursiveGridFrame::root(Rect::new(0.0, 0.0, 100.0, 100.0), 2);
        let top_left = f.subdivision_bounds(0);
        let bottom_right = f.subdivision_bounds(3);
        assert_eq!(top_left, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(bottom_right, Rect::new(50.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn below_threshold_compares_shorter_side() {
        let f = RecursiveGridFrame::root(Rect::new(0.0, 0.0, 3.0, 1.0), 2);
        assert!(f.below_threshold(2.0));
        assert!(!f.below_threshold(0.5));
    }
}
