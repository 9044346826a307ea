//! Mutations queued from the engine thread, drained by [`crate::app::OverlayApp`]
//! on the main (AppKit/eframe) thread.

use neru_protocol::{GridCell, Hint, Mode, RecursiveGridFrame};

/// One overlay mutation. Mirrors `neru_engine::deps::Overlay` one-to-one;
/// `OverlayHandle` only ever translates, never decides.
pub enum Command {
    /// Replace the hint set and show the hints layer.
    ShowHints(Vec<Hint>),
    /// Replace the grid cell set and show the grid layer.
    ShowGrid(Vec<GridCell>),
    /// Replace the current recursive-grid frame and show that layer.
    ShowRecursiveGrid(RecursiveGridFrame),
    /// Show the scroll indicator at an AppKit (bottom-left) screen point.
    ShowScrollIndicator(f64, f64),
    /// Show the generic mode indicator badge.
    ShowModeIndicator(Mode),
    /// Hide every layer.
    HideAll,
    /// Recompute every visible layer's placement against the active screen.
    ResizeToActiveScreen,
    /// Toggle screen-recording visibility for every overlay window.
    SetSharing(bool),
}
