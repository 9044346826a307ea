//! The Overlay Coordinator (§4.7): mode-switch dispatch to the active
//! overlay layer, plus the compress-to-one-retry screen-change transaction.

use std::sync::Arc;

use neru_protocol::{GridCell, Hint, Mode, RecursiveGridFrame};

use crate::{app_state::AppState, deps::Overlay, Result};

/// Drives the single `Overlay` implementation the engine was built with,
/// adding the transactional screen-change discipline described in §4.7.
pub struct OverlayCoordinator {
    overlay: Arc<dyn Overlay>,
}

impl OverlayCoordinator {
    /// Wraps a concrete overlay renderer.
    pub fn new(overlay: Arc<dyn Overlay>) -> Self {
        Self { overlay }
    }

    /// Hides every layer not owned by `mode` and shows/clears the one that
    /// is. Content for the mode is drawn by a subsequent `show_*` call once
    /// the router has built its initial state.
    pub fn switch_to(&self, mode: Mode) -> Result<()> {
        self.overlay.hide_all()?;
        if !mode.is_idle() {
            self.overlay.show_mode_indicator(mode)?;
        }
        Ok(())
    }

    /// Draws the live hint set.
    pub fn show_hints(&self, hints: &[Hint]) -> Result<()> {
        self.overlay.show_hints(hints)
    }

    /// Draws the grid/subgrid cell set.
    pub fn show_grid(&self, cells: &[GridCell]) -> Result<()> {
        self.overlay.show_grid(cells)
    }

    /// Draws the current recursive-grid frame.
    pub fn show_recursive_grid(&self, frame: &RecursiveGridFrame) -> Result<()> {
        self.overlay.show_recursive_grid(frame)
    }

    /// Draws the scroll mode indicator at a screen point.
    pub fn show_scroll_indicator(&self, at: (f64, f64)) -> Result<()> {
        self.overlay.show_scroll_indicator(at)
    }

    /// Hides every overlay layer, used on mode exit.
    pub fn hide_all(&self) -> Result<()> {
        self.overlay.hide_all()
    }

    /// Toggles screen-recording visibility for every overlay window.
    pub fn set_sharing(&self, hide_for_screen_share: bool) -> Result<()> {
        self.overlay.set_sharing(hide_for_screen_share)
    }

    /// Runs the screen-change transaction described in §4.7: resizes every
    /// layer, then asks `on_mode_refresh` to refresh the active router's
    /// content for the current mode. Folds concurrent notifications into
    /// a single pending-retry bit via `state`, re-running the transaction
    /// once more if one arrived mid-transaction.
    pub fn handle_screen_change(
        &self,
        state: &AppState,
        mode: Mode,
        mut on_mode_refresh: impl FnMut(Mode) -> Result<()>,
    ) -> Result<()> {
        if !state.begin_screen_change() {
            return Ok(());
        }
        loop {
            self.overlay.resize_to_active_screen()?;
            on_mode_refresh(mode)?;
            if !state.end_screen_change() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::NullOverlay;

    #[test]
    fn screen_change_runs_exactly_once_with_no_contention() {
        let coordinator = OverlayCoordinator::new(Arc::new(NullOverlay));
        let state = AppState::new();
        let mut refreshes = 0;
        coordinator
            .handle_screen_change(&state, Mode::Idle, |_| {
                refreshes += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(refreshes, 1);
    }

    #[test]
    fn a_pending_retry_during_the_transaction_reruns_it_once() {
        let coordinator = OverlayCoordinator::new(Arc::new(NullOverlay));
        let state = AppState::new();
        let mut refreshes = 0;
        coordinator
            .handle_screen_change(&state, Mode::Idle, |_| {
                refreshes += 1;
                if refreshes == 1 {
                    // A notification arrives mid-transaction.
                    state.begin_screen_change();
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(refreshes, 2);
    }
}
