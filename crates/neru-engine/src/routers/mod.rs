//! The four stateful target-selection routers (§4.2-§4.5).
//!
//! Each router owns its own addressing state and is driven one canonical
//! key at a time by the mode engine; none of them touches AppState or the
//! overlay directly; the engine applies their outcome.

mod grid;
mod hints;
mod recursive_grid;
mod scroll;

pub use grid::GridRouter;
pub use hints::HintsRouter;
pub use recursive_grid::RecursiveGridRouter;
pub use scroll::ScrollRouter;

use neru_protocol::PendingAction;
use pointer::Pointer;

use crate::Result;

/// What a router did with one canonical key.
pub enum Outcome {
    /// More keys are expected; overlay content may have changed.
    Continue,
    /// The router committed its action and should be torn down.
    Resolved,
    /// The router should be torn down without performing an action.
    Abort,
}

/// Performs `action` (or the default left click when `None`) at `point`.
pub(crate) fn perform(pointer: &Pointer, action: &PendingAction, point: (f64, f64)) -> Result<()> {
    match action.as_deref() {
        None | Some("left_click") => pointer.left_click(point),
        Some("right_click") => pointer.right_click(point),
        Some("middle_click") => pointer.middle_click(point),
        Some("double_click") => pointer.double_click(point),
        Some("triple_click") => pointer.triple_click(point),
        Some(other) => {
            tracing::warn!(action = other, "unknown pending action, defaulting to left click");
            pointer.left_click(point)
        }
    }
    .map_err(|e| neru_protocol::Error::ActionFailed(e.to_string()))
}
