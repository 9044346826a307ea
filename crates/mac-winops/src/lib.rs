//! macOS-specific screen and cursor queries.
//!
//! Scope is deliberately narrow: everything the overlay/grid/scroll routers
//! need to reason about "where is the pointer and which screen is it on",
//! plus a notifier for screen-arrangement changes. Window placement and
//! fullscreen toggling (the teacher's original remit for this crate) have
//! no counterpart here and were dropped.

mod cursor;
mod error;
mod geom;
mod screen;
mod watch;

pub use cursor::{cursor_position, warp_cursor};
pub use error::{Error, Result};
pub use geom::Rect;
pub use screen::{active_screen_frame, global_top};
pub use watch::{install_observer, set_sink};
