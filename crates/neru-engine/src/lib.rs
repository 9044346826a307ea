//! The mode engine crate: routers, the keystroke pipeline, overlay
//! coordination, focus gating and config reload, driven by one serial
//! command queue (§5).
//!
//! [`Engine`] is the crate's single entry point. Everything else here is a
//! collaborator it owns or a dependency-injection seam (`deps`) letting it
//! be built against either the real macOS platform crates or the mocks used
//! by this crate's own test suite.

mod app_state;
mod config_reload;
mod deps;
mod error;
mod focus_gate;
mod keys;
mod mode_engine;
mod overlay_coordinator;
mod pipeline;
mod queue;
mod routers;

pub use app_state::AppState;
pub use deps::{CaptureToken, HotkeyApi, MockHotkeyApi, NoopCaptureToken, NullOverlay, Overlay, RealHotkeyApi};
pub use error::{Error, Result};
pub use mode_engine::Engine;
pub use queue::{channel, CoalescingSender, EngineEvent, IpcJob, MIN_QUEUE_DEPTH};
