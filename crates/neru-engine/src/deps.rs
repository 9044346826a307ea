//! Dependency-injection seams for the platform services the engine drives.
//!
//! Each trait mirrors one OS-level collaborator named in §1 as an external
//! collaborator; a `Real*` implementation wraps the live platform crate and
//! a `Mock*`/`Null*` implementation lets routers and the mode engine be
//! exercised without touching the screen or the accessibility tree.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use crossbeam_channel::Receiver;
use mac_keycode::Chord;
use neru_protocol::{Error, GridCell, Hint, Mode, RecursiveGridFrame};

use crate::Result;

/// An RAII handle released by dropping it; used for both a tap-suspend
/// request and a capture-all request, mirroring `mac_hotkey::Guard`.
pub trait CaptureToken: Send {}

impl CaptureToken for mac_hotkey::CaptureGuard {}

/// A capture token that does nothing, for tests that never start a real tap.
pub struct NoopCaptureToken;
impl CaptureToken for NoopCaptureToken {}

/// The global-hotkey half of the keystroke pipeline (§4.6a): named
/// combinations registered with the OS, delivered as intercepted or
/// pass-through events.
pub trait HotkeyApi: Send + Sync {
    /// Registers `chord` with interception enabled, returning its id.
    fn intercept(&self, chord: Chord) -> u32;
    /// Removes a registration. No-op if `id` is unknown.
    fn unregister(&self, id: u32) -> Result<()>;
    /// Forces interception of every matched key until the token is dropped.
    fn capture_all(&self) -> Box<dyn CaptureToken>;
    /// The channel on which matched events are delivered.
    fn events(&self) -> Receiver<mac_hotkey::Event>;
}

/// Wraps a running [`mac_hotkey::Manager`].
pub struct RealHotkeyApi {
    inner: Arc<mac_hotkey::Manager>,
}

impl RealHotkeyApi {
    /// Builds an adapter over an already-started manager.
    pub fn new(inner: Arc<mac_hotkey::Manager>) -> Self {
        Self { inner }
    }
}

impl HotkeyApi for RealHotkeyApi {
    fn intercept(&self, chord: Chord) -> u32 {
        self.inner.intercept(chord)
    }

    fn unregister(&self, id: u32) -> Result<()> {
        self.inner
            .unregister(id)
            .map_err(|e| Error::HotkeyRegisterFailed("unregister".to_string(), e.to_string()))
    }

    fn capture_all(&self) -> Box<dyn CaptureToken> {
        Box::new(self.inner.capture_all())
    }

    fn events(&self) -> Receiver<mac_hotkey::Event> {
        self.inner.events()
    }
}

/// A fake hotkey API for tests: hands out increasing ids, never touches the
/// OS. Tests drive it by sending on [`MockHotkeyApi::sender`].
pub struct MockHotkeyApi {
    next_id: AtomicU32,
    tx: crossbeam_channel::Sender<mac_hotkey::Event>,
    rx: Receiver<mac_hotkey::Event>,
}

impl Default for MockHotkeyApi {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(256);
        Self { next_id: AtomicU32::new(0), tx, rx }
    }
}

impl MockHotkeyApi {
    /// Builds a fresh mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender tests can use to inject synthetic hotkey events.
    pub fn sender(&self) -> crossbeam_channel::Sender<mac_hotkey::Event> {
        self.tx.clone()
    }
}

impl HotkeyApi for MockHotkeyApi {
    fn intercept(&self, _chord: Chord) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn unregister(&self, _id: u32) -> Result<()> {
        Ok(())
    }

    fn capture_all(&self) -> Box<dyn CaptureToken> {
        Box::new(NoopCaptureToken)
    }

    fn events(&self) -> Receiver<mac_hotkey::Event> {
        self.rx.clone()
    }
}

/// The renderer capability set the Overlay Coordinator drives (§4.7, §9's
/// "Renderer capability set" redesign note). Each router's activation calls
/// only the subset it needs.
pub trait Overlay: Send + Sync {
    /// Draws the live hint set, replacing whatever was shown before.
    fn show_hints(&self, hints: &[Hint]) -> Result<()>;
    /// Draws the grid/subgrid cell set.
    fn show_grid(&self, cells: &[GridCell]) -> Result<()>;
    /// Draws the current recursive-grid frame.
    fn show_recursive_grid(&self, frame: &RecursiveGridFrame) -> Result<()>;
    /// Draws the scroll mode indicator at a screen point.
    fn show_scroll_indicator(&self, at: (f64, f64)) -> Result<()>;
    /// Draws a generic mode indicator (used while a mode has no other
    /// overlay content, e.g. immediately after activation).
    fn show_mode_indicator(&self, mode: Mode) -> Result<()>;
    /// Hides every overlay layer.
    fn hide_all(&self) -> Result<()>;
    /// Resizes every visible layer to the currently active screen.
    fn resize_to_active_screen(&self) -> Result<()>;
    /// Toggles screen-recording visibility for every overlay window.
    fn set_sharing(&self, hide_for_screen_share: bool) -> Result<()>;
}

/// An overlay that draws nothing, for tests and non-macOS tooling.
pub struct NullOverlay;

impl Overlay for NullOverlay {
    fn show_hints(&self, _hints: &[Hint]) -> Result<()> {
        Ok(())
    }
    fn show_grid(&self, _cells: &[GridCell]) -> Result<()> {
        Ok(())
    }
    fn show_recursive_grid(&self, _frame: &RecursiveGridFrame) -> Result<()> {
        Ok(())
    }
    fn show_scroll_indicator(&self, _at: (f64, f64)) -> Result<()> {
        Ok(())
    }
    fn show_mode_indicator(&self, _mode: Mode) -> Result<()> {
        Ok(())
    }
    fn hide_all(&self) -> Result<()> {
        Ok(())
    }
    fn resize_to_active_screen(&self) -> Result<()> {
        Ok(())
    }
    fn set_sharing(&self, _hide_for_screen_share: bool) -> Result<()> {
        Ok(())
    }
}
