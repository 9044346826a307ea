//! macOS-only global hotkey manager.
//!
//! Runs a CoreGraphics event tap on a dedicated OS thread. Registered
//! key combinations are matched against every keystroke the tap observes;
//! matches are delivered as [`Event`]s over a channel, and may optionally
//! be suppressed from reaching the focused application ("intercept").
//!
//! This is the *key-event tap* half of the keystroke pipeline; the
//! *global hotkeys* half (OS-level named combinations with their own
//! callback) has no macOS counterpart distinct from this tap — both
//! surfaces are served by the one event tap here, since CoreGraphics
//! exposes keyboard interception as a single mechanism.

mod error;
mod policy;
mod sys;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    thread,
};

use crossbeam_channel::{Receiver, Sender, bounded};
pub use eventtag::HOTK_TAG;
use mac_keycode::{Chord, Key, Modifier};
use parking_lot::Mutex;
use tracing::warn;

pub use error::{Error, Result};
pub use policy::Decision;

/// Whether a key-down or key-up was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The key was pressed (or is auto-repeating).
    KeyDown,
    /// The key was released.
    KeyUp,
}

/// A matched hotkey event delivered to the manager's channel.
#[derive(Debug, Clone)]
pub struct Event {
    /// The registration id that matched.
    pub id: u32,
    /// The chord that was registered.
    pub hotkey: Chord,
    /// Whether this is a key-down or key-up.
    pub kind: EventKind,
    /// Whether this key-down is an OS auto-repeat.
    pub repeat: bool,
}

/// Per-registration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Suppress this key from reaching the focused application.
    pub intercept: bool,
}

#[derive(Debug, Clone)]
struct Registration {
    hotkey: Chord,
    intercept: bool,
}

/// Shared manager state, read and mutated from both the public API and the
/// tap callback running on the event-tap thread.
#[derive(Default)]
pub struct Inner {
    next_id: u32,
    registrations: HashMap<u32, Registration>,
    suspend: u32,
    capture_all: u32,
    intercepted_down: HashSet<Key>,
}

impl Inner {
    fn note_intercept_down(&mut self, key: Key) {
        self.intercepted_down.insert(key);
    }

    fn intercept_on_repeat(&self, key: Key) -> bool {
        self.intercepted_down.contains(&key)
    }

    fn intercept_on_keyup(&mut self, key: Key) -> bool {
        self.intercepted_down.remove(&key)
    }
}

/// Looks up the registration matching `key` + `mods`, if any.
fn match_event(inner: &Inner, key: Key, mods: &HashSet<Modifier>) -> Option<(u32, Registration)> {
    inner
        .registrations
        .iter()
        .find(|(_, reg)| reg.hotkey.key == key && &reg.hotkey.modifiers == mods)
        .map(|(id, reg)| (*id, reg.clone()))
}

/// Registers `hotkey` directly against `inner`, bypassing a running
/// [`Manager`]. Exists for unit tests that exercise matching/policy logic
/// without starting an event tap.
pub fn test_register(inner: &mut Inner, hotkey: Chord, options: RegisterOptions) -> u32 {
    inner.next_id += 1;
    let id = inner.next_id;
    inner.registrations.insert(
        id,
        Registration {
            hotkey,
            intercept: options.intercept,
        },
    );
    id
}

/// Context shared with the event-tap callback.
#[derive(Clone)]
pub(crate) struct CallbackCtx {
    inner: Arc<Mutex<Inner>>,
    tx: Sender<Event>,
}

/// RAII guard releasing one suspend or capture-all request on drop.
pub struct Guard {
    inner: Arc<Mutex<Inner>>,
    field: GuardField,
}

#[derive(Clone, Copy)]
enum GuardField {
    Suspend,
    CaptureAll,
}

impl Drop for Guard {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        let counter = match self.field {
            GuardField::Suspend => &mut inner.suspend,
            GuardField::CaptureAll => &mut inner.capture_all,
        };
        *counter = counter.saturating_sub(1);
    }
}

/// A held capture-all request; while any guard is alive, every matched key
/// is intercepted regardless of its own registration.
pub type CaptureGuard = Guard;
/// A held tap-suspension request; while any guard is alive, the tap
/// neither emits nor intercepts.
pub type SuspendGuard = Guard;

/// The running hotkey manager: owns the event-tap thread and the shared
/// registration table it reads from.
pub struct Manager {
    inner: Arc<Mutex<Inner>>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    ctrl: Arc<sys::SysControl>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Manager {
    /// Starts the event tap on a dedicated thread and blocks until it
    /// reports ready (or reports a startup failure).
    pub fn new() -> Result<Arc<Self>> {
        let inner = Arc::new(Mutex::new(Inner::default()));
        let (tx, rx) = bounded(256);
        let ctrl = Arc::new(sys::SysControl::new());

        let (ready_tx, ready_rx) = bounded(1);
        let cb_ctx = CallbackCtx {
            inner: inner.clone(),
            tx: tx.clone(),
        };
        let thread_ctrl = ctrl.clone();
        let handle = thread::Builder::new()
            .name("mac-hotkey-tap".to_string())
            .spawn(move || {
                if let Err(err) = sys::run_event_loop(cb_ctx, ready_tx, thread_ctrl) {
                    warn!(%err, "event tap thread exited with error");
                }
            })
            .map_err(|e| Error::OsError(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| Error::EventTapStart)??;

        Ok(Arc::new(Self {
            inner,
            tx,
            rx,
            ctrl,
            thread: Mutex::new(Some(handle)),
        }))
    }

    /// The channel on which matched [`Event`]s are delivered.
    pub fn events(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    /// Registers `hotkey` with `options`, returning its id.
    pub fn register(&self, hotkey: Chord, options: RegisterOptions) -> Result<u32> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.registrations.insert(
            id,
            Registration {
                hotkey,
                intercept: options.intercept,
            },
        );
        Ok(id)
    }

    /// Registers `hotkey` with interception enabled, logging and dropping
    /// the binding on failure rather than propagating an error (per the
    /// per-binding hotkey-registration failure policy).
    pub fn intercept(&self, hotkey: Chord) -> u32 {
        match self.register(hotkey.clone(), RegisterOptions { intercept: true }) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, hotkey = %hotkey, "hotkey registration failed, dropping binding");
                0
            }
        }
    }

    /// Removes a registration. No-op if `id` is unknown.
    pub fn unregister(&self, id: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.registrations.remove(&id).is_none() {
            return Err(Error::InvalidId);
        }
        Ok(())
    }

    /// Suspends tap emission and interception until the returned guard is
    /// dropped. Guards nest: the tap stays suspended while any are alive.
    pub fn suspend(&self) -> SuspendGuard {
        self.inner.lock().suspend += 1;
        Guard {
            inner: self.inner.clone(),
            field: GuardField::Suspend,
        }
    }

    /// Forces interception of every matched key until the returned guard is
    /// dropped, regardless of each registration's own `intercept` option.
    pub fn capture_all(&self) -> CaptureGuard {
        self.inner.lock().capture_all += 1;
        Guard {
            inner: self.inner.clone(),
            field: GuardField::CaptureAll,
        }
    }

    /// Stops the event tap's run loop and joins its thread.
    pub fn shutdown(&self) {
        self.ctrl.stop();
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use mac_keycode::Key;

    use super::*;

    #[test]
    fn match_event_finds_registered_chord() {
        let mut inner = Inner::default();
        let hotkey = Chord {
            key: Key::H,
            modifiers: {
                let mut s = HashSet::new();
                s.insert(Modifier::Control);
                s
            },
        };
        let id = test_register(&mut inner, hotkey.clone(), RegisterOptions { intercept: true });

        let mut mods = HashSet::new();
        mods.insert(Modifier::Control);
        let (matched_id, reg) = match_event(&inner, Key::H, &mods).expect("match");
        assert_eq!(matched_id, id);
        assert!(reg.intercept);
    }

    #[test]
    fn keyup_intercept_mirrors_keydown() {
        let mut inner = Inner::default();
        inner.note_intercept_down(Key::J);
        assert!(inner.intercept_on_repeat(Key::J));
        assert!(inner.intercept_on_keyup(Key::J));
        assert!(!inner.intercept_on_keyup(Key::J));
    }
}
