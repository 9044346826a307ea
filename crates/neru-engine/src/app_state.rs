//! The concurrent record of engine-wide scalar state (§4.10).
//!
//! Everything here is read far more often than written, so a single
//! `parking_lot::RwLock` guards the scalar fields; the two subscriber
//! registries are snapshotted and invoked outside that lock, matching the
//! lock order used throughout this crate: state lock, then registry
//! snapshot, then invoke.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::{Mutex, RwLock};

use neru_protocol::Mode;

/// Monotonic, non-zero subscriber ids.
type SubId = u64;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A registry of callbacks keyed by subscriber id, invoked outside any
/// other lock. Callbacks are `Arc`-shared so a notification pass can clone
/// the handle list and drop the registry lock before calling any of them.
struct Subscribers<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubId, Callback<T>)>>,
}

impl<T: Clone> Subscribers<T> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn subscribe(&self, cb: Callback<T>, immediate: T) -> SubId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().push((id, cb.clone()));
        cb(immediate);
        id
    }

    fn unsubscribe(&self, id: SubId) {
        self.entries.lock().retain(|(existing, _)| *existing != id);
    }

    /// Invokes every currently-registered callback with `value`, taking a
    /// snapshot of the registry first so invocation never happens under the
    /// registry lock.
    fn notify_all(&self, value: T) {
        let snapshot: Vec<Callback<T>> = {
            let guard = self.entries.lock();
            guard.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for cb in snapshot {
            cb(value.clone());
        }
    }
}

/// Scalar engine flags protected by one reader/writer lock.
struct Flags {
    enabled: bool,
    mode: Mode,
    hotkeys_registered: bool,
    hint_overlay_needs_refresh: bool,
    grid_overlay_needs_refresh: bool,
    hide_for_screen_share: bool,
    hotkey_refresh_pending: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: Mode::Idle,
            hotkeys_registered: false,
            hint_overlay_needs_refresh: false,
            grid_overlay_needs_refresh: false,
            hide_for_screen_share: false,
            hotkey_refresh_pending: false,
        }
    }
}

/// The engine-wide concurrent record described in §4.10.
pub struct AppState {
    flags: RwLock<Flags>,
    enabled_subs: Subscribers<bool>,
    share_subs: Subscribers<bool>,
    /// Screen-change processing in flight; paired with `screen_change_pending`.
    screen_change_processing: AtomicBool,
    /// Set when a screen-change notification arrives while one is already
    /// being processed; the coordinator checks this after finishing and
    /// reprocesses exactly once (§4.7's compress-to-one-retry discipline).
    screen_change_pending: AtomicBool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Builds a fresh state with every flag at its documented default.
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(Flags::default()),
            enabled_subs: Subscribers::new(),
            share_subs: Subscribers::new(),
            screen_change_processing: AtomicBool::new(false),
            screen_change_pending: AtomicBool::new(false),
        }
    }

    /// Whether the daemon is currently processing hotkeys/IPC mode commands.
    pub fn is_enabled(&self) -> bool {
        self.flags.read().enabled
    }

    /// Sets the enabled flag, notifying subscribers only on actual change.
    pub fn set_enabled(&self, value: bool) {
        let changed = {
            let mut guard = self.flags.write();
            if guard.enabled == value {
                false
            } else {
                guard.enabled = value;
                true
            }
        };
        if changed {
            self.enabled_subs.notify_all(value);
        }
    }

    /// The live mode.
    pub fn current_mode(&self) -> Mode {
        self.flags.read().mode
    }

    /// Sets the live mode. Mode changes have no dedicated subscriber
    /// registry; routers read `current_mode` directly when they need it.
    pub fn set_mode(&self, mode: Mode) {
        self.flags.write().mode = mode;
    }

    /// Whether the global hotkey table is currently registered with the OS.
    pub fn hotkeys_registered(&self) -> bool {
        self.flags.read().hotkeys_registered
    }

    /// Records whether hotkeys are registered.
    pub fn set_hotkeys_registered(&self, value: bool) {
        self.flags.write().hotkeys_registered = value;
    }

    /// Whether the hint overlay's cached content is stale.
    pub fn hint_overlay_needs_refresh(&self) -> bool {
        self.flags.read().hint_overlay_needs_refresh
    }

    /// Marks the hint overlay stale or fresh.
    pub fn set_hint_overlay_needs_refresh(&self, value: bool) {
        self.flags.write().hint_overlay_needs_refresh = value;
    }

    /// Whether the grid overlay's cached content is stale.
    pub fn grid_overlay_needs_refresh(&self) -> bool {
        self.flags.read().grid_overlay_needs_refresh
    }

    /// Marks the grid overlay stale or fresh.
    pub fn set_grid_overlay_needs_refresh(&self, value: bool) {
        self.flags.write().grid_overlay_needs_refresh = value;
    }

    /// Whether overlay windows should hide themselves during screen share.
    pub fn hide_for_screen_share(&self) -> bool {
        self.flags.read().hide_for_screen_share
    }

    /// Sets the screen-share hiding flag, notifying subscribers only on
    /// actual change.
    pub fn set_hide_for_screen_share(&self, value: bool) {
        let changed = {
            let mut guard = self.flags.write();
            if guard.hide_for_screen_share == value {
                false
            } else {
                guard.hide_for_screen_share = value;
                true
            }
        };
        if changed {
            self.share_subs.notify_all(value);
        }
    }

    /// Whether a mode exit owes the Focus Watcher a deferred re-check
    /// (§4.9: set while a mode other than Idle is active).
    pub fn hotkey_refresh_pending(&self) -> bool {
        self.flags.read().hotkey_refresh_pending
    }

    /// Sets or clears the deferred focus re-check bit.
    pub fn set_hotkey_refresh_pending(&self, value: bool) {
        self.flags.write().hotkey_refresh_pending = value;
    }

    /// Subscribes to `enabled` changes; invokes `cb` immediately with the
    /// current value, then on every subsequent actual change. Returns a
    /// non-zero id usable with [`Self::off_enabled_changed`].
    pub fn on_enabled_changed(&self, cb: impl Fn(bool) + Send + Sync + 'static) -> u64 {
        let current = self.is_enabled();
        self.enabled_subs.subscribe(Arc::new(cb), current)
    }

    /// Removes an `enabled` subscriber. No-op if `id` is unknown.
    pub fn off_enabled_changed(&self, id: u64) {
        self.enabled_subs.unsubscribe(id);
    }

    /// Subscribes to `hide_for_screen_share` changes; same semantics as
    /// [`Self::on_enabled_changed`].
    pub fn on_share_changed(&self, cb: impl Fn(bool) + Send + Sync + 'static) -> u64 {
        let current = self.hide_for_screen_share();
        self.share_subs.subscribe(Arc::new(cb), current)
    }

    /// Removes a screen-share subscriber. No-op if `id` is unknown.
    pub fn off_share_changed(&self, id: u64) {
        self.share_subs.unsubscribe(id);
    }

    /// Begins a screen-change transaction. Returns `true` when the caller
    /// should proceed immediately; `false` means a transaction is already
    /// in flight and this notification was folded into its pending-retry
    /// bit instead of starting a second one.
    pub fn begin_screen_change(&self) -> bool {
        if self
            .screen_change_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            true
        } else {
            self.screen_change_pending.store(true, Ordering::SeqCst);
            false
        }
    }

    /// Ends the current screen-change transaction. Returns `true` when a
    /// notification arrived mid-transaction and the caller must run the
    /// transaction again; clears the pending bit either way.
    pub fn end_screen_change(&self) -> bool {
        let retry = self.screen_change_pending.swap(false, Ordering::SeqCst);
        self.screen_change_processing.store(false, Ordering::SeqCst);
        retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn set_enabled_only_notifies_on_change() {
        let state = AppState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        state.on_enabled_changed(move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        state.set_enabled(true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        state.set_enabled(false);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        state.set_enabled(false);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_stops_future_notifications() {
        let state = AppState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let id = state.on_enabled_changed(move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
        });
        state.off_enabled_changed(id);
        state.set_enabled(false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn screen_change_compresses_concurrent_notifications() {
        let state = AppState::new();
        assert!(state.begin_screen_change());
        for _ in 0..9 {
            assert!(!state.begin_screen_change());
        }
        assert!(state.end_screen_change());
        assert!(!state.end_screen_change());
    }

    #[test]
    fn mode_round_trips() {
        let state = AppState::new();
        assert_eq!(state.current_mode(), Mode::Idle);
        state.set_mode(Mode::Hints);
        assert_eq!(state.current_mode(), Mode::Hints);
    }
}
