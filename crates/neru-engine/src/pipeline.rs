//! The Keystroke Pipeline (§4.6): hotkey registration/suppression
//! bookkeeping plus the background thread that drains the OS event tap and
//! feeds the engine's serial queue.

use std::{
    collections::HashMap,
    sync::Arc,
    thread::{self, JoinHandle},
};

use mac_hotkey::EventKind;
use mac_keycode::Chord;
use neru_protocol::HotkeyBinding;

use crate::{
    deps::HotkeyApi,
    queue::{CoalescingSender, EngineEvent},
};

/// A set of registered chords tracked so they can all be unregistered
/// together (the global hotkey table, or a mode's suppressed key set).
#[derive(Default)]
struct Registry {
    ids: HashMap<u32, String>,
}

impl Registry {
    fn register(&mut self, hotkeys: &dyn HotkeyApi, keys: impl IntoIterator<Item = String>) {
        for key in keys {
            let Some(chord) = Chord::parse(&key) else {
                tracing::warn!(key, "key does not parse as a chord, skipping registration");
                continue;
            };
            let id = hotkeys.intercept(chord);
            if id != 0 {
                self.ids.insert(id, key);
            }
        }
    }

    fn clear(&mut self, hotkeys: &dyn HotkeyApi) {
        for id in self.ids.keys() {
            let _ = hotkeys.unregister(*id);
        }
        self.ids.clear();
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Registration and suppressed-key-set bookkeeping for the two keystroke
/// surfaces. Both are served by the same underlying OS tap (`HotkeyApi`),
/// distinguished only by which [`Registry`] tracks their ids.
pub struct Pipeline {
    hotkeys: Arc<dyn HotkeyApi>,
    global_hotkeys: Registry,
    mode_keys: Registry,
}

impl Pipeline {
    /// Builds a pipeline over a started hotkey API. Registers nothing yet;
    /// call [`Self::register_global_hotkeys`] once a binding table is
    /// available.
    pub fn new(hotkeys: Arc<dyn HotkeyApi>) -> Self {
        Self {
            hotkeys,
            global_hotkeys: Registry::default(),
            mode_keys: Registry::default(),
        }
    }

    /// Registers every binding in `table` as an intercepted global hotkey.
    /// Per-binding registration failures are logged and dropped; this
    /// never fails as a whole (§4.6a).
    pub fn register_global_hotkeys(&mut self, table: &HotkeyBinding) {
        self.global_hotkeys.register(self.hotkeys.as_ref(), table.keys().cloned());
    }

    /// Unregisters every currently-registered global hotkey.
    pub fn unregister_global_hotkeys(&mut self) {
        self.global_hotkeys.clear(self.hotkeys.as_ref());
    }

    /// Whether the global hotkey table is currently registered.
    pub fn global_hotkeys_registered(&self) -> bool {
        !self.global_hotkeys.is_empty()
    }

    /// Enables the key-event tap for an active mode: registers the union
    /// of `alphabet`'s characters and the fixed navigation keys.
    pub fn enable_tap(&mut self, alphabet: &str) {
        let keys = alphabet
            .chars()
            .map(|c| c.to_string())
            .chain(crate::keys::NAVIGATION_SPECS.iter().map(|s| s.to_string()));
        self.mode_keys.register(self.hotkeys.as_ref(), keys);
    }

    /// Disables the key-event tap, unregistering every key it suppressed.
    pub fn disable_tap(&mut self) {
        self.mode_keys.clear(self.hotkeys.as_ref());
    }

    /// Spawns the background thread draining the OS event tap into the
    /// engine's queue. Only key-down events are forwarded; repeats and
    /// key-up are dropped at the source per the canonicalize-and-enqueue
    /// contract (routers don't need repeat/up events).
    pub fn spawn_consumer(&self, target: CoalescingSender) -> JoinHandle<()> {
        let hotkeys = self.hotkeys.clone();
        thread::Builder::new()
            .name("neru-keystroke-pipeline".to_string())
            .spawn(move || {
                let rx = hotkeys.events();
                while let Ok(event) = rx.recv() {
                    if event.kind != EventKind::KeyDown || event.repeat {
                        continue;
                    }
                    let key = event.hotkey.to_string_canonical();
                    target.send(EngineEvent::Key(key));
                }
            })
            .expect("failed to spawn keystroke pipeline thread")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::MockHotkeyApi;

    #[test]
    fn enable_tap_registers_alphabet_and_navigation() {
        let hotkeys = Arc::new(MockHotkeyApi::new());
        let mut pipeline = Pipeline::new(hotkeys);
        pipeline.enable_tap("ab");
        assert_eq!(
            pipeline.mode_keys.ids.len(),
            2 + crate::keys::NAVIGATION_SPECS.len()
        );
        pipeline.disable_tap();
        assert!(pipeline.mode_keys.is_empty());
    }

    #[test]
    fn global_hotkeys_register_and_clear() {
        let hotkeys = Arc::new(MockHotkeyApi::new());
        let mut pipeline = Pipeline::new(hotkeys);
        let mut table = HotkeyBinding::new();
        table.insert("cmd+shift+h".to_string(), neru_protocol::Command::Internal("hints".to_string()));
        pipeline.register_global_hotkeys(&table);
        assert!(pipeline.global_hotkeys_registered());
        pipeline.unregister_global_hotkeys();
        assert!(!pipeline.global_hotkeys_registered());
    }
}
