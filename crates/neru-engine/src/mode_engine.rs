//! The Mode Engine (§4.1): the single command surface every keystroke, IPC
//! command, and focus/screen notification ultimately reaches.
//!
//! Every public method here is meant to be called from exactly one
//! thread — the worker thread running [`Engine::run`] — matching §5's "no
//! suspension points within the engine's queue step" rule. Other threads
//! only ever reach the engine by sending on its [`crate::queue`].

use std::{
    path::PathBuf,
    sync::{Arc, RwLock},
};

use accessibility::Collector;
use config::Config;
use crossbeam_channel::Receiver;
use neru_protocol::{CollectFilter, Mode, PendingAction, Rect as NRect};
use parking_lot::Mutex;
use pointer::Pointer;

use crate::{
    app_state::AppState,
    deps::{HotkeyApi, Overlay},
    focus_gate::FocusGate,
    keys,
    overlay_coordinator::OverlayCoordinator,
    pipeline::Pipeline,
    queue::EngineEvent,
    routers::{GridRouter, HintsRouter, Outcome, RecursiveGridRouter, ScrollRouter},
    Error, Result,
};

fn to_neru_rect(r: mac_winops::Rect) -> NRect {
    NRect::new(r.x, r.y, r.w, r.h)
}

fn active_screen(cursor: (f64, f64)) -> Result<NRect> {
    mac_winops::active_screen_frame(cursor.0, cursor.1)
        .map(to_neru_rect)
        .map_err(|e| Error::AccessibilityFailed(e.to_string()))
}

fn hint_filter(cfg: &Config) -> CollectFilter {
    CollectFilter {
        include_menubar: cfg.hints.include_menubar,
        include_dock: cfg.hints.include_dock,
        include_notification_center: cfg.hints.include_notification_center,
        additional_menubar_targets: cfg.hints.additional_menubar_targets.clone(),
        clickable_roles: cfg.hints.clickable_roles.clone(),
    }
}

/// The currently-live stateful router, if any. `Action` mode has no
/// variant here: it resolves at the IPC layer, not through `handle_key`.
enum ActiveRouter {
    Hints(HintsRouter),
    Grid(GridRouter),
    RecursiveGrid(RecursiveGridRouter),
    Scroll(ScrollRouter),
}

/// The mode engine: owns the current router, the cursor snapshot, and
/// every collaborator a mode activation touches.
pub struct Engine {
    state: Arc<AppState>,
    config: RwLock<Arc<Config>>,
    config_path: Mutex<Option<PathBuf>>,
    collector: Arc<dyn Collector>,
    pointer: Pointer,
    overlay: OverlayCoordinator,
    pipeline: Mutex<Pipeline>,
    focus_gate: Mutex<FocusGate>,
    router: Mutex<Option<ActiveRouter>>,
    cursor_snapshot: Mutex<Option<(f64, f64)>>,
    last_focus: Mutex<Option<String>>,
}

impl Engine {
    /// Builds a fresh engine. Does not register any hotkeys or start the
    /// keystroke pipeline's consumer thread; call [`Self::start`] once the
    /// engine is wrapped in an `Arc`.
    pub fn new(
        config: Config,
        collector: Arc<dyn Collector>,
        overlay: Arc<dyn Overlay>,
        hotkeys: Arc<dyn HotkeyApi>,
    ) -> Self {
        let focus_gate = FocusGate::new(&config.general.excluded_apps);
        let pipeline = Pipeline::new(hotkeys);
        Self {
            state: Arc::new(AppState::new()),
            config: RwLock::new(Arc::new(config)),
            config_path: Mutex::new(None),
            collector,
            pointer: Pointer::new(),
            overlay: OverlayCoordinator::new(overlay),
            pipeline: Mutex::new(pipeline),
            focus_gate: Mutex::new(focus_gate),
            router: Mutex::new(None),
            cursor_snapshot: Mutex::new(None),
            last_focus: Mutex::new(None),
        }
    }

    /// The config path used for `reload_config`, recorded once at startup.
    pub fn set_config_path(&self, path: PathBuf) {
        *self.config_path.lock() = Some(path);
    }

    fn config(&self) -> Arc<Config> {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Registers the global hotkey table from the current configuration.
    /// Called once at startup and again after a reload.
    pub fn register_hotkeys(&self) {
        let table = self.config().hotkey_bindings();
        self.pipeline.lock().register_global_hotkeys(&table);
        self.state.set_hotkeys_registered(true);
    }

    /// Spawns the keystroke pipeline's background consumer thread, feeding
    /// `queue`. Registers the global hotkey table first.
    pub fn start(self: &Arc<Self>, queue: crate::queue::CoalescingSender) {
        self.register_hotkeys();
        self.pipeline.lock().spawn_consumer(queue);
    }

    /// The live mode, AppState's authoritative copy.
    pub fn current(&self) -> Mode {
        self.state.current_mode()
    }

    /// Shared state handle, for the server/CLI layer to subscribe to
    /// enabled/screen-share changes.
    pub fn app_state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Consumes `rx` on the calling thread forever, dispatching each event
    /// to the appropriate handler. Intended to run on its own dedicated
    /// thread; this is the one place mode transitions and router calls
    /// actually happen (§5's serial queue step).
    pub fn run(self: &Arc<Self>, rx: Receiver<EngineEvent>) {
        for event in rx {
            match event {
                EngineEvent::Key(key) => self.on_key(&key),
                EngineEvent::FocusChanged { bundle_id } => self.on_focus_changed(bundle_id.as_deref()),
                EngineEvent::TitleChanged => {}
                EngineEvent::ScreenChanged => self.on_screen_changed(),
                EngineEvent::Ipc(job) => {
                    let response = self.dispatch(job.request);
                    let _ = job.reply.send(response);
                }
            }
        }
    }

    fn on_key(&self, key: &str) {
        if self.current().is_idle() {
            let table = self.config().hotkey_bindings();
            if let Some(command) = table.get(key) {
                self.run_command(command.clone());
            }
            return;
        }
        if key == keys::ESCAPE {
            self.exit();
            return;
        }
        match self.handle_key(key) {
            Ok(()) => {}
            Err(e) => tracing::warn!(error = %e, "router key handling failed"),
        }
    }

    fn run_command(&self, command: neru_protocol::Command) {
        match command {
            neru_protocol::Command::Internal(spec) => {
                let mut parts = spec.splitn(2, ' ');
                let mode = parts.next().and_then(mode_from_action_name);
                let pending = parts.next().map(|s| s.to_string());
                match mode {
                    Some(Mode::Idle) => self.exit(),
                    Some(mode) => {
                        if let Err(e) = self.activate(mode, pending) {
                            tracing::warn!(error = %e, mode = ?mode, "activation failed");
                        }
                    }
                    None => tracing::warn!(spec, "unrecognized internal hotkey command"),
                }
            }
            neru_protocol::Command::Exec(shell) => self.spawn_shell(&shell),
        }
    }

    fn spawn_shell(&self, shell: &str) {
        let log_env = logging::log_config_for_child();
        match std::process::Command::new("/bin/sh")
            .arg("-c")
            .arg(shell)
            .env("RUST_LOG", log_env)
            .spawn()
        {
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, command = shell, "failed to spawn shell command"),
        }
    }

    /// Activates `mode` with an optional pending pointer action. Rejected
    /// (logged, no-op) if disabled, mode-disabled in configuration, or the
    /// foreground app is excluded.
    pub fn activate(&self, mode: Mode, pending_action: PendingAction) -> Result<()> {
        if !self.state.is_enabled() {
            tracing::debug!("activation rejected: daemon disabled");
            return Ok(());
        }
        let cfg = self.config();
        if !mode_enabled(&cfg, mode) {
            return Err(Error::ModeDisabled);
        }
        if !self.current().is_idle() {
            self.exit();
        }

        if cfg.general.restore_cursor_position {
            let pos = mac_winops::cursor_position().map_err(|e| Error::AccessibilityFailed(e.to_string()))?;
            *self.cursor_snapshot.lock() = Some(pos);
        }

        self.pipeline.lock().unregister_global_hotkeys();
        self.state.set_hotkeys_registered(false);

        let cursor = mac_winops::cursor_position().unwrap_or((0.0, 0.0));
        let screen = active_screen(cursor)?;

        let built = self.build_router(mode, &cfg, screen, pending_action);
        let router = match built {
            Ok(r) => r,
            Err(e) => {
                // Entry failed: leave the engine in Idle (no tap enabled,
                // no router installed).
                self.register_hotkeys();
                return Err(e);
            }
        };

        let alphabet = suppressed_alphabet(&cfg, mode);
        self.pipeline.lock().enable_tap(&alphabet);
        self.state.set_mode(mode);
        *self.router.lock() = Some(router);
        self.overlay.switch_to(mode)?;
        self.paint_current()?;
        Ok(())
    }

    /// Activates `mode` with no pending action (the binding-table default).
    pub fn activate_with_default(&self, mode: Mode) -> Result<()> {
        self.activate(mode, None)
    }

    fn build_router(&self, mode: Mode, cfg: &Config, screen: NRect, pending_action: PendingAction) -> Result<ActiveRouter> {
        match mode {
            Mode::Hints => {
                let filter = hint_filter(cfg);
                let router = HintsRouter::new(self.collector.clone(), filter, &cfg.hints.hint_characters, pending_action)?;
                Ok(ActiveRouter::Hints(router))
            }
            Mode::Grid => Ok(ActiveRouter::Grid(GridRouter::new(
                screen,
                &cfg.grid.characters,
                cfg.grid.effective_sublayer_keys(),
                pending_action,
            ))),
            Mode::RecursiveGrid => Ok(ActiveRouter::RecursiveGrid(RecursiveGridRouter::new(
                screen,
                cfg.recursive_grid.size,
                cfg.recursive_grid.pixel_threshold as f64,
                &cfg.grid.characters,
                pending_action,
            ))),
            Mode::Scroll => {
                let bindings = crate::routers::scroll::BindingMap::new(&default_scroll_bindings());
                let steps = crate::routers::scroll::StepSizes {
                    char: cfg.scroll.scroll_step as i32,
                    half_page: cfg.scroll.scroll_step_half as i32,
                    full_page: cfg.scroll.scroll_step_full as i32,
                };
                Ok(ActiveRouter::Scroll(ScrollRouter::new(bindings, steps)))
            }
            Mode::Idle | Mode::Action => Err(Error::Internal("mode has no router".to_string())),
        }
    }

    fn paint_current(&self) -> Result<()> {
        let guard = self.router.lock();
        match guard.as_ref() {
            Some(ActiveRouter::Hints(r)) => self.overlay.show_hints(r.hints()),
            Some(ActiveRouter::Grid(r)) => self.overlay.show_grid(r.visible_cells()),
            Some(ActiveRouter::RecursiveGrid(r)) => self.overlay.show_recursive_grid(r.current_frame()),
            Some(ActiveRouter::Scroll(_)) => {
                let at = mac_winops::cursor_position().unwrap_or((0.0, 0.0));
                self.overlay.show_scroll_indicator(at)
            }
            None => Ok(()),
        }
    }

    /// Feeds one canonical key to the current router.
    pub fn handle_key(&self, key: &str) -> Result<()> {
        let outcome = {
            let mut guard = self.router.lock();
            match guard.as_mut() {
                Some(ActiveRouter::Hints(r)) => r.handle_key(key, &self.pointer)?,
                Some(ActiveRouter::Grid(r)) => r.handle_key(key, &self.pointer)?,
                Some(ActiveRouter::RecursiveGrid(r)) => r.handle_key(key, &self.pointer)?,
                Some(ActiveRouter::Scroll(r)) => r.handle_key(key, &self.pointer)?,
                None => return Ok(()),
            }
        };
        match outcome {
            Outcome::Continue => self.paint_current(),
            Outcome::Resolved | Outcome::Abort => {
                self.exit();
                Ok(())
            }
        }
    }

    /// Tears down the current router and returns to Idle. Idempotent.
    pub fn exit(&self) {
        if self.current().is_idle() {
            return;
        }
        let _ = self.overlay.hide_all();
        *self.router.lock() = None;
        if let Some(pos) = self.cursor_snapshot.lock().take() {
            let _ = mac_winops::warp_cursor(pos.0, pos.1);
        }
        self.pipeline.lock().disable_tap();
        self.state.set_mode(Mode::Idle);

        if self.state.hotkey_refresh_pending() {
            self.state.set_hotkey_refresh_pending(false);
            self.apply_focus_exclusion();
        } else {
            self.register_hotkeys();
        }
    }

    /// Registers or unregisters the global hotkey table based on the last
    /// known foreground application, per §4.9's exclusion policy.
    fn apply_focus_exclusion(&self) {
        let last_focus = self.last_focus.lock().clone();
        let excluded = self.focus_gate.lock().is_excluded(last_focus.as_deref());
        if excluded {
            self.pipeline.lock().unregister_global_hotkeys();
            self.state.set_hotkeys_registered(false);
        } else {
            self.register_hotkeys();
        }
    }

    fn on_focus_changed(&self, bundle_id: Option<&str>) {
        *self.last_focus.lock() = bundle_id.map(str::to_string);
        if !self.current().is_idle() {
            self.state.set_hotkey_refresh_pending(true);
            return;
        }
        self.apply_focus_exclusion();
    }

    fn on_screen_changed(&self) {
        let mode = self.current();
        let _ = self.overlay.handle_screen_change(&self.state, mode, |m| {
            match m {
                Mode::Hints => {
                    let mut guard = self.router.lock();
                    if let Some(ActiveRouter::Hints(r)) = guard.as_mut() {
                        r.refresh()?;
                    }
                }
                Mode::Grid => self.state.set_grid_overlay_needs_refresh(true),
                _ => {}
            }
            Ok(())
        });
    }

    /// Dispatches one IPC request (§4.8), producing its response.
    pub fn dispatch(&self, req: neru_protocol::Request) -> neru_protocol::Response {
        if !req.version.is_empty() && req.version != neru_protocol::PROTOCOL_VERSION {
            return neru_protocol::Response::from_error(&Error::VersionMismatch);
        }
        match self.dispatch_inner(&req) {
            Ok(resp) => resp,
            Err(e) => neru_protocol::Response::from_error(&e),
        }
    }

    fn dispatch_inner(&self, req: &neru_protocol::Request) -> Result<neru_protocol::Response> {
        use neru_protocol::{Action as A, Response};
        match req.action {
            A::Ping => Ok(Response::ok("pong")),
            A::Start => {
                if self.state.is_enabled() {
                    return Err(Error::AlreadyRunning);
                }
                self.state.set_enabled(true);
                Ok(Response::ok("started"))
            }
            A::Stop => {
                if !self.state.is_enabled() {
                    return Err(Error::NotRunning);
                }
                self.state.set_enabled(false);
                Ok(Response::ok("stopped"))
            }
            A::Hints => {
                self.activate(Mode::Hints, req.params.as_ref().and_then(|p| p.action.clone()))?;
                Ok(Response::ok("hints active"))
            }
            A::Grid => {
                self.activate(Mode::Grid, req.params.as_ref().and_then(|p| p.action.clone()))?;
                Ok(Response::ok("grid active"))
            }
            A::RecursiveGrid => {
                self.activate(Mode::RecursiveGrid, req.params.as_ref().and_then(|p| p.action.clone()))?;
                Ok(Response::ok("recursive grid active"))
            }
            A::Scroll => {
                self.activate(Mode::Scroll, req.params.as_ref().and_then(|p| p.action.clone()))?;
                Ok(Response::ok("scroll active"))
            }
            A::Idle => {
                self.exit();
                Ok(Response::ok("idle"))
            }
            A::Status => Ok(Response::ok_with_data("status", self.status_json())),
            A::Config => {
                let data = serde_json::to_value(&*self.config())
                    .map_err(|e| Error::Internal(e.to_string()))?;
                Ok(Response::ok_with_data("config", data))
            }
            A::ReloadConfig => self.reload_config(),
            A::Health => Ok(Response::ok_with_data("health", self.health_json())),
            A::Action => self.dispatch_action(&req.args),
            A::ToggleScreenShare => {
                let new_value = !self.state.hide_for_screen_share();
                self.state.set_hide_for_screen_share(new_value);
                self.overlay.set_sharing(new_value)?;
                Ok(Response::ok("screen share visibility toggled"))
            }
        }
    }

    fn status_json(&self) -> serde_json::Value {
        serde_json::json!({
            "enabled": self.state.is_enabled(),
            "mode": self.current(),
            "hide_for_screen_share": self.state.hide_for_screen_share(),
        })
    }

    fn health_json(&self) -> serde_json::Value {
        let accessibility_ok = self.collector.collect(&CollectFilter::default()).is_ok();
        let pointer_ok = mac_winops::cursor_position().is_ok();
        serde_json::json!({
            "accessibility": accessibility_ok,
            "pointer": pointer_ok,
        })
    }

    /// `action` with no args enters Action mode; with `--x=N --y=N` moves
    /// absolute; with `--dx=N --dy=N` moves relative; a bare action name
    /// performs at the current cursor (§4.8).
    fn dispatch_action(&self, args: &[String]) -> Result<neru_protocol::Response> {
        use neru_protocol::Response;
        if args.is_empty() {
            self.state.set_mode(Mode::Action);
            self.overlay.switch_to(Mode::Action)?;
            return Ok(Response::ok("action mode active"));
        }
        let mut x = None;
        let mut y = None;
        let mut dx = None;
        let mut dy = None;
        let mut name = None;
        for arg in args {
            if let Some(v) = arg.strip_prefix("--x=") {
                x = v.parse::<f64>().ok();
            } else if let Some(v) = arg.strip_prefix("--y=") {
                y = v.parse::<f64>().ok();
            } else if let Some(v) = arg.strip_prefix("--dx=") {
                dx = v.parse::<f64>().ok();
            } else if let Some(v) = arg.strip_prefix("--dy=") {
                dy = v.parse::<f64>().ok();
            } else {
                name = Some(arg.clone());
            }
        }

        if let (Some(x), Some(y)) = (x, y) {
            self.pointer.move_to((x, y)).map_err(|e| Error::ActionFailed(e.to_string()))?;
        } else if dx.is_some() || dy.is_some() {
            self.pointer
                .move_by(dx.unwrap_or(0.0), dy.unwrap_or(0.0))
                .map_err(|e| Error::ActionFailed(e.to_string()))?;
        } else if let Some(name) = name {
            let cursor = mac_winops::cursor_position().map_err(|e| Error::AccessibilityFailed(e.to_string()))?;
            crate::routers::perform(&self.pointer, &Some(name), cursor)?;
        } else {
            return Err(Error::InvalidInput("action requires coordinates or an action name".to_string()));
        }

        if matches!(self.current(), Mode::Action) {
            self.exit();
        }
        Ok(Response::ok("action performed"))
    }

    /// Runs the Config Reload procedure (§4.11) against `self.config_path`.
    pub fn reload_config(&self) -> Result<neru_protocol::Response> {
        let path = self
            .config_path
            .lock()
            .clone()
            .ok_or_else(|| Error::InvalidConfig("no config path set".to_string()))?;

        // Step 1: load-and-validate; on failure, retain the current
        // configuration and surface the error (the caller logs/alerts).
        let new_config = crate::config_reload::load_and_validate(&path)
            .map_err(|e| Error::InvalidConfig(e.pretty()))?;

        // Step 2: exit current mode if not Idle.
        self.exit();

        // Step 3: unregister all hotkeys if registered.
        if self.state.hotkeys_registered() {
            self.pipeline.lock().unregister_global_hotkeys();
            self.state.set_hotkeys_registered(false);
        }

        // Step 4: atomically swap the configuration pointer.
        let old_share = self.config().general.hide_overlay_in_screen_share;
        *self.config.write().expect("config lock poisoned") = Arc::new(new_config.clone());

        // Step 5: rebuild derived caches. Routers are rebuilt fresh on
        // next activation from the new config, so there is no persistent
        // cache to rebuild here beyond the focus gate's exclusion set.
        self.focus_gate.lock().set_excluded(&new_config.general.excluded_apps);

        // Step 6: notify the overlay if screen-share hiding changed.
        if new_config.general.hide_overlay_in_screen_share != old_share {
            self.overlay.set_sharing(new_config.general.hide_overlay_in_screen_share)?;
        }

        // Step 7: re-evaluate focus gating and re-register hotkeys.
        self.register_hotkeys();

        Ok(neru_protocol::Response::ok("configuration reloaded"))
    }
}

fn mode_enabled(cfg: &Config, mode: Mode) -> bool {
    match mode {
        Mode::Hints => cfg.hints.enabled,
        Mode::Grid => cfg.grid.enabled,
        Mode::RecursiveGrid => cfg.recursive_grid.enabled,
        Mode::Scroll | Mode::Action | Mode::Idle => true,
    }
}

fn suppressed_alphabet(cfg: &Config, mode: Mode) -> String {
    match mode {
        Mode::Hints => cfg.hints.hint_characters.clone(),
        Mode::Grid => {
            let mut chars: Vec<char> = cfg.grid.characters.chars().collect();
            for c in cfg.grid.effective_sublayer_keys().chars() {
                if !chars.contains(&c) {
                    chars.push(c);
                }
            }
            chars.into_iter().collect()
        }
        Mode::RecursiveGrid => cfg.grid.characters.clone(),
        Mode::Scroll => "hjklgG".to_string(),
        Mode::Action | Mode::Idle => String::new(),
    }
}

fn mode_from_action_name(name: &str) -> Option<Mode> {
    match name {
        "hints" => Some(Mode::Hints),
        "grid" => Some(Mode::Grid),
        "recursive_grid" => Some(Mode::RecursiveGrid),
        "scroll" => Some(Mode::Scroll),
        "idle" => Some(Mode::Idle),
        _ => None,
    }
}

/// The default vim-style scroll binding set (§4.5). Not yet surfaced as a
/// configuration table; tracked as a follow-up.
fn default_scroll_bindings() -> Vec<(&'static str, crate::routers::scroll::Action)> {
    use crate::routers::scroll::Action::*;
    vec![
        ("j", ScrollDown),
        ("k", ScrollUp),
        ("h", ScrollLeft),
        ("l", ScrollRight),
        ("ctrl+d", PageDown),
        ("ctrl+u", PageUp),
        ("gg", GoTop),
        ("G", GoBottom),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessibility::MockCollector;
    use crate::deps::{MockHotkeyApi, NullOverlay};

    fn engine() -> Arc<Engine> {
        Arc::new(Engine::new(
            Config::default(),
            Arc::new(MockCollector::new(vec![])),
            Arc::new(NullOverlay),
            Arc::new(MockHotkeyApi::new()),
        ))
    }

    #[test]
    fn ping_returns_pong() {
        let e = engine();
        let resp = e.dispatch(neru_protocol::Request::new("", neru_protocol::Action::Ping));
        assert!(resp.success);
        assert_eq!(resp.message, "pong");
    }

    #[test]
    fn start_twice_rejects_second_call() {
        let e = engine();
        e.state.set_enabled(false);
        let first = e.dispatch(neru_protocol::Request::new("", neru_protocol::Action::Start));
        assert!(first.success);
        let second = e.dispatch(neru_protocol::Request::new("", neru_protocol::Action::Start));
        assert!(!second.success);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let e = engine();
        let resp = e.dispatch(neru_protocol::Request::new("9.9.9", neru_protocol::Action::Ping));
        assert!(!resp.success);
        assert_eq!(resp.code, neru_protocol::Code::ErrVersionMismatch);
    }

    #[test]
    fn idle_is_the_initial_mode() {
        let e = engine();
        assert_eq!(e.current(), Mode::Idle);
    }
}
