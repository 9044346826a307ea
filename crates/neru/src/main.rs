#![deny(clippy::disallowed_methods)]
//! Binary entrypoint for the `neru` accessibility daemon.
//!
//! Single process, single main-thread windowing loop: `eframe::run_native`
//! (via `overlay::build`'s run closure) owns the only event loop AppKit
//! gets. Everything else — the mode engine, the IPC listener, the focus
//! and screen-change bridges — runs on its own dedicated thread, feeding
//! the engine's serial command queue (§5).

use std::{path::PathBuf, process, sync::Arc, thread};

use clap::{Parser, Subcommand};
use config::Config;
use logging::LogArgs;
use neru_engine::{CoalescingSender, Engine, EngineEvent, MIN_QUEUE_DEPTH, RealHotkeyApi};
use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy};
use objc2_foundation::MainThreadMarker;
use tracing::{error, info, warn};

mod tray;

#[derive(Parser, Debug)]
#[command(name = "neru", about = "Keyboard-driven pointer replacement for accessibility", version)]
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the IPC socket (defaults to `<tmpdir>/neru.sock`).
    #[arg(long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Path to the configuration file (defaults to the XDG/legacy search).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Logging controls.
    #[command(flatten)]
    log: LogArgs,

    /// Write logs to this file in addition to stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log file rotation: "daily" (default), "hourly", or "never".
    #[arg(long, value_name = "POLICY")]
    log_rotation: Option<String>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to the configuration file to check (defaults to the usual search).
        path: Option<PathBuf>,
        /// Dump the parsed configuration as JSON to stdout.
        #[arg(long)]
        dump: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let _log_guard = logging::init(&cli.log.spec(), cli.log_file.as_deref(), cli.log_rotation.as_deref())
        .expect("logging subscriber already installed");

    if let Some(Command::Check { path, dump }) = &cli.command {
        run_check(path.clone().or_else(|| cli.config.clone()), *dump);
        return;
    }

    let status = permissions::check_permissions();
    if !status.accessibility_ok || !status.input_ok {
        error!(
            accessibility = status.accessibility_ok,
            input_monitoring = status.input_ok,
            "missing required permissions; grant Accessibility and Input Monitoring in System Settings, then restart"
        );
        process::exit(1);
    }

    let config_path = config::resolve_config_path(cli.config.as_deref());
    let config = match &config_path {
        Some(path) => match config::load_from_path(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("{}", e.pretty());
                process::exit(1);
            }
        },
        None => {
            info!("no configuration file found, starting with defaults");
            Config::default()
        }
    };

    let Some(mtm) = MainThreadMarker::new() else {
        error!("neru must be launched on the process main thread");
        process::exit(1);
    };
    NSApplication::sharedApplication(mtm).setActivationPolicy(NSApplicationActivationPolicy::Accessory);

    let collector: Arc<dyn accessibility::Collector> = Arc::new(accessibility::RealCollector::new());
    let hotkey_manager = match mac_hotkey::Manager::new() {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "failed to start the hotkey event tap");
            process::exit(1);
        }
    };
    let hotkeys: Arc<dyn neru_engine::HotkeyApi> = Arc::new(RealHotkeyApi::new(hotkey_manager));

    let (overlay_handle, run_overlay) = overlay::build();

    let engine = Arc::new(Engine::new(config, collector, overlay_handle, hotkeys));
    if let Some(path) = &config_path {
        engine.set_config_path(path.clone());
    }

    let (queue_tx, queue_rx) = neru_engine::channel(MIN_QUEUE_DEPTH);
    engine.start(queue_tx.clone());

    let engine_worker = engine.clone();
    thread::Builder::new()
        .name("neru-engine".to_string())
        .spawn(move || engine_worker.run(queue_rx))
        .expect("failed to spawn the engine worker thread");

    let socket_path = cli.socket.clone().unwrap_or_else(neru_server::default_socket_path);
    let server_queue = queue_tx.clone();
    thread::Builder::new()
        .name("neru-ipc".to_string())
        .spawn(move || {
            if let Err(e) = neru_server::serve(&socket_path, server_queue) {
                error!(error = %e, "IPC listener exited");
            }
        })
        .expect("failed to spawn the IPC listener thread");

    spawn_screen_watch(queue_tx.clone());
    spawn_focus_watch(queue_tx.clone());

    let _tray = tray::build_tray_and_listeners(queue_tx.clone(), engine.app_state().clone());

    if let Err(e) = run_overlay() {
        error!(error = %e, "overlay app exited with an error");
        process::exit(1);
    }
}

/// Installs the `NSApplicationDidChangeScreenParametersNotification`
/// observer and bridges its events onto the engine's queue as
/// `EngineEvent::ScreenChanged` (§4.7).
fn spawn_screen_watch(queue: CoalescingSender) {
    let (tx, rx) = crossbeam_channel::unbounded();
    mac_winops::set_sink(tx);
    if let Err(e) = mac_winops::install_observer() {
        warn!(error = %e, "failed to install screen-change observer");
        return;
    }
    thread::Builder::new()
        .name("neru-screen-watch".to_string())
        .spawn(move || {
            for () in rx {
                queue.send(EngineEvent::ScreenChanged);
            }
        })
        .expect("failed to spawn the screen-watch bridge thread");
}

/// Starts the focus watcher and bridges its events onto the engine's queue
/// as `EngineEvent::FocusChanged`/`TitleChanged` (§4.9).
fn spawn_focus_watch(queue: CoalescingSender) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    if let Err(e) = mac_focus_watcher::start_watcher(tx) {
        warn!(error = %e, "failed to start the focus watcher");
        return;
    }
    thread::Builder::new()
        .name("neru-focus-bridge".to_string())
        .spawn(move || {
            while let Some(event) = rx.blocking_recv() {
                match event {
                    mac_focus_watcher::FocusEvent::AppChanged { bundle_id, .. } => {
                        queue.send(EngineEvent::FocusChanged { bundle_id });
                    }
                    mac_focus_watcher::FocusEvent::TitleChanged { .. } => {
                        queue.send(EngineEvent::TitleChanged);
                    }
                }
            }
        })
        .expect("failed to spawn the focus-watch bridge thread");
}

/// Resolves and validates the configuration at `path` (or the default
/// search), printing either "OK" or the parsed document as JSON.
fn run_check(path: Option<PathBuf>, dump: bool) {
    let resolved = match config::resolve_config_path(path.as_deref()) {
        Some(p) => p,
        None => {
            eprintln!("no configuration file found");
            process::exit(1);
        }
    };
    match config::load_from_path(&resolved) {
        Ok(cfg) => {
            if dump {
                match serde_json::to_string_pretty(&cfg) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("failed to serialize configuration: {e}");
                        process::exit(1);
                    }
                }
            } else {
                println!("OK");
            }
        }
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_subcommand_parses_path_and_dump() {
        let cli = Cli::parse_from(["neru", "check", "/tmp/neru.toml", "--dump"]);
        match cli.command {
            Some(Command::Check { path, dump }) => {
                assert_eq!(path, Some(PathBuf::from("/tmp/neru.toml")));
                assert!(dump);
            }
            other => panic!("expected Check subcommand, got {other:?}"),
        }
    }

    #[test]
    fn plain_invocation_has_no_subcommand() {
        let cli = Cli::parse_from(["neru", "--socket", "/tmp/neru.sock"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.socket, Some(PathBuf::from("/tmp/neru.sock")));
    }
}
