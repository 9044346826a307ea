//! System tray icon and menu wiring for the `neru` daemon.
use std::{process, sync::Arc, thread};

use neru_engine::{AppState, CoalescingSender, IpcJob};
use neru_protocol::{Action, Request, PROTOCOL_VERSION};
use tray_icon::{
    TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuEvent, MenuItem},
};

/// Submits `action` on `queue` and waits for the engine's reply, logging
/// the outcome. Mirrors `neru-server`'s request/reply pattern so the tray
/// behaves exactly like any other IPC client.
fn dispatch(queue: &CoalescingSender, action: Action) {
    let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
    let request = Request::new(PROTOCOL_VERSION, action);
    queue.send_ipc(IpcJob {
        request,
        reply: reply_tx,
    });
    match reply_rx.recv() {
        Ok(response) => {
            if !response.success {
                tracing::warn!(?response, "tray action rejected by the engine");
            }
        }
        Err(e) => tracing::warn!(error = %e, "tray action reply channel closed"),
    }
}

/// Builds the tray icon and spawns its menu-event listener thread.
///
/// There is no embedded icon image: the crate ships none, so the tray
/// renders as a tooltip-only item (`tray_icon` already treats the icon as
/// optional). Returns `None` if the platform tray fails to initialize,
/// which is not fatal — the daemon still runs, just without the menu.
pub fn build_tray_and_listeners(queue: CoalescingSender, app_state: Arc<AppState>) -> Option<TrayIcon> {
    let menu = Menu::new();
    let start = MenuItem::new("Start", true, None);
    let stop = MenuItem::new("Stop", true, None);
    let reload = MenuItem::new("Reload Config", true, None);
    let toggle_share = MenuItem::new("Toggle Screen Share", true, None);
    let quit = MenuItem::new("Quit", true, None);

    for (item, label) in [
        (&start, "start"),
        (&stop, "stop"),
        (&reload, "reload"),
        (&toggle_share, "toggle screen share"),
        (&quit, "quit"),
    ] {
        if let Err(e) = menu.append(item) {
            tracing::warn!(error = %e, item = label, "failed to append tray menu item");
        }
    }

    start.set_enabled(!app_state.is_enabled());
    stop.set_enabled(app_state.is_enabled());

    let start_id = start.id().clone();
    let stop_id = stop.id().clone();
    let reload_id = reload.id().clone();
    let toggle_share_id = toggle_share.id().clone();
    let quit_id = quit.id().clone();

    let tray = match TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_menu_on_left_click(true)
        .with_tooltip("neru")
        .build()
    {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::error!(error = %e, "failed to create tray icon");
            None
        }
    };

    if tray.is_some() {
        let start_item = start.clone();
        let stop_item = stop.clone();
        app_state.on_enabled_changed(move |enabled| {
            start_item.set_enabled(!enabled);
            stop_item.set_enabled(enabled);
        });

        thread::Builder::new()
            .name("neru-tray-menu".to_string())
            .spawn(move || {
                let menu_rx = MenuEvent::receiver();
                while let Ok(ev) = menu_rx.recv() {
                    if ev.id == quit_id {
                        tracing::info!("quit requested from tray menu");
                        process::exit(0);
                    } else if ev.id == start_id {
                        dispatch(&queue, Action::Start);
                    } else if ev.id == stop_id {
                        dispatch(&queue, Action::Stop);
                    } else if ev.id == reload_id {
                        dispatch(&queue, Action::ReloadConfig);
                    } else if ev.id == toggle_share_id {
                        dispatch(&queue, Action::ToggleScreenShare);
                    }
                }
            })
            .expect("failed to spawn the tray menu listener thread");
    }

    tray
}
