//! Background CGWindowList polling: a bootstrap/fallback source of focus
//! events for the window between process start and the NSWorkspace
//! observer's installation on the main thread, and a source of window
//! title changes the NSWorkspace activation notification doesn't cover.

use std::{thread, time::Duration};

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::{cg::front_app_title_pid, event::FocusEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Spawns the CG/AX polling thread, emitting [`FocusEvent`]s to `tx`.
pub(crate) fn start_watcher(tx: UnboundedSender<FocusEvent>) {
    thread::Builder::new()
        .name("mac-focus-watcher-poll".to_string())
        .spawn(move || poll_loop(tx))
        .expect("spawn focus watcher poll thread");
}

fn poll_loop(tx: UnboundedSender<FocusEvent>) {
    let mut last_app = String::new();
    let mut last_pid = -1i32;
    let mut last_title = String::new();

    loop {
        let (app, title, pid) = front_app_title_pid();

        if pid != last_pid || app != last_app {
            debug!(app = %app, pid, "focus watcher poll observed app change");
            if tx
                .send(FocusEvent::AppChanged {
                    bundle_id: None,
                    title: app.clone(),
                    pid,
                })
                .is_err()
            {
                return;
            }
            last_app = app;
            last_pid = pid;
            last_title.clear();
        }

        if title != last_title {
            if tx
                .send(FocusEvent::TitleChanged {
                    title: title.clone(),
                    pid,
                })
                .is_err()
            {
                return;
            }
            last_title = title;
        }

        thread::sleep(POLL_INTERVAL);
    }
}
