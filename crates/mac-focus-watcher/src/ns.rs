use std::{ptr::NonNull, sync::Mutex};

use block2::StackBlock;
use objc2_app_kit::{NSRunningApplication, NSWorkspace};
use objc2_foundation::NSNotification;
use once_cell::sync::Lazy;
use tracing::info;

use crate::event::FocusEvent;

// Global sink for NSWorkspace events (emitted from server main thread)
static NS_SINK: Lazy<Mutex<Option<tokio::sync::mpsc::UnboundedSender<FocusEvent>>>> =
    Lazy::new(|| Mutex::new(None));

/// Set the sink used by NSWorkspace notifications to forward focus events.
///
/// Must be called before installing the NSWorkspace observer.
pub(crate) fn set_ns_sink(tx: tokio::sync::mpsc::UnboundedSender<FocusEvent>) {
    if let Ok(mut guard) = NS_SINK.lock() {
        *guard = Some(tx);
    }
}

/// Emit an AppChanged event into the NS sink; used by NSWorkspace callback.
pub(crate) fn ns_emit_app_changed(bundle_id: Option<String>, title: String, pid: i32) {
    if let Ok(guard) = NS_SINK.lock()
        && let Some(tx) = &*guard
    {
        let _ = tx.send(FocusEvent::AppChanged {
            bundle_id,
            title,
            pid,
        });
    }
}

// Global token to keep NSWorkspace observer alive
static NS_OBS_TOKEN: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Install the NSWorkspace activation observer on the current (main) thread.
///
/// When to call:
/// - Called directly by [`crate::start_watcher`], which itself must be
///   called on the main thread (e.g. from `eframe`'s creation-context
///   callback, which AppKit always runs there).
///
/// Notes:
/// - Must run on the main thread.
/// - Idempotent: subsequent calls are no-ops; only the first call performs the install.
pub fn install_ns_workspace_observer() -> Result<(), crate::Error> {
    if let Ok(mut installed) = NS_OBS_TOKEN.lock() {
        if *installed {
            return Ok(());
        }
        unsafe {
            let ws = NSWorkspace::sharedWorkspace();
            let center = ws.notificationCenter();
            let block = StackBlock::new(move |notif: NonNull<NSNotification>| {
                let notif = notif.as_ref();
                let mut sent = false;
                if let Some(obj) = notif.object()
                    && let Some(app) = obj.downcast_ref::<NSRunningApplication>()
                {
                    let pid = app.processIdentifier();
                    let bundle_id = app.bundleIdentifier().and_then(|bid| {
                        let c = bid.UTF8String();
                        if c.is_null() {
                            None
                        } else {
                            std::ffi::CStr::from_ptr(c).to_str().ok().map(str::to_string)
                        }
                    });
                    let title = app
                        .localizedName()
                        .and_then(|name| {
                            let c = name.UTF8String();
                            if c.is_null() {
                                None
                            } else {
                                std::ffi::CStr::from_ptr(c).to_str().ok().map(str::to_string)
                            }
                        })
                        .unwrap_or_default();
                    ns_emit_app_changed(bundle_id, title, pid);
                    sent = true;
                }
                if !sent {
                    ns_emit_app_changed(None, String::new(), -1);
                }
            })
            .copy();
            let _token =
                center.addObserverForName_object_queue_usingBlock(None, None, None, &block);
            // Keep process-global observer alive implicitly; center retains the block.
            *installed = true;
            info!("NSWorkspace observer installed");
        }
        Ok(())
    } else {
        Err(crate::Error::NsObserverPoisoned)
    }
}
