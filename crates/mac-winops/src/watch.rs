//! Screen-parameter-change notifications, used to trigger the overlay's
//! screen-change debounce (display attach/detach, resolution change,
//! Spaces/display arrangement change).
//!
//! Mirrors the NSWorkspace-notification-observer pattern used for app
//! activation watching, but subscribes to `NSApplicationDidChangeScreen
//! ParametersNotification` on the default `NSNotificationCenter` instead.

use std::sync::Mutex;

use block2::StackBlock;
use crossbeam_channel::Sender;
use objc2::rc::Retained;
use objc2_app_kit::NSApplication;
use objc2_foundation::{MainThreadMarker, NSNotification, NSNotificationCenter};
use once_cell::sync::Lazy;

static SINK: Lazy<Mutex<Option<Sender<()>>>> = Lazy::new(|| Mutex::new(None));
static INSTALLED: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Register the channel that receives a `()` each time screen parameters
/// change. Replaces any previously registered sink.
pub fn set_sink(tx: Sender<()>) {
    *SINK.lock().expect("screen watch sink poisoned") = Some(tx);
}

/// Install the `NSApplicationDidChangeScreenParametersNotification` observer
/// on the shared `NSNotificationCenter`. Must run on the main thread. Safe to
/// call more than once; later calls are no-ops.
pub fn install_observer() -> crate::Result<()> {
    let mtm = MainThreadMarker::new().ok_or(crate::Error::MainThread)?;
    let mut installed = INSTALLED.lock().expect("screen watch installed poisoned");
    if *installed {
        return Ok(());
    }

    // Force NSApplication to exist so the notification actually fires.
    let _app = NSApplication::sharedApplication(mtm);

    let block = StackBlock::new(move |_note: std::ptr::NonNull<NSNotification>| {
        if let Some(tx) = SINK.lock().expect("screen watch sink poisoned").as_ref() {
            let _ = tx.send(());
        }
    });
    let block = block.copy();

    unsafe {
        let center = NSNotificationCenter::defaultCenter();
        let name = objc2_foundation::ns_string!("NSApplicationDidChangeScreenParametersNotification");
        let _observer: Retained<_> = center.addObserverForName_object_queue_usingBlock(
            Some(name),
            None,
            None,
            &block,
        );
    }

    *installed = true;
    Ok(())
}
