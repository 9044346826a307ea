//! mac-focus-watcher: observe focused app and window title changes on macOS.
//!
//! This crate provides a focused watcher for foreground application and window
//! title changes by combining two sources:
//! - CoreGraphics `CGWindowList` polling, for bootstrap, fallback, and window
//!   title changes (NSWorkspace has no title-change notification).
//! - NSWorkspace activation notifications on the main thread, the
//!   authoritative source of bundle-id-bearing app-change events.
//!
//! Integration overview (no code):
//! - Call `start_watcher(tx)` on the process's main thread once the app is
//!   ready to start focus tracking (e.g. from `eframe`'s creation-context
//!   callback, since AppKit always runs that on the main thread). This will:
//!   - Register `tx` as the sink for [`FocusEvent`]s emitted by both the
//!     NSWorkspace callback and the background CG/AX watcher thread.
//!   - Install the NSWorkspace observer synchronously.
//!   - Spawn a background thread that polls CGWindowList for bootstrap,
//!     fallback, and title-change coverage.
//!
//! All operations are macOS-only and may require Accessibility permission.

mod cg;
mod event;
mod ns;
mod watcher;

// Ensure Accessibility symbols (kAX* constants, AX* functions) link correctly
#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {}

pub use event::FocusEvent;
pub use ns::install_ns_workspace_observer;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Errors that can occur when interacting with mac-focus-watcher public APIs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("NS observer state mutex poisoned")]
    NsObserverPoisoned,
}

/// Starts the focus watcher end-to-end.
///
/// When to call:
/// - Invoke once, on the main thread, once your application is ready to
///   receive focus updates (for instance, after completing any IPC or UI
///   handshake).
///
/// Effects:
/// - Registers `tx` as the sink for [`FocusEvent`]s (both NS and CG/AX).
/// - Installs the NSWorkspace observer on the calling (main) thread.
/// - Spawns the background watcher thread which emits [`FocusEvent`]s to `tx`.
pub fn start_watcher(tx: UnboundedSender<FocusEvent>) -> Result<(), Error> {
    ns::set_ns_sink(tx.clone());
    ns::install_ns_workspace_observer()?;
    watcher::start_watcher(tx);
    Ok(())
}
