//! The Overlay Coordinator's concrete renderer (§4.7): an `eframe`/`egui`
//! window per overlay layer (hints, grid, recursive-grid, scroll indicator,
//! mode indicator).
//!
//! [`neru_engine::Overlay`] is implemented by [`OverlayHandle`], which
//! only translates each call into a [`Command`] and wakes the render
//! thread; all window creation, placement, and drawing happens inside
//! [`OverlayApp`] on the thread `eframe::run_native` owns, since AppKit
//! requires every window operation on the main thread. [`build`] is the
//! seam between the two: call it once on the process's main thread, hand
//! the returned handle to the engine, then call the returned closure last
//! (it never returns until the app quits).

mod app;
mod command;
mod geometry;
mod nswindow;
mod layers;

use std::sync::Arc;

use command::Command;
use neru_engine::Overlay;
use neru_protocol::{Error, GridCell, Hint, Mode, RecursiveGridFrame};
use parking_lot::Mutex;

pub use app::OverlayApp;

/// The engine-facing handle: cheap to clone (`Arc`), safe to call from the
/// engine's worker thread.
pub struct OverlayHandle {
    tx: crossbeam_channel::Sender<Command>,
    ctx: Mutex<Option<egui::Context>>,
}

impl OverlayHandle {
    fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!("overlay app is gone, dropping command");
            return;
        }
        if let Some(ctx) = self.ctx.lock().as_ref() {
            ctx.request_repaint();
        }
    }
}

impl Overlay for OverlayHandle {
    fn show_hints(&self, hints: &[Hint]) -> neru_engine::Result<()> {
        self.send(Command::ShowHints(hints.to_vec()));
        Ok(())
    }

    fn show_grid(&self, cells: &[GridCell]) -> neru_engine::Result<()> {
        self.send(Command::ShowGrid(cells.to_vec()));
        Ok(())
    }

    fn show_recursive_grid(&self, frame: &RecursiveGridFrame) -> neru_engine::Result<()> {
        self.send(Command::ShowRecursiveGrid(frame.clone()));
        Ok(())
    }

    fn show_scroll_indicator(&self, at: (f64, f64)) -> neru_engine::Result<()> {
        self.send(Command::ShowScrollIndicator(at.0, at.1));
        Ok(())
    }

    fn show_mode_indicator(&self, mode: Mode) -> neru_engine::Result<()> {
        self.send(Command::ShowModeIndicator(mode));
        Ok(())
    }

    fn hide_all(&self) -> neru_engine::Result<()> {
        self.send(Command::HideAll);
        Ok(())
    }

    fn resize_to_active_screen(&self) -> neru_engine::Result<()> {
        self.send(Command::ResizeToActiveScreen);
        Ok(())
    }

    fn set_sharing(&self, hide_for_screen_share: bool) -> neru_engine::Result<()> {
        self.send(Command::SetSharing(hide_for_screen_share));
        Ok(())
    }
}

/// Builds the overlay's engine-facing handle and its main-thread run
/// closure. Call `run` on the process's main thread; it blocks until the
/// overlay app exits.
#[must_use]
pub fn build() -> (Arc<OverlayHandle>, impl FnOnce() -> Result<(), Error>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = Arc::new(OverlayHandle {
        tx,
        ctx: Mutex::new(None),
    });
    let handle_for_app = handle.clone();

    let run = move || -> Result<(), Error> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_visible(false)
                .with_transparent(true),
            ..Default::default()
        };
        eframe::run_native(
            "neru-overlay",
            options,
            Box::new(move |cc| {
                cc.egui_ctx
                    .send_viewport_cmd(egui::ViewportCommand::Visible(false));
                *handle_for_app.ctx.lock() = Some(cc.egui_ctx.clone());
                Ok(Box::new(OverlayApp::new(rx)))
            }),
        )
        .map_err(|e| Error::OverlayFailed(e.to_string()))
    };
    (handle, run)
}
