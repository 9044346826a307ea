//! The overlay's `eframe::App`: five independently shown/hidden viewports,
//! one per layer, driven by [`Command`]s drained from the engine thread.

use crossbeam_channel::Receiver;
use eframe::{App, Frame};
use egui::{pos2, Context, ViewportBuilder, ViewportCommand, ViewportId};
use neru_protocol::{GridCell, Hint, Mode, RecursiveGridFrame};

use crate::{command::Command, geometry, layers, nswindow};

const TITLE_HINTS: &str = "neru-hints";
const TITLE_GRID: &str = "neru-grid";
const TITLE_RECURSIVE_GRID: &str = "neru-recursive-grid";
const TITLE_SCROLL: &str = "neru-scroll";
const TITLE_MODE_INDICATOR: &str = "neru-mode-indicator";

const ALL_TITLES: [&str; 5] = [
    TITLE_HINTS,
    TITLE_GRID,
    TITLE_RECURSIVE_GRID,
    TITLE_SCROLL,
    TITLE_MODE_INDICATOR,
];

/// Shared show/hide state for a single overlay window.
struct Layer {
    id: ViewportId,
    visible: bool,
}

impl Layer {
    fn new(id_salt: &str) -> Self {
        Self {
            id: ViewportId::from_hash_of(id_salt),
            visible: false,
        }
    }
}

/// The overlay application. Owns one [`Layer`] per overlay content type plus
/// whatever content each last received; renders every visible layer each
/// frame and applies pending `Command`s first.
pub struct OverlayApp {
    commands: Receiver<Command>,
    hints_layer: Layer,
    hints: Vec<Hint>,
    grid_layer: Layer,
    cells: Vec<GridCell>,
    recursive_grid_layer: Layer,
    recursive_grid: Option<RecursiveGridFrame>,
    scroll_layer: Layer,
    scroll_at: (f64, f64),
    mode_indicator_layer: Layer,
    mode: Mode,
    hide_for_screen_share: bool,
}

impl OverlayApp {
    /// Builds a fresh app draining `commands`. All layers start hidden.
    pub fn new(commands: Receiver<Command>) -> Self {
        Self {
            commands,
            hints_layer: Layer::new("neru-overlay-hints"),
            hints: Vec::new(),
            grid_layer: Layer::new("neru-overlay-grid"),
            cells: Vec::new(),
            recursive_grid_layer: Layer::new("neru-overlay-recursive-grid"),
            recursive_grid: None,
            scroll_layer: Layer::new("neru-overlay-scroll"),
            scroll_at: (0.0, 0.0),
            mode_indicator_layer: Layer::new("neru-overlay-mode-indicator"),
            mode: Mode::Idle,
            hide_for_screen_share: false,
        }
    }

    fn hide_all(&mut self) {
        self.hints_layer.visible = false;
        self.grid_layer.visible = false;
        self.recursive_grid_layer.visible = false;
        self.scroll_layer.visible = false;
        self.mode_indicator_layer.visible = false;
    }

    fn drain_commands(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                Command::ShowHints(hints) => {
                    self.mode_indicator_layer.visible = false;
                    self.hints = hints;
                    self.hints_layer.visible = true;
                }
                Command::ShowGrid(cells) => {
                    self.mode_indicator_layer.visible = false;
                    self.cells = cells;
                    self.grid_layer.visible = true;
                }
                Command::ShowRecursiveGrid(frame) => {
                    self.mode_indicator_layer.visible = false;
                    self.recursive_grid = Some(frame);
                    self.recursive_grid_layer.visible = true;
                }
                Command::ShowScrollIndicator(x, y) => {
                    self.mode_indicator_layer.visible = false;
                    self.scroll_at = (x, y);
                    self.scroll_layer.visible = true;
                }
                Command::ShowModeIndicator(mode) => {
                    self.mode = mode;
                    self.mode_indicator_layer.visible = true;
                }
                Command::HideAll => self.hide_all(),
                Command::ResizeToActiveScreen => {}
                Command::SetSharing(hide) => self.hide_for_screen_share = hide,
            }
        }
    }

    fn show_window(&self, ctx: &Context, id: ViewportId, title: &str, frame_rect: egui::Rect) {
        if !frame_rect.is_positive() {
            return;
        }
        let builder = ViewportBuilder::default()
            .with_title(title)
            .with_decorations(false)
            .with_always_on_top()
            .with_transparent(true)
            .with_has_shadow(false)
            .with_visible(true)
            .with_position(frame_rect.min)
            .with_inner_size(frame_rect.size());
        ctx.show_viewport_immediate(id, builder, |vctx, _| {
            nswindow::apply_transparent_rounded(title, 0.0);
            nswindow::set_on_all_spaces(title);
            let window_origin = frame_rect.min;
            match title {
                TITLE_HINTS => layers::render_hints(vctx, window_origin, &self.hints),
                TITLE_GRID => layers::render_grid(vctx, window_origin, &self.cells),
                TITLE_RECURSIVE_GRID => {
                    if let Some(frame) = &self.recursive_grid {
                        layers::render_recursive_grid(vctx, window_origin, frame);
                    }
                }
                TITLE_SCROLL => {
                    let at = geometry::point_to_top_left(self.scroll_at.0, self.scroll_at.1);
                    layers::render_scroll_indicator(vctx, window_origin, at);
                }
                TITLE_MODE_INDICATOR => {
                    layers::render_mode_indicator(vctx, frame_rect.size(), self.mode);
                }
                _ => {}
            }
        });
    }

    fn hide_window(ctx: &Context, id: ViewportId) {
        ctx.send_viewport_cmd_to(id, ViewportCommand::Visible(false));
    }
}

impl App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Color32::TRANSPARENT.to_normalized_gamma_f32()
    }

    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.drain_commands();

        let screen = geometry::active_screen_frame_top_left();
        let small = egui::Rect::from_min_size(pos2(screen.min.x, screen.min.y), egui::vec2(220.0, 48.0));

        if self.hints_layer.visible {
            self.show_window(ctx, self.hints_layer.id, TITLE_HINTS, screen);
        } else {
            Self::hide_window(ctx, self.hints_layer.id);
        }
        if self.grid_layer.visible {
            self.show_window(ctx, self.grid_layer.id, TITLE_GRID, screen);
        } else {
            Self::hide_window(ctx, self.grid_layer.id);
        }
        if self.recursive_grid_layer.visible {
            let bounds = self
                .recursive_grid
                .as_ref()
                .map(|f| geometry::protocol_rect_to_egui(&f.bounds))
                .unwrap_or(screen);
            self.show_window(ctx, self.recursive_grid_layer.id, TITLE_RECURSIVE_GRID, bounds);
        } else {
            Self::hide_window(ctx, self.recursive_grid_layer.id);
        }
        if self.scroll_layer.visible {
            self.show_window(ctx, self.scroll_layer.id, TITLE_SCROLL, screen);
        } else {
            Self::hide_window(ctx, self.scroll_layer.id);
        }
        if self.mode_indicator_layer.visible {
            self.show_window(ctx, self.mode_indicator_layer.id, TITLE_MODE_INDICATOR, small);
        } else {
            Self::hide_window(ctx, self.mode_indicator_layer.id);
        }

        nswindow::set_sharing_for_all(&ALL_TITLES, self.hide_for_screen_share);
    }
}
