//! Per-layer content drawing. Each function renders into whatever viewport
//! context its caller already opened; none of them know about windows.

use egui::{pos2, Align2, Area, Color32, Context, FontId, Order, Pos2, Rect, Stroke, Vec2};
use neru_protocol::{GridCell, Hint, Mode, RecursiveGridFrame};

const LABEL_FONT: f32 = 13.0;
const BADGE_PAD: f32 = 4.0;
const MATCHED_FG: Color32 = Color32::from_rgb(255, 214, 51);
const UNMATCHED_FG: Color32 = Color32::from_rgb(235, 235, 235);
const BADGE_BG: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 210);

/// Draws one label badge, splitting the matched/unmatched prefix into two
/// colors (§4 Hints router: "typed prefix" rendering).
fn label_badge(ctx: &Context, id_salt: &str, at: Pos2, label: &str, matched_prefix_len: usize) {
    let matched = &label[..matched_prefix_len.min(label.len())];
    let rest = &label[matched_prefix_len.min(label.len())..];
    Area::new(egui::Id::new(("overlay-badge", id_salt)))
        .fixed_pos(at)
        .order(Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(BADGE_BG)
                .corner_radius(egui::CornerRadius::same(3))
                .inner_margin(egui::Margin::same(BADGE_PAD as i8))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 0.0;
                        ui.style_mut().override_font_id = Some(FontId::monospace(LABEL_FONT));
                        if !matched.is_empty() {
                            ui.colored_label(MATCHED_FG, matched);
                        }
                        if !rest.is_empty() {
                            ui.colored_label(UNMATCHED_FG, rest);
                        }
                    });
                });
        });
}

/// Draws one hint badge per target, anchored at the element's top-left
/// corner converted into the hints window's local coordinate space.
pub fn render_hints(ctx: &Context, window_origin: Pos2, hints: &[Hint]) {
    for hint in hints {
        let abs = crate::geometry::protocol_rect_to_egui(&hint.element.bounds);
        let local = abs.min - window_origin.to_vec2();
        label_badge(ctx, &hint.label, local, &hint.label, hint.matched_prefix_len);
    }
}

/// Draws grid/subgrid cell outlines and their two-character labels.
pub fn render_grid(ctx: &Context, window_origin: Pos2, cells: &[GridCell]) {
    for cell in cells {
        let abs = crate::geometry::protocol_rect_to_egui(&cell.bounds);
        let local = Rect::from_min_size(abs.min - window_origin.to_vec2(), abs.size());
        Area::new(egui::Id::new(("grid-cell", &cell.label)))
            .fixed_pos(local.min)
            .order(Order::Background)
            .show(ctx, |ui| {
                ui.painter().rect_stroke(
                    Rect::from_min_size(Pos2::ZERO, local.size()),
                    0.0,
                    Stroke::new(1.0, Color32::from_rgba_premultiplied(255, 255, 255, 90)),
                    egui::StrokeKind::Outside,
                );
            });
        let center = local.center();
        label_badge(ctx, &format!("grid-{}", cell.label), center, &cell.label, 0);
    }
}

/// Draws the recursive-grid's current zoom frame: an outline plus the
/// subdivision lines the next keypress will choose between.
pub fn render_recursive_grid(ctx: &Context, window_origin: Pos2, frame: &RecursiveGridFrame) {
    let abs = crate::geometry::protocol_rect_to_egui(&frame.bounds);
    let local = Rect::from_min_size(abs.min - window_origin.to_vec2(), abs.size());
    Area::new(egui::Id::new("recursive-grid-frame"))
        .fixed_pos(local.min)
        .order(Order::Background)
        .show(ctx, |ui| {
            let size = local.size();
            let painter = ui.painter();
            let local_rect = Rect::from_min_size(Pos2::ZERO, size);
            painter.rect_stroke(
                local_rect,
                0.0,
                Stroke::new(2.0, Color32::from_rgb(255, 214, 51)),
                egui::StrokeKind::Outside,
            );
            let n = frame.subdivisions.max(1) as f32;
            for i in 1..frame.subdivisions {
                let x = size.x * (i as f32 / n);
                painter.line_segment(
                    [pos2(x, 0.0), pos2(x, size.y)],
                    Stroke::new(1.0, Color32::from_rgba_premultiplied(255, 255, 255, 110)),
                );
                let y = size.y * (i as f32 / n);
                painter.line_segment(
                    [pos2(0.0, y), pos2(size.x, y)],
                    Stroke::new(1.0, Color32::from_rgba_premultiplied(255, 255, 255, 110)),
                );
            }
        });
}

/// Draws a small "SCROLL" pill near the current cursor position.
pub fn render_scroll_indicator(ctx: &Context, window_origin: Pos2, at: Pos2) {
    let local = at - window_origin.to_vec2();
    Area::new(egui::Id::new("scroll-indicator"))
        .fixed_pos(local + Vec2::new(16.0, 16.0))
        .order(Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(BADGE_BG)
                .corner_radius(egui::CornerRadius::same(6))
                .inner_margin(egui::Margin::symmetric(8, 5))
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(FontId::monospace(LABEL_FONT));
                    ui.colored_label(UNMATCHED_FG, "SCROLL");
                });
        });
}

/// Draws a centered "mode active" badge near the top of the screen.
pub fn render_mode_indicator(ctx: &Context, window_size: Vec2, mode: Mode) {
    let label = match mode {
        Mode::Idle => return,
        Mode::Hints => "HINTS",
        Mode::Grid => "GRID",
        Mode::RecursiveGrid => "RECURSIVE GRID",
        Mode::Scroll => "SCROLL",
        Mode::Action => "ACTION",
    };
    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(Color32::TRANSPARENT))
        .show(ctx, |ui| {
            ui.painter().text(
                pos2(window_size.x / 2.0, window_size.y / 2.0),
                Align2::CENTER_CENTER,
                label,
                FontId::monospace(16.0),
                UNMATCHED_FG,
            );
        });
}
