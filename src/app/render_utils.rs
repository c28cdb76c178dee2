use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use contract_flow::notify::NoticeKind;
use contract_flow::wallet::WalletColor;

pub(super) const CANVAS_FILL: Color32 = Color32::from_rgb(19, 23, 29);
pub(super) const EDGE_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
pub(super) const LIVE_LINE_COLOR: Color32 = Color32::from_rgb(250, 204, 21);
pub(super) const SELECTED_OUTLINE: Color32 = Color32::from_rgb(244, 244, 245);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn wallet_color(color: WalletColor) -> Color32 {
    let [r, g, b] = color.rgb();
    Color32::from_rgb(r, g, b)
}

pub(super) fn notice_color(kind: NoticeKind) -> Color32 {
    match kind {
        NoticeKind::Success => Color32::from_rgb(34, 197, 94),
        NoticeKind::Error => Color32::from_rgb(239, 68, 68),
    }
}

/// Grid anchored at the world origin, which sits at the canvas top-left plus `pan`.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, CANVAS_FILL);

    let step = (40.0 * zoom.clamp(0.6, 1.8)).max(16.0);
    let origin = rect.left_top() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}
