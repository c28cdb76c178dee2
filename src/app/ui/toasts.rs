use std::time::Instant;

use eframe::egui::{self, Align2, Context, RichText, vec2};

use super::super::ViewModel;
use super::super::render_utils::notice_color;

impl ViewModel {
    pub(in crate::app) fn draw_toasts(&mut self, ctx: &Context) {
        let notices = self.editor.notices_mut();
        notices.expire(Instant::now());
        if notices.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (index, notice) in notices.iter().enumerate() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(&notice.message)
                                    .strong()
                                    .color(notice_color(notice.kind)),
                            );
                            if ui.small_button("✕").clicked() {
                                dismissed = Some(index);
                            }
                        });
                        if let Some(description) = &notice.description {
                            ui.small(description.as_str());
                        }
                    });
                    ui.add_space(4.0);
                }
            });

        if let Some(index) = dismissed {
            notices.dismiss(index);
        }

        // Keep repainting so expired notices disappear without input.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
