use std::collections::HashMap;

use eframe::egui::{self, Align, Context, Layout, RichText, Vec2};

use contract_flow::Editor;
use contract_flow::validation::SimulationOutcome;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(editor: Editor) -> Self {
        Self {
            editor,
            pan: Vec2::ZERO,
            zoom: 1.0,
            search: String::new(),
            focused_condition: HashMap::new(),
            operand_drafts: HashMap::new(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::left("hierarchy")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));

        self.draw_toasts(ctx);
    }

    fn draw_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Contract builder");
            ui.separator();

            let graph = self.editor.graph();
            ui.label(format!("wallets: {}", graph.len()));
            ui.label(format!("connections: {}", graph.edge_count()));
            ui.separator();

            if ui.button("Add wallet").clicked() {
                let id = self.editor.add_wallet();
                self.editor.select(Some(id));
            }

            let connect_label = if self.editor.canvas().is_connecting() {
                "Cancel connection"
            } else {
                "Connect wallets"
            };
            if ui.button(connect_label).clicked() {
                self.editor.toggle_connect();
            }

            if ui.button("Save").clicked() {
                self.editor.save_now();
            }

            ui.separator();
            if ui.button("Simulate").clicked() {
                self.editor.simulate();
            }

            let sign = ui
                .add_enabled(self.editor.can_sign(), egui::Button::new("Sign"))
                .on_disabled_hover_text("Run a successful simulation first");
            if sign.clicked() {
                self.editor.sign();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                match self.editor.last_simulation() {
                    Some(SimulationOutcome::Ready(summary)) => {
                        ui.label(
                            RichText::new(format!(
                                "routed {} / gas {}",
                                summary.routed_value, summary.estimated_gas
                            ))
                            .small(),
                        );
                    }
                    Some(SimulationOutcome::Blocked(invalid)) => {
                        ui.label(
                            RichText::new(format!("{} wallet(s) unvalidated", invalid.len()))
                                .small(),
                        );
                    }
                    None => {}
                }
                if self.editor.autosave_deadline().is_some() {
                    ui.label(RichText::new("unsaved changes").small().weak());
                }
            });
        });
    }
}
