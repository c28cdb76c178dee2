use eframe::egui::{self, Key, Pos2, Rect, Ui};

use contract_flow::canvas::geometry::{hit_test, screen_to_world};

use super::super::ViewModel;
use super::build::CardLayout;

impl ViewModel {
    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.contains_pointer() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.25, 3.0);
        self.pan = pointer - rect.left_top() - (world_before.to_vec2() * self.zoom);
    }

    pub(in crate::app) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary)
                && self.editor.canvas().drag_enabled())
        {
            self.pan += response.drag_delta();
        }
    }

    /// Feeds the pointer to the connection controller and handles Escape.
    pub(in crate::app) fn handle_connect_pointer(&mut self, ui: &Ui, rect: Rect) {
        if !self.editor.canvas().is_connecting() {
            return;
        }

        if ui.input(|input| input.key_pressed(Key::Escape)) {
            self.editor.cancel_connect();
            return;
        }

        if let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
            && rect.contains(pointer)
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.editor.pointer_moved(world);
            ui.ctx().request_repaint();
        }
    }

    /// Topmost card under the pointer. Cards later in the list are drawn on top.
    pub(in crate::app) fn hovered_card<'a>(
        &self,
        pointer: Option<Pos2>,
        cards: &'a [CardLayout],
    ) -> Option<&'a CardLayout> {
        let pointer = pointer?;
        let origins = cards
            .iter()
            .map(|card| card.rect.left_top())
            .collect::<Vec<_>>();
        let size = self.editor.canvas().node_size() * self.zoom;
        hit_test(&origins, size, pointer).and_then(|index| cards.get(index))
    }
}
