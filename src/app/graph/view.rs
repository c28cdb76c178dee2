use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Sense, Shape, Stroke, StrokeKind, Ui, vec2,
};

use contract_flow::canvas::geometry::arrow_head;
use contract_flow::util::short_address;

use super::super::ViewModel;
use super::super::render_utils::{
    EDGE_COLOR, LIVE_LINE_COLOR, SELECTED_OUTLINE, blend_color, dim_color, draw_background,
    wallet_color,
};

enum CanvasAction {
    Select(Option<String>),
    Click(String),
    Drag { id: String, x: f32, y: f32 },
    RemoveEdge { parent_id: String, child_id: String },
}

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);
        self.handle_connect_pointer(ui, rect);

        let layout = self.build_canvas_layout(rect);
        let zoom = self.zoom;
        let pointer = ui.input(|input| input.pointer.hover_pos());
        let connecting = self.editor.canvas().is_connecting();
        let source = self.editor.canvas().source().map(str::to_owned);
        let selected = self.editor.selected().map(|node| node.id.clone());
        let mut actions = Vec::new();

        if response.clicked_by(egui::PointerButton::Primary) && !connecting {
            actions.push(CanvasAction::Select(None));
        }

        let edge_stroke = Stroke::new((1.6 * zoom).clamp(1.0, 3.0), EDGE_COLOR);
        let arrow_len = (10.0 * zoom).clamp(6.0, 16.0);
        for edge in &layout.edges {
            let segment = edge.segment;
            painter.line_segment([segment.start, segment.end], edge_stroke);
            let [left, right] = arrow_head(segment.end, segment.direction(), arrow_len);
            painter.add(Shape::convex_polygon(
                vec![segment.end, left, right],
                EDGE_COLOR,
                Stroke::NONE,
            ));

            let handle_radius = (8.0 * zoom).clamp(6.0, 12.0);
            let mid = segment.midpoint();
            let handle_rect = egui::Rect::from_center_size(mid, vec2(handle_radius, handle_radius) * 2.0);
            let handle = ui
                .interact(
                    handle_rect,
                    ui.id().with(("edge", edge.parent_id.as_str(), edge.child_id.as_str())),
                    Sense::click(),
                )
                .on_hover_text("Remove connection");
            let handle_fill = if handle.hovered() {
                Color32::from_rgb(239, 68, 68)
            } else {
                dim_color(EDGE_COLOR, 0.55)
            };
            painter.circle_filled(mid, handle_radius, handle_fill);
            painter.text(
                mid,
                Align2::CENTER_CENTER,
                "×",
                FontId::proportional(handle_radius * 1.4),
                Color32::WHITE,
            );
            if handle.clicked() {
                actions.push(CanvasAction::RemoveEdge {
                    parent_id: edge.parent_id.clone(),
                    child_id: edge.child_id.clone(),
                });
            }
        }

        if let Some((start, end)) = layout.live_line {
            let stroke = Stroke::new(2.0, LIVE_LINE_COLOR);
            painter.extend(Shape::dashed_line(&[start, end], stroke, 8.0, 5.0));
            painter.circle_filled(end, 4.0, LIVE_LINE_COLOR);
        }

        let hovered_id = self
            .hovered_card(pointer, &layout.cards)
            .map(|card| card.id.clone());

        for card in &layout.cards {
            let Some(node) = self.editor.graph().get(&card.id) else {
                continue;
            };

            let card_response = ui.interact(
                card.rect,
                ui.id().with(("wallet", card.id.as_str())),
                Sense::click_and_drag(),
            );

            let base = wallet_color(node.color);
            let is_hovered = hovered_id.as_deref() == Some(card.id.as_str());
            let fill_amount = if is_hovered { 0.5 } else { 0.32 };
            let fill = blend_color(Color32::from_rgb(30, 34, 42), base, fill_amount);
            let outline = if source.as_deref() == Some(card.id.as_str()) {
                Stroke::new(3.0, LIVE_LINE_COLOR)
            } else if selected.as_deref() == Some(card.id.as_str()) {
                Stroke::new(2.5, SELECTED_OUTLINE)
            } else {
                Stroke::new(1.5, base)
            };
            let corner = CornerRadius::same((10.0 * zoom).clamp(4.0, 16.0) as u8);
            painter.rect(card.rect, corner, fill, outline, StrokeKind::Inside);

            let text_color = Color32::from_rgb(235, 238, 242);
            let small = FontId::proportional((10.5 * zoom).clamp(7.0, 15.0));
            let large = FontId::proportional((13.0 * zoom).clamp(8.0, 18.0));
            let pad = 8.0 * zoom;
            let top = card.rect.left_top() + vec2(pad, pad);

            painter.text(top, Align2::LEFT_TOP, &node.name, large, text_color);
            painter.text(
                top + vec2(0.0, 18.0 * zoom),
                Align2::LEFT_TOP,
                short_address(&node.address),
                small.clone(),
                dim_color(text_color, 0.75),
            );
            painter.text(
                top + vec2(0.0, 34.0 * zoom),
                Align2::LEFT_TOP,
                format!(
                    "{} cond / {} exits",
                    node.condition.count(),
                    node.condition.exit_count()
                ),
                small.clone(),
                dim_color(text_color, 0.75),
            );
            let (badge, badge_color) = if node.valid {
                ("valid", Color32::from_rgb(34, 197, 94))
            } else {
                ("unchecked", Color32::from_rgb(250, 204, 21))
            };
            painter.text(
                card.rect.left_bottom() + vec2(pad, -pad),
                Align2::LEFT_BOTTOM,
                badge,
                small,
                badge_color,
            );

            if card_response.clicked() {
                if connecting {
                    actions.push(CanvasAction::Click(card.id.clone()));
                } else {
                    actions.push(CanvasAction::Select(Some(card.id.clone())));
                }
            }

            if card_response.dragged_by(egui::PointerButton::Primary) && !connecting {
                let delta = card_response.drag_delta() / zoom;
                actions.push(CanvasAction::Drag {
                    id: card.id.clone(),
                    x: node.x + delta.x,
                    y: node.y + delta.y,
                });
            }

            if connecting && card_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
            }
        }

        if connecting {
            let hint = match &source {
                Some(_) => "Click the wallet that receives funds (Esc to cancel)",
                None => "Click the wallet that sends funds (Esc to cancel)",
            };
            painter.text(
                rect.left_top() + vec2(12.0, 12.0),
                Align2::LEFT_TOP,
                hint,
                FontId::proportional(13.0),
                LIVE_LINE_COLOR,
            );
        }

        for action in actions {
            match action {
                CanvasAction::Select(id) => self.editor.select(id),
                CanvasAction::Click(id) => {
                    self.editor.click_node(&id);
                }
                CanvasAction::Drag { id, x, y } => {
                    self.editor.drag_node(&id, x, y);
                }
                CanvasAction::RemoveEdge {
                    parent_id,
                    child_id,
                } => {
                    self.editor.remove_edge(&parent_id, &child_id);
                }
            }
        }
    }
}
