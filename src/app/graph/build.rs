use eframe::egui::{Pos2, Rect, pos2, vec2};

use contract_flow::canvas::geometry::{edge_segment, world_to_screen};
use contract_flow::canvas::{EdgeSegment, LiveLine};

use super::super::ViewModel;

/// Screen-space placement of one wallet card for the current frame.
pub(in crate::app) struct CardLayout {
    pub(in crate::app) id: String,
    pub(in crate::app) rect: Rect,
}

pub(in crate::app) struct EdgeLayout {
    pub(in crate::app) parent_id: String,
    pub(in crate::app) child_id: String,
    pub(in crate::app) segment: EdgeSegment,
}

pub(in crate::app) struct CanvasLayout {
    pub(in crate::app) cards: Vec<CardLayout>,
    pub(in crate::app) edges: Vec<EdgeLayout>,
    pub(in crate::app) live_line: Option<(Pos2, Pos2)>,
}

impl ViewModel {
    fn to_screen(&self, rect: Rect, world: Pos2) -> Pos2 {
        world_to_screen(rect, self.pan, self.zoom, world)
    }

    /// Edges are computed in world space so their exit sides do not depend
    /// on zoom, then mapped to the screen.
    pub(in crate::app) fn build_canvas_layout(&self, rect: Rect) -> CanvasLayout {
        let graph = self.editor.graph();
        let size = self.editor.canvas().node_size();
        let screen_size = size * self.zoom;

        let cards = graph
            .nodes()
            .iter()
            .map(|node| {
                let origin = self.to_screen(rect, pos2(node.x, node.y));
                CardLayout {
                    id: node.id.clone(),
                    rect: Rect::from_min_size(origin, vec2(screen_size, screen_size)),
                }
            })
            .collect();

        let edges = graph
            .edges()
            .into_iter()
            .filter_map(|(parent_id, child_id)| {
                let parent = graph.get(&parent_id)?;
                let child = graph.get(&child_id)?;
                let world = edge_segment(pos2(parent.x, parent.y), pos2(child.x, child.y), size);
                let segment = EdgeSegment {
                    start: self.to_screen(rect, world.start),
                    end: self.to_screen(rect, world.end),
                    ..world
                };
                Some(EdgeLayout {
                    parent_id,
                    child_id,
                    segment,
                })
            })
            .collect();

        let live_line = self
            .editor
            .canvas()
            .live_line()
            .map(|LiveLine { start, end, .. }| (self.to_screen(rect, start), self.to_screen(rect, end)));

        CanvasLayout {
            cards,
            edges,
            live_line,
        }
    }
}
