use eframe::egui::{Pos2, pos2};
use tracing::debug;

use crate::wallet::{EdgeRejection, WalletGraph};

use super::geometry::{ExitSide, exit_point};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectState {
    #[default]
    Idle,
    /// Connection mode; `source` is unset until the first wallet is clicked.
    Connecting { source: Option<String> },
}

/// Transient feedback line from the source card toward the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveLine {
    pub start: Pos2,
    pub end: Pos2,
    pub side: ExitSide,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    SourceSelected(String),
    Connected {
        parent: String,
        child: String,
    },
    Rejected {
        parent: String,
        child: String,
        reason: EdgeRejection,
    },
}

/// Pointer-driven placement and edge drawing for the canvas.
///
/// Dragging is only allowed while idle. The live line exists only while a
/// source is selected and is dropped on every transition out of that state.
#[derive(Debug)]
pub struct CanvasController {
    state: ConnectState,
    live_line: Option<LiveLine>,
    node_size: f32,
}

impl CanvasController {
    pub fn new(node_size: f32) -> Self {
        Self {
            state: ConnectState::Idle,
            live_line: None,
            node_size,
        }
    }

    pub fn state(&self) -> &ConnectState {
        &self.state
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.state, ConnectState::Connecting { .. })
    }

    pub fn source(&self) -> Option<&str> {
        match &self.state {
            ConnectState::Connecting { source } => source.as_deref(),
            ConnectState::Idle => None,
        }
    }

    pub fn live_line(&self) -> Option<LiveLine> {
        self.live_line
    }

    pub fn drag_enabled(&self) -> bool {
        self.state == ConnectState::Idle
    }

    fn transition(&mut self, next: ConnectState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "canvas state change");
        }
        self.state = next;
        self.live_line = None;
    }

    pub fn toggle_connect(&mut self) {
        if self.is_connecting() {
            self.cancel();
        } else {
            self.transition(ConnectState::Connecting { source: None });
        }
    }

    pub fn cancel(&mut self) {
        self.transition(ConnectState::Idle);
    }

    /// Handles a click on wallet `id`. Idle clicks are left to selection.
    pub fn click_node(&mut self, graph: &mut WalletGraph, id: &str) -> ClickOutcome {
        let source = match &self.state {
            ConnectState::Idle => return ClickOutcome::Ignored,
            ConnectState::Connecting { source } => source.clone(),
        };

        let Some(source) = source else {
            if !graph.contains(id) {
                return ClickOutcome::Ignored;
            }
            self.transition(ConnectState::Connecting {
                source: Some(id.to_owned()),
            });
            return ClickOutcome::SourceSelected(id.to_owned());
        };

        if source == id {
            return ClickOutcome::Ignored;
        }

        let outcome = match graph.add_edge(&source, id) {
            Ok(()) => ClickOutcome::Connected {
                parent: source,
                child: id.to_owned(),
            },
            Err(reason) => ClickOutcome::Rejected {
                parent: source,
                child: id.to_owned(),
                reason,
            },
        };
        self.transition(ConnectState::Idle);
        outcome
    }

    /// Moves a wallet card to world position `(x, y)` when dragging is allowed.
    pub fn drag_node(&mut self, graph: &mut WalletGraph, id: &str, x: f32, y: f32) -> bool {
        self.drag_enabled() && graph.move_wallet(id, x, y)
    }

    /// Recomputes the live line for a pointer at world position `pointer`.
    pub fn pointer_moved(&mut self, graph: &WalletGraph, pointer: Pos2) {
        self.live_line = self
            .source()
            .and_then(|source| graph.get(source))
            .map(|node| {
                let (side, start) = exit_point(pos2(node.x, node.y), self.node_size, pointer);
                LiveLine {
                    start,
                    end: pointer,
                    side,
                }
            });
    }

    /// Forgets a wallet that was deleted while it was the connection source.
    pub fn forget(&mut self, id: &str) {
        if self.source() == Some(id) {
            self.transition(ConnectState::Connecting { source: None });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn setup() -> (CanvasController, WalletGraph, String, String) {
        let ids = SequentialIds::new("n");
        let mut graph = WalletGraph::with_default_root(&ids);
        let root = graph.nodes()[0].id.clone();
        let second = graph.add_wallet(&ids);
        (CanvasController::new(96.0), graph, root, second)
    }

    #[test]
    fn idle_clicks_do_nothing() {
        let (mut canvas, mut graph, root, _) = setup();
        assert_eq!(canvas.click_node(&mut graph, &root), ClickOutcome::Ignored);
        assert_eq!(canvas.state(), &ConnectState::Idle);
    }

    #[test]
    fn two_clicks_connect_and_return_to_idle() {
        let (mut canvas, mut graph, root, second) = setup();
        canvas.toggle_connect();
        assert_eq!(canvas.state(), &ConnectState::Connecting { source: None });

        assert_eq!(
            canvas.click_node(&mut graph, &root),
            ClickOutcome::SourceSelected(root.clone())
        );
        assert_eq!(canvas.click_node(&mut graph, &root), ClickOutcome::Ignored);
        assert_eq!(canvas.source(), Some(root.as_str()));

        assert_eq!(
            canvas.click_node(&mut graph, &second),
            ClickOutcome::Connected {
                parent: root.clone(),
                child: second.clone(),
            }
        );
        assert_eq!(canvas.state(), &ConnectState::Idle);
        assert_eq!(graph.get(&root).unwrap().children, vec![second]);
    }

    #[test]
    fn rejected_edge_still_returns_to_idle() {
        let (mut canvas, mut graph, root, second) = setup();
        graph.add_edge(&root, &second).unwrap();

        canvas.toggle_connect();
        canvas.click_node(&mut graph, &second);
        let outcome = canvas.click_node(&mut graph, &root);
        assert_eq!(
            outcome,
            ClickOutcome::Rejected {
                parent: second,
                child: root.clone(),
                reason: EdgeRejection::WouldCycle,
            }
        );
        assert_eq!(canvas.state(), &ConnectState::Idle);
        assert!(graph.get(&root).unwrap().parent_id.is_none());
    }

    #[test]
    fn dragging_is_disabled_while_connecting() {
        let (mut canvas, mut graph, root, _) = setup();
        canvas.toggle_connect();
        assert!(!canvas.drag_node(&mut graph, &root, 10.0, 10.0));
        assert_eq!(graph.get(&root).unwrap().position(), (400.0, 100.0));

        canvas.cancel();
        assert!(canvas.drag_node(&mut graph, &root, 10.0, 20.0));
        assert_eq!(graph.get(&root).unwrap().position(), (10.0, 20.0));
    }

    #[test]
    fn live_line_tracks_pointer_and_clears_on_exit() {
        let (mut canvas, mut graph, root, _) = setup();
        canvas.toggle_connect();
        canvas.pointer_moved(&graph, pos2(900.0, 148.0));
        assert!(canvas.live_line().is_none(), "no source selected yet");

        canvas.click_node(&mut graph, &root);
        canvas.pointer_moved(&graph, pos2(900.0, 148.0));
        let line = canvas.live_line().unwrap();
        assert_eq!(line.side, ExitSide::Right);
        assert_eq!(line.start, pos2(496.0, 148.0));
        assert_eq!(line.end, pos2(900.0, 148.0));

        canvas.toggle_connect();
        assert_eq!(canvas.state(), &ConnectState::Idle);
        assert!(canvas.live_line().is_none());
    }

    #[test]
    fn deleted_source_is_forgotten() {
        let (mut canvas, mut graph, root, _) = setup();
        canvas.toggle_connect();
        canvas.click_node(&mut graph, &root);
        canvas.forget(&root);
        assert_eq!(canvas.state(), &ConnectState::Connecting { source: None });
    }
}
