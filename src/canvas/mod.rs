mod controller;
pub mod geometry;

pub use controller::{CanvasController, ClickOutcome, ConnectState, LiveLine};
pub use geometry::{EdgeSegment, ExitSide, edge_segment, exit_point, exit_side, hit_test};
