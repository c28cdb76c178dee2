use std::f32::consts::FRAC_PI_4;

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

/// Side of a wallet card that an edge leaves from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitSide {
    Right,
    Left,
    Down,
    Up,
}

/// Quantizes the direction from `from` to `toward` into four 90° sectors
/// centred on the axes. Screen space, so positive y points down.
pub fn exit_side(from: Pos2, toward: Pos2) -> ExitSide {
    let delta = toward - from;
    let angle = delta.y.atan2(delta.x);
    let abs_angle = angle.abs();

    if abs_angle < FRAC_PI_4 {
        ExitSide::Right
    } else if abs_angle > 3.0 * FRAC_PI_4 {
        ExitSide::Left
    } else if angle > 0.0 {
        ExitSide::Down
    } else {
        ExitSide::Up
    }
}

pub fn node_rect(origin: Pos2, size: f32) -> Rect {
    Rect::from_min_size(origin, vec2(size, size))
}

/// Midpoint of the card side facing `toward`.
pub fn exit_point(origin: Pos2, size: f32, toward: Pos2) -> (ExitSide, Pos2) {
    let rect = node_rect(origin, size);
    let center = rect.center();
    let side = exit_side(center, toward);
    let point = match side {
        ExitSide::Right => pos2(rect.right(), center.y),
        ExitSide::Left => pos2(rect.left(), center.y),
        ExitSide::Down => pos2(center.x, rect.bottom()),
        ExitSide::Up => pos2(center.x, rect.top()),
    };
    (side, point)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
    pub start: Pos2,
    pub end: Pos2,
    pub start_side: ExitSide,
    pub end_side: ExitSide,
}

impl EdgeSegment {
    pub fn midpoint(&self) -> Pos2 {
        self.start + (self.end - self.start) * 0.5
    }

    pub fn direction(&self) -> Vec2 {
        (self.end - self.start).normalized()
    }
}

/// Edge from the parent card toward the child card. The parent side faces
/// the child's centre; the child side faces the parent's exit point.
pub fn edge_segment(parent_origin: Pos2, child_origin: Pos2, size: f32) -> EdgeSegment {
    let child_center = node_rect(child_origin, size).center();
    let (start_side, start) = exit_point(parent_origin, size, child_center);
    let (end_side, end) = exit_point(child_origin, size, start);
    EdgeSegment {
        start,
        end,
        start_side,
        end_side,
    }
}

/// Two points forming an arrowhead at `tip`, pointing along `direction`.
pub fn arrow_head(tip: Pos2, direction: Vec2, length: f32) -> [Pos2; 2] {
    let back = -direction * length;
    let normal = vec2(-direction.y, direction.x) * (length * 0.45);
    [tip + back + normal, tip + back - normal]
}

/// Index of the topmost card containing `point`. Later cards are drawn on top.
pub fn hit_test(origins: &[Pos2], size: f32, point: Pos2) -> Option<usize> {
    origins
        .iter()
        .rposition(|origin| node_rect(*origin, size).contains(point))
}

pub fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Pos2) -> Pos2 {
    rect.left_top() + pan + world.to_vec2() * zoom
}

pub fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Pos2 {
    ((screen - rect.left_top() - pan) / zoom).to_pos2()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Pos2 = Pos2::ZERO;

    #[test]
    fn sectors_follow_the_axes() {
        assert_eq!(exit_side(ORIGIN, pos2(10.0, 0.0)), ExitSide::Right);
        assert_eq!(exit_side(ORIGIN, pos2(-10.0, 0.0)), ExitSide::Left);
        assert_eq!(exit_side(ORIGIN, pos2(0.0, 10.0)), ExitSide::Down);
        assert_eq!(exit_side(ORIGIN, pos2(0.0, -10.0)), ExitSide::Up);
    }

    #[test]
    fn near_diagonals_pick_the_closer_axis() {
        assert_eq!(exit_side(ORIGIN, pos2(10.0, 9.0)), ExitSide::Right);
        assert_eq!(exit_side(ORIGIN, pos2(10.0, -9.0)), ExitSide::Right);
        assert_eq!(exit_side(ORIGIN, pos2(-10.0, 9.0)), ExitSide::Left);
        assert_eq!(exit_side(ORIGIN, pos2(9.0, 10.0)), ExitSide::Down);
        assert_eq!(exit_side(ORIGIN, pos2(-9.0, -10.0)), ExitSide::Up);
    }

    #[test]
    fn exact_right_diagonals_fall_to_the_vertical_side() {
        assert_eq!(exit_side(ORIGIN, pos2(10.0, 10.0)), ExitSide::Down);
        assert_eq!(exit_side(ORIGIN, pos2(10.0, -10.0)), ExitSide::Up);
    }

    #[test]
    fn hit_test_prefers_the_topmost_card() {
        let origins = [pos2(0.0, 0.0), pos2(50.0, 50.0)];
        assert_eq!(hit_test(&origins, 96.0, pos2(10.0, 10.0)), Some(0));
        assert_eq!(hit_test(&origins, 96.0, pos2(60.0, 60.0)), Some(1));
        assert_eq!(hit_test(&origins, 96.0, pos2(300.0, 300.0)), None);
    }

    #[test]
    fn exit_point_sits_on_the_card_border() {
        let origin = pos2(100.0, 100.0);
        assert_eq!(
            exit_point(origin, 96.0, pos2(400.0, 148.0)),
            (ExitSide::Right, pos2(196.0, 148.0))
        );
        assert_eq!(
            exit_point(origin, 96.0, pos2(148.0, 0.0)),
            (ExitSide::Up, pos2(148.0, 100.0))
        );
        assert_eq!(
            exit_point(origin, 96.0, pos2(148.0, 900.0)),
            (ExitSide::Down, pos2(148.0, 196.0))
        );
        assert_eq!(
            exit_point(origin, 96.0, pos2(-50.0, 150.0)),
            (ExitSide::Left, pos2(100.0, 148.0))
        );
    }

    #[test]
    fn edge_between_stacked_cards_runs_vertically() {
        let edge = edge_segment(pos2(0.0, 0.0), pos2(0.0, 300.0), 96.0);
        assert_eq!(edge.start_side, ExitSide::Down);
        assert_eq!(edge.end_side, ExitSide::Up);
        assert_eq!(edge.start, pos2(48.0, 96.0));
        assert_eq!(edge.end, pos2(48.0, 300.0));
        assert_eq!(edge.midpoint(), pos2(48.0, 198.0));
    }

    #[test]
    fn screen_round_trip() {
        let rect = Rect::from_min_size(pos2(20.0, 40.0), vec2(800.0, 600.0));
        let pan = vec2(15.0, -5.0);
        let world = pos2(120.0, 64.0);
        let screen = world_to_screen(rect, pan, 1.5, world);
        let back = screen_to_world(rect, pan, 1.5, screen);
        assert!((back - world).length() < 1e-3);
    }
}
