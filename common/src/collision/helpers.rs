use bevy_math::{Rect, Vec2};

use crate::constants::{COLLISION_EPSILON, PHYSICS_EPSILON};

// ============================================================================
// Rectangle Helpers
// ============================================================================

// Box with its top-left corner at `pos`
#[must_use]
pub fn rect_at(pos: Vec2, size: Vec2) -> Rect {
    Rect::from_corners(pos, pos + size)
}

// Strict overlap test: rectangles that merely share an edge do not overlap.
#[must_use]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.min.x < b.max.x - COLLISION_EPSILON
        && a.max.x > b.min.x + COLLISION_EPSILON
        && a.min.y < b.max.y - COLLISION_EPSILON
        && a.max.y > b.min.y + COLLISION_EPSILON
}

// True when `point` lies inside `rect` or on its boundary, within `tolerance`.
#[must_use]
pub fn touches_point(rect: &Rect, point: Vec2, tolerance: f32) -> bool {
    point.x >= rect.min.x - tolerance
        && point.x <= rect.max.x + tolerance
        && point.y >= rect.min.y - tolerance
        && point.y <= rect.max.y + tolerance
}

#[must_use]
pub fn closest_point(rect: &Rect, point: Vec2) -> Vec2 {
    point.clamp(rect.min, rect.max)
}

// ============================================================================
// Sweeps
// ============================================================================

// Slab test of the segment start->end against `rect`. Returns the first point of the
// segment inside the rectangle (the start itself when it already is inside).
#[must_use]
pub fn segment_entry(start: Vec2, end: Vec2, rect: &Rect) -> Option<Vec2> {
    let delta = end - start;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..2 {
        let origin = start[axis];
        let dir = delta[axis];
        let (min, max) = (rect.min[axis], rect.max[axis]);

        if dir.abs() < PHYSICS_EPSILON {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let t1 = (min - origin) / dir;
        let t2 = (max - origin) / dir;
        let (t_near, t_far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        t_enter = t_enter.max(t_near);
        t_exit = t_exit.min(t_far);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(start + delta * t_enter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = rect_at(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = rect_at(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        let c = rect_at(Vec2::new(9.0, 9.0), Vec2::new(10.0, 10.0));
        assert!(!overlaps(&a, &b));
        assert!(overlaps(&a, &c));
        assert!(overlaps(&c, &a));
    }

    #[test]
    fn test_segment_entry_hits_near_face() {
        let wall = rect_at(Vec2::new(100.0, 0.0), Vec2::new(20.0, 200.0));
        let hit = segment_entry(Vec2::new(80.0, 50.0), Vec2::new(110.0, 50.0), &wall).expect("segment crosses wall");
        assert!((hit - Vec2::new(100.0, 50.0)).length() < 1e-3);

        let miss = segment_entry(Vec2::new(80.0, 250.0), Vec2::new(110.0, 250.0), &wall);
        assert_eq!(miss, None);

        let short = segment_entry(Vec2::new(60.0, 50.0), Vec2::new(90.0, 50.0), &wall);
        assert_eq!(short, None);
    }

    #[test]
    fn test_segment_starting_inside_returns_start() {
        let wall = rect_at(Vec2::new(100.0, 0.0), Vec2::new(20.0, 200.0));
        let start = Vec2::new(105.0, 50.0);
        assert_eq!(segment_entry(start, Vec2::new(130.0, 50.0), &wall), Some(start));
    }
}
