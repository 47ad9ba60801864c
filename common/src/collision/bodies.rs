use bevy_math::{Rect, Vec2};

use super::helpers::{overlaps, rect_at};
use crate::{
    constants::PHYSICS_EPSILON,
    surfaces::{BodyFilter, SurfaceRegistry},
};

// ============================================================================
// Axis-Separated Movement
// ============================================================================

// First surface (registry order) that blocks `candidate` and that the body was not
// already inside of. Surfaces a body starts embedded in never hold it in place, so a
// body dropped into geometry can always move out.
fn first_new_blocker(surfaces: &SurfaceRegistry, current: &Rect, candidate: Rect, filter: BodyFilter) -> Option<(usize, Rect)> {
    surfaces
        .query(candidate, filter)
        .find(|(_, surface)| !overlaps(current, &surface.bounds))
        .map(|(index, surface)| (index, surface.bounds))
}

// Move along x by `dx`. On contact the body is snapped flush against the blocking
// edge and the blocking surface index is returned.
pub fn move_horizontal(pos: &mut Vec2, size: Vec2, dx: f32, surfaces: &SurfaceRegistry, filter: BodyFilter) -> Option<usize> {
    if dx.abs() < PHYSICS_EPSILON {
        return None;
    }

    let current = rect_at(*pos, size);
    let candidate = rect_at(Vec2::new(pos.x + dx, pos.y), size);

    if let Some((index, bounds)) = first_new_blocker(surfaces, &current, candidate, filter) {
        pos.x = if dx > 0.0 { bounds.min.x - size.x } else { bounds.max.x };
        Some(index)
    } else {
        pos.x += dx;
        None
    }
}

// Move along y by `dy` (positive is down). Same contact rules as `move_horizontal`.
pub fn move_vertical(pos: &mut Vec2, size: Vec2, dy: f32, surfaces: &SurfaceRegistry, filter: BodyFilter) -> Option<usize> {
    if dy.abs() < PHYSICS_EPSILON {
        return None;
    }

    let current = rect_at(*pos, size);
    let candidate = rect_at(Vec2::new(pos.x, pos.y + dy), size);

    if let Some((index, bounds)) = first_new_blocker(surfaces, &current, candidate, filter) {
        pos.y = if dy > 0.0 { bounds.min.y - size.y } else { bounds.max.y };
        Some(index)
    } else {
        pos.y += dy;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::{CollisionClass, Surface};

    #[test]
    fn test_horizontal_snaps_to_near_edge() {
        let surfaces = SurfaceRegistry::new(vec![Surface::new(100.0, 0.0, 20.0, 200.0, false, CollisionClass::Both)]);
        let mut pos = Vec2::new(55.0, 50.0);
        let hit = move_horizontal(&mut pos, Vec2::splat(41.0), 8.0, &surfaces, BodyFilter::actor(false));
        assert_eq!(hit, Some(0));
        assert!((pos.x - 59.0).abs() < 1e-4);

        let mut pos = Vec2::new(125.0, 50.0);
        let hit = move_horizontal(&mut pos, Vec2::splat(41.0), -8.0, &surfaces, BodyFilter::actor(false));
        assert_eq!(hit, Some(0));
        assert!((pos.x - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_embedded_body_can_escape() {
        let surfaces = SurfaceRegistry::new(vec![Surface::new(100.0, 0.0, 20.0, 200.0, false, CollisionClass::Both)]);
        let mut pos = Vec2::new(90.0, 50.0);
        let hit = move_horizontal(&mut pos, Vec2::splat(41.0), -3.0, &surfaces, BodyFilter::actor(false));
        assert_eq!(hit, None);
        assert!((pos.x - 87.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_lands_on_top_edge() {
        let surfaces = SurfaceRegistry::new(vec![Surface::new(0.0, 600.0, 300.0, 13.0, true, CollisionClass::Both)]);
        let mut pos = Vec2::new(100.0, 555.0);
        let hit = move_vertical(&mut pos, Vec2::splat(41.0), 10.0, &surfaces, BodyFilter::actor(false));
        assert_eq!(hit, Some(0));
        assert!((pos.y - 559.0).abs() < 1e-4);
    }
}
