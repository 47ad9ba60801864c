use bevy_math::Vec2;

use super::helpers::{closest_point, overlaps, rect_at, segment_entry};
use crate::surfaces::SurfaceRegistry;

// Surface contact of a projectile during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    pub surface: usize,
    pub point: Vec2,
}

// First active surface (registry order, any collision class) touched by the projectile
// moving from `prev` to `next`. Either the box at `next` overlaps the surface or the
// centre segment crossed it; the second catches thin surfaces a fast shot would skip.
#[must_use]
pub fn sweep_projectile_vs_surfaces(prev: Vec2, next: Vec2, size: f32, surfaces: &SurfaceRegistry) -> Option<SurfaceContact> {
    let half = Vec2::splat(size / 2.0);
    let hitbox = rect_at(next - half, Vec2::splat(size));

    surfaces.active().find_map(|(index, surface)| {
        let entry = segment_entry(prev, next, &surface.bounds);
        if entry.is_none() && !overlaps(&hitbox, &surface.bounds) {
            return None;
        }

        // Contact always lies on or inside the surface
        let point = entry.unwrap_or_else(|| closest_point(&surface.bounds, next));
        Some(SurfaceContact { surface: index, point })
    })
}
