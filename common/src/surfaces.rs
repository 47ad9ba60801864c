use bevy_ecs::prelude::*;
use bevy_math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::collision::helpers::{overlaps, rect_at};

// ============================================================================
// Surface
// ============================================================================

// Which kinds of bodies a surface stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionClass {
    #[default]
    Both,
    // Stops actors; free cargo passes through
    ActorOnly,
    // Stops cargo, and actors while they carry cargo
    CargoOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Actor,
    Cargo,
}

// Describes the body asking a collision question. `linked` means the actor carries
// cargo, or the cargo is held by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyFilter {
    pub kind: BodyKind,
    pub linked: bool,
}

impl BodyFilter {
    #[must_use]
    pub const fn actor(carrying: bool) -> Self {
        Self { kind: BodyKind::Actor, linked: carrying }
    }

    #[must_use]
    pub const fn cargo(held: bool) -> Self {
        Self { kind: BodyKind::Cargo, linked: held }
    }

    #[must_use]
    pub const fn is_blocked_by(self, class: CollisionClass) -> bool {
        match class {
            CollisionClass::Both => true,
            CollisionClass::ActorOnly => matches!(self.kind, BodyKind::Actor) || self.linked,
            CollisionClass::CargoOnly => matches!(self.kind, BodyKind::Cargo) || self.linked,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub bounds: Rect,
    pub portal_eligible: bool,
    pub collision: CollisionClass,
    pub active: bool,
}

impl Surface {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32, portal_eligible: bool, collision: CollisionClass) -> Self {
        Self {
            bounds: rect_at(Vec2::new(x, y), Vec2::new(width, height)),
            portal_eligible,
            collision,
            active: true,
        }
    }
}

// ============================================================================
// Surface Registry
// ============================================================================

// All surfaces of the loaded level, in declaration order. The order is part of the
// collision contract: whenever several surfaces qualify, the first one wins.
#[derive(Resource, Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<Surface>,
}

impl SurfaceRegistry {
    #[must_use]
    pub const fn new(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    // Active surfaces, any collision class, with their registry index
    pub fn active(&self) -> impl Iterator<Item = (usize, &Surface)> {
        self.surfaces.iter().enumerate().filter(|(_, surface)| surface.active)
    }

    // Active surfaces overlapping `rect` that block the described body
    pub fn query(&self, rect: Rect, filter: BodyFilter) -> impl Iterator<Item = (usize, &Surface)> {
        self.active()
            .filter(move |(_, surface)| filter.is_blocked_by(surface.collision) && overlaps(&rect, &surface.bounds))
    }

    #[must_use]
    pub fn first_blocking(&self, rect: Rect, filter: BodyFilter) -> Option<(usize, &Surface)> {
        self.query(rect, filter).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SurfaceRegistry {
        SurfaceRegistry::new(vec![
            Surface::new(0.0, 100.0, 200.0, 10.0, true, CollisionClass::Both),
            Surface::new(50.0, 0.0, 10.0, 200.0, false, CollisionClass::ActorOnly),
            Surface::new(80.0, 0.0, 10.0, 200.0, false, CollisionClass::CargoOnly),
        ])
    }

    #[test]
    fn test_query_respects_collision_class() {
        let registry = registry();
        let probe = rect_at(Vec2::new(40.0, 90.0), Vec2::new(60.0, 20.0));

        let actor: Vec<usize> = registry.query(probe, BodyFilter::actor(false)).map(|(i, _)| i).collect();
        assert_eq!(actor, vec![0, 1]);

        let carrying: Vec<usize> = registry.query(probe, BodyFilter::actor(true)).map(|(i, _)| i).collect();
        assert_eq!(carrying, vec![0, 1, 2]);

        let cargo: Vec<usize> = registry.query(probe, BodyFilter::cargo(false)).map(|(i, _)| i).collect();
        assert_eq!(cargo, vec![0, 2]);

        let held: Vec<usize> = registry.query(probe, BodyFilter::cargo(true)).map(|(i, _)| i).collect();
        assert_eq!(held, vec![0, 1, 2]);
    }

    #[test]
    fn test_inactive_surfaces_are_skipped() {
        let mut surfaces = vec![Surface::new(0.0, 0.0, 10.0, 10.0, true, CollisionClass::Both)];
        surfaces[0].active = false;
        let registry = SurfaceRegistry::new(surfaces);
        let probe = rect_at(Vec2::ZERO, Vec2::splat(5.0));
        assert!(registry.first_blocking(probe, BodyFilter::actor(false)).is_none());
    }

    #[test]
    fn test_first_blocking_uses_declaration_order() {
        let registry = SurfaceRegistry::new(vec![
            Surface::new(0.0, 0.0, 100.0, 100.0, false, CollisionClass::Both),
            Surface::new(0.0, 0.0, 50.0, 50.0, true, CollisionClass::Both),
        ]);
        let probe = rect_at(Vec2::new(10.0, 10.0), Vec2::splat(5.0));
        let (index, _) = registry.first_blocking(probe, BodyFilter::cargo(false)).expect("overlap");
        assert_eq!(index, 0);
    }
}
