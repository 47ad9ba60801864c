use bevy_math::{Rect, Vec2};

use crate::{
    collision::{helpers::rect_at, projectiles::sweep_projectile_vs_surfaces},
    constants::*,
    protocol::{ActorId, Aim, BoxView},
    surfaces::SurfaceRegistry,
};

// ============================================================================
// Projectile
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub center: Vec2,
    pub vel: Vec2,
    // Start of the next swept segment; the shooter's centre until the first step
    pub sweep_from: Vec2,
    pub owner: ActorId,
    pub age: u32,
    pub lifetime: u32,
}

// What happened to a projectile during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileOutcome {
    Flying,
    // Reached a portal-eligible surface; `contact` lies on that surface
    Hit { surface: usize, contact: Vec2 },
    // Reached a surface that cannot host a portal
    Blocked { surface: usize },
    Expired,
}

impl Projectile {
    // Spawn a shot from the shooter's centre, one barrel length along the aim.
    #[must_use]
    pub fn fire(owner: ActorId, shooter_center: Vec2, aim: Aim) -> Self {
        let dir = aim.direction();
        Self {
            center: shooter_center + dir * BARREL_OFFSET,
            vel: dir * PROJECTILE_SPEED,
            sweep_from: shooter_center,
            owner,
            age: 0,
            lifetime: PROJECTILE_LIFETIME_TICKS,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        rect_at(self.center - Vec2::splat(PROJECTILE_SIZE / 2.0), Vec2::splat(PROJECTILE_SIZE))
    }

    #[must_use]
    pub fn view(&self) -> BoxView {
        let bounds = self.bounds();
        BoxView {
            x: bounds.min.x,
            y: bounds.min.y,
            w: PROJECTILE_SIZE,
            h: PROJECTILE_SIZE,
        }
    }

    // Move one tick. Surface contact takes priority over expiry on the final tick.
    // The first sweep covers the barrel too, so a shooter pressed against a wall hits
    // the face it is touching.
    pub fn step(&mut self, surfaces: &SurfaceRegistry) -> ProjectileOutcome {
        let prev = self.sweep_from;
        self.center += self.vel;
        self.sweep_from = self.center;
        self.age += 1;

        if let Some(contact) = sweep_projectile_vs_surfaces(prev, self.center, PROJECTILE_SIZE, surfaces) {
            let eligible = surfaces.get(contact.surface).is_some_and(|surface| surface.portal_eligible);
            return if eligible {
                ProjectileOutcome::Hit {
                    surface: contact.surface,
                    contact: contact.point,
                }
            } else {
                ProjectileOutcome::Blocked { surface: contact.surface }
            };
        }

        if self.age >= self.lifetime {
            ProjectileOutcome::Expired
        } else {
            ProjectileOutcome::Flying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocol::{Elevation, Facing},
        surfaces::{CollisionClass, Surface},
    };

    #[test]
    fn test_fire_spawns_at_barrel() {
        let aim = Aim { facing: Facing::Left, elevation: Elevation::Level };
        let shot = Projectile::fire(ActorId(1), Vec2::new(200.0, 300.0), aim);
        assert!((shot.center - Vec2::new(170.0, 300.0)).length() < 1e-4);
        assert!((shot.vel - Vec2::new(-PROJECTILE_SPEED, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_hit_on_eligible_surface() {
        let surfaces = SurfaceRegistry::new(vec![Surface::new(300.0, 0.0, 13.0, 720.0, true, CollisionClass::Both)]);
        let aim = Aim { facing: Facing::Right, elevation: Elevation::Level };
        let mut shot = Projectile::fire(ActorId(0), Vec2::new(200.0, 300.0), aim);

        let outcome = (0..20)
            .map(|_| shot.step(&surfaces))
            .find(|outcome| *outcome != ProjectileOutcome::Flying)
            .expect("shot resolves");
        match outcome {
            ProjectileOutcome::Hit { surface, contact } => {
                assert_eq!(surface, 0);
                assert!((contact.x - 300.0).abs() < 1e-3);
                assert!((contact.y - 300.0).abs() < 1e-3);
            }
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn test_point_blank_shot_hits_near_face() {
        // Thin wall at x 400..413; the barrel point lands inside it
        let surfaces = SurfaceRegistry::new(vec![Surface::new(400.0, 0.0, 13.0, 720.0, true, CollisionClass::Both)]);
        let aim = Aim { facing: Facing::Right, elevation: Elevation::Level };
        let mut shot = Projectile::fire(ActorId(0), Vec2::new(379.5, 300.0), aim);
        assert!(shot.center.x > 400.0 && shot.center.x < 413.0);

        match shot.step(&surfaces) {
            ProjectileOutcome::Hit { surface, contact } => {
                assert_eq!(surface, 0);
                assert!((contact - Vec2::new(400.0, 300.0)).length() < 1e-3);
            }
            other => panic!("expected hit on the near face, got {other:?}"),
        }
    }

    #[test]
    fn test_later_steps_sweep_from_previous_center() {
        let surfaces = SurfaceRegistry::default();
        let aim = Aim { facing: Facing::Right, elevation: Elevation::Level };
        let mut shot = Projectile::fire(ActorId(0), Vec2::new(100.0, 300.0), aim);
        assert_eq!(shot.sweep_from, Vec2::new(100.0, 300.0));

        shot.step(&surfaces);
        assert_eq!(shot.sweep_from, shot.center);
        assert!((shot.center.x - (100.0 + BARREL_OFFSET + PROJECTILE_SPEED)).abs() < 1e-4);
    }

    #[test]
    fn test_non_eligible_surface_blocks() {
        let surfaces = SurfaceRegistry::new(vec![Surface::new(0.0, 400.0, 1280.0, 13.0, false, CollisionClass::CargoOnly)]);
        let aim = Aim { facing: Facing::Right, elevation: Elevation::Down };
        let mut shot = Projectile::fire(ActorId(0), Vec2::new(200.0, 300.0), aim);

        let outcome = (0..20)
            .map(|_| shot.step(&surfaces))
            .find(|outcome| *outcome != ProjectileOutcome::Flying);
        assert_eq!(outcome, Some(ProjectileOutcome::Blocked { surface: 0 }));
    }

    #[test]
    fn test_expires_after_lifetime() {
        let surfaces = SurfaceRegistry::default();
        let aim = Aim::default();
        let mut shot = Projectile::fire(ActorId(0), Vec2::new(200.0, 300.0), aim);
        shot.vel = Vec2::ZERO;

        for _ in 1..PROJECTILE_LIFETIME_TICKS {
            assert_eq!(shot.step(&surfaces), ProjectileOutcome::Flying);
        }
        assert_eq!(shot.step(&surfaces), ProjectileOutcome::Expired);
    }
}
