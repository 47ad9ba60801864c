use bevy_math::Vec2;

use crate::{
    bodies::Body,
    constants::*,
    protocol::{ActorId, ActorView, Aim, BoxView, CargoView, Elevation, Facing, InputFrame},
    surfaces::BodyFilter,
};

fn box_view(body: &Body) -> BoxView {
    BoxView {
        x: body.pos.x,
        y: body.pos.y,
        w: body.size.x,
        h: body.size.y,
    }
}

// ============================================================================
// Actor
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub body: Body,
    pub aim: Aim,
    pub carrying: bool,
    pub finished: bool,
    pub shoot_cooldown: u32,
    // Buttons held last tick, for edge-triggered actions
    pub last_input: InputFrame,
}

impl Actor {
    #[must_use]
    pub const fn new(id: ActorId, spawn: Vec2) -> Self {
        Self {
            id,
            body: Body::new(spawn, Vec2::splat(ACTOR_SIZE)),
            aim: Aim {
                facing: Facing::Right,
                elevation: Elevation::Level,
            },
            carrying: false,
            finished: false,
            shoot_cooldown: 0,
            last_input: InputFrame {
                move_left: false,
                move_right: false,
                jump_or_use: false,
                aim_up: false,
                aim_down: false,
                fire: false,
            },
        }
    }

    #[must_use]
    pub const fn filter(&self) -> BodyFilter {
        BodyFilter::actor(self.carrying)
    }

    #[must_use]
    pub fn view(&self) -> ActorView {
        ActorView {
            id: self.id,
            team: self.id.team(),
            bounds: box_view(&self.body),
            facing: self.body.facing,
            aim_degrees: self.aim.degrees(),
            carrying: self.carrying,
            finished: self.finished,
        }
    }
}

// Pressed this tick but not last tick
#[must_use]
pub const fn rising(now: bool, before: bool) -> bool {
    now && !before
}

// Direction a carried cube is thrown: explicit movement first, then aim, then facing.
#[must_use]
pub const fn throw_direction(input: &InputFrame, facing: Facing) -> Vec2 {
    if let Some(dir) = input.horizontal() {
        return Vec2::new(dir.sign(), 0.0);
    }
    match input.elevation() {
        Elevation::Up => Vec2::NEG_Y,
        Elevation::Down => Vec2::Y,
        Elevation::Level => Vec2::new(facing.sign(), 0.0),
    }
}

// ============================================================================
// Cargo
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Cargo {
    pub body: Body,
    pub held_by: Option<ActorId>,
}

impl Cargo {
    #[must_use]
    pub const fn new(spawn: Vec2) -> Self {
        Self {
            body: Body::new(spawn, Vec2::splat(CARGO_SIZE)),
            held_by: None,
        }
    }

    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.held_by.is_none()
    }

    #[must_use]
    pub const fn filter(&self) -> BodyFilter {
        BodyFilter::cargo(self.held_by.is_some())
    }

    // Centre the cube above the carrier's head. Held cargo has no physics of its own.
    pub fn pin_above(&mut self, carrier: &Body) {
        self.body.set_center(Vec2::new(carrier.center().x, carrier.pos.y - CARRY_LIFT));
        self.body.vel = carrier.vel;
        self.body.jumping = false;
        self.body.grounded = false;
    }

    pub fn release(&mut self, velocity: Vec2) {
        self.held_by = None;
        self.body.vel = velocity;
        self.body.warp_cooldown = 0;
    }

    #[must_use]
    pub fn view(&self) -> CargoView {
        CargoView {
            bounds: box_view(&self.body),
            held: self.held_by.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throw_direction_priority() {
        let left_and_up = InputFrame {
            move_left: true,
            aim_up: true,
            ..InputFrame::default()
        };
        assert_eq!(throw_direction(&left_and_up, Facing::Right), Vec2::new(-1.0, 0.0));

        let down = InputFrame {
            aim_down: true,
            ..InputFrame::default()
        };
        assert_eq!(throw_direction(&down, Facing::Left), Vec2::Y);
        assert_eq!(throw_direction(&InputFrame::default(), Facing::Left), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_pin_above_centres_on_carrier() {
        let carrier = Body::new(Vec2::new(100.0, 500.0), Vec2::splat(ACTOR_SIZE));
        let mut cargo = Cargo::new(Vec2::new(600.0, 600.0));
        cargo.held_by = Some(ActorId(0));
        cargo.pin_above(&carrier);

        assert!((cargo.body.center().x - carrier.center().x).abs() < 1e-4);
        assert!((cargo.body.center().y - (500.0 - CARRY_LIFT)).abs() < 1e-4);
        assert!(cargo.filter().linked);
    }

    #[test]
    fn test_edges() {
        assert!(rising(true, false));
        assert!(!rising(true, true));
        assert!(!rising(false, false));
    }
}
