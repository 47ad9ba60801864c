use bevy_math::{Rect, Vec2};

use crate::{
    collision::{
        bodies::{move_horizontal, move_vertical},
        helpers::rect_at,
    },
    constants::*,
    protocol::Facing,
    surfaces::{BodyFilter, SurfaceRegistry},
};

// ============================================================================
// Body
// ============================================================================

// A physics-simulated box: an actor or the cargo cube. Position is the top-left corner
// in world units, y pointing down; velocity is in units per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub jumping: bool,
    pub jump_counter: f32,
    pub can_jump: bool,
    pub facing: Facing,
    pub warp_cooldown: u32,
}

// Surfaces touched during one physics step, by registry index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepContacts {
    pub wall: Option<usize>,
    pub floor: Option<usize>,
    pub ceiling: Option<usize>,
}

impl Body {
    #[must_use]
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            grounded: false,
            jumping: false,
            jump_counter: 0.0,
            can_jump: true,
            facing: Facing::Right,
            warp_cooldown: 0,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        rect_at(self.pos, self.size)
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - self.size / 2.0;
    }

    // Start the parametric jump arc. Returns false when the body may not jump right now.
    pub fn start_jump(&mut self) -> bool {
        if !self.can_jump || self.jumping {
            return false;
        }
        self.jumping = true;
        self.can_jump = false;
        self.grounded = false;
        self.jump_counter = JUMP_COUNT;
        true
    }

    fn end_jump(&mut self) {
        self.jumping = false;
        self.jump_counter = 0.0;
    }

    // Advance one tick: horizontal intent or decay, gravity or jump arc, collision per
    // axis, then the world clamp.
    pub fn step(&mut self, intent: Option<Facing>, surfaces: &SurfaceRegistry, filter: BodyFilter) -> StepContacts {
        if let Some(dir) = intent {
            self.vel.x = dir.sign() * MOVE_SPEED;
            self.facing = dir;
        } else {
            self.vel.x *= if self.grounded { FRICTION } else { AIR_RESISTANCE };
            if self.vel.x.abs() < VELOCITY_STOP_THRESHOLD {
                self.vel.x = 0.0;
            }
        }

        let dy = if self.jumping {
            let rise = self.jump_counter * self.jump_counter * JUMP_ARC_SCALE;
            self.jump_counter -= 1.0;
            self.vel.y = -rise;
            if self.jump_counter < 0.0 {
                self.end_jump();
                self.vel.y = 0.0;
            }
            -rise
        } else {
            self.vel.y = (self.vel.y + GRAVITY).min(MAX_FALL_SPEED);
            self.vel.y
        };

        let mut contacts = StepContacts::default();

        contacts.wall = move_horizontal(&mut self.pos, self.size, self.vel.x, surfaces, filter);
        if contacts.wall.is_some() {
            self.vel.x = 0.0;
        }

        let vertical = move_vertical(&mut self.pos, self.size, dy, surfaces, filter);
        if dy > 0.0 {
            contacts.floor = vertical;
        } else {
            contacts.ceiling = vertical;
        }

        if contacts.floor.is_some() {
            self.vel.y = 0.0;
            self.can_jump = true;
        }
        if contacts.ceiling.is_some() {
            self.vel.y = 0.0;
            self.end_jump();
        }
        self.grounded = contacts.floor.is_some();

        self.clamp_to_world();
        contacts
    }

    // Lift a freshly spawned body out of any surface it was placed inside, so it rests on
    // top instead of falling through.
    pub fn settle(&mut self, surfaces: &SurfaceRegistry, filter: BodyFilter) {
        for _ in 0..surfaces.len() {
            let Some((_, surface)) = surfaces.first_blocking(self.bounds(), filter) else {
                break;
            };
            self.pos.y = surface.bounds.min.y - self.size.y;
        }
        self.clamp_to_world();
    }

    // Keep the body inside the outer walls, zeroing velocity on each clamped axis.
    pub fn clamp_to_world(&mut self) {
        let clamped = clamp_to_world(self.pos, self.size);

        if clamped.x != self.pos.x {
            self.vel.x = 0.0;
        }
        if clamped.y < self.pos.y {
            // Resting on the world floor
            self.vel.y = 0.0;
            self.grounded = true;
            self.can_jump = true;
        } else if clamped.y > self.pos.y {
            self.vel.y = 0.0;
            self.end_jump();
        }

        self.pos = clamped;
    }
}

// ============================================================================
// World Bounds
// ============================================================================

#[must_use]
pub const fn world_min() -> Vec2 {
    Vec2::splat(WALL_THICKNESS)
}

#[must_use]
pub fn world_max(size: Vec2) -> Vec2 {
    Vec2::new(WORLD_WIDTH, WORLD_HEIGHT) - size - Vec2::splat(WALL_THICKNESS)
}

// Clamp a top-left position so the whole box stays inside the outer walls.
#[must_use]
pub fn clamp_to_world(pos: Vec2, size: Vec2) -> Vec2 {
    pos.clamp(world_min(), world_max(size))
}
