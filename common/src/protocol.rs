use bevy_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::TEAM_SIZE;

// Macro to reduce boilerplate for the read-only snapshot structs handed to renderers
macro_rules! snapshot {
    ($(#[$meta:meta])* struct $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct $name $body
    };
}

// ============================================================================
// Identifiers
// ============================================================================

// Actor ID - index of the actor in the level (0..4), also its portal slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub usize);

// Team ID - actors 0 and 1 are team 0, actors 2 and 3 are team 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(pub usize);

impl ActorId {
    #[must_use]
    pub const fn team(self) -> Team {
        Team(self.0 / TEAM_SIZE)
    }
}

// ============================================================================
// Facing & Aim
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

// Gun elevation relative to the facing direction. There is no free aim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Elevation {
    #[default]
    Level,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aim {
    pub facing: Facing,
    pub elevation: Elevation,
}

impl Aim {
    // Screen-space angle in degrees, clockwise from +x with y pointing down.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match (self.facing, self.elevation) {
            (Facing::Right, Elevation::Level) => 0,
            (Facing::Right, Elevation::Down) => 45,
            (Facing::Left, Elevation::Down) => 135,
            (Facing::Left, Elevation::Level) => 180,
            (Facing::Left, Elevation::Up) => 225,
            (Facing::Right, Elevation::Up) => 315,
        }
    }

    // Unit direction vector in world space (y down)
    #[must_use]
    pub fn direction(self) -> Vec2 {
        let radians = f32::from(self.degrees()).to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }
}

// ============================================================================
// Input
// ============================================================================

// Per actor, per tick button state. How it is produced (keyboard, script, bot) is
// irrelevant to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    pub move_left: bool,
    pub move_right: bool,
    pub jump_or_use: bool,
    pub aim_up: bool,
    pub aim_down: bool,
    pub fire: bool,
}

impl InputFrame {
    // Horizontal intent; pressing both directions cancels out.
    #[must_use]
    pub const fn horizontal(&self) -> Option<Facing> {
        match (self.move_left, self.move_right) {
            (true, false) => Some(Facing::Left),
            (false, true) => Some(Facing::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn elevation(&self) -> Elevation {
        if self.aim_up {
            Elevation::Up
        } else if self.aim_down {
            Elevation::Down
        } else {
            Elevation::Level
        }
    }
}

// ============================================================================
// Render Snapshot
// ============================================================================

snapshot! {
// Axis-aligned box in world units (top-left origin, y down)
struct BoxView {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}
}

snapshot! {
struct ActorView {
    pub id: ActorId,
    pub team: Team,
    pub bounds: BoxView,
    pub facing: Facing,
    pub aim_degrees: u16,
    pub carrying: bool,
    pub finished: bool,
}
}

snapshot! {
struct CargoView {
    pub bounds: BoxView,
    pub held: bool,
}
}

snapshot! {
struct PortalView {
    pub owner: ActorId,
    pub center_x: f32,
    pub center_y: f32,
    pub angle: u16,
}
}

snapshot! {
struct SurfaceView {
    pub bounds: BoxView,
    pub portal_eligible: bool,
    pub active: bool,
}
}

snapshot! {
struct LevelSnapshot {
    pub tick: u64,
    pub actors: Vec<ActorView>,
    pub cargo: Option<CargoView>,
    pub portals: Vec<PortalView>,
    pub projectiles: Vec<BoxView>,
    pub surfaces: Vec<SurfaceView>,
    pub button_pressed: Option<bool>,
    pub door_open: bool,
}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_angles_follow_facing() {
        let up_right = Aim { facing: Facing::Right, elevation: Elevation::Up };
        let down_left = Aim { facing: Facing::Left, elevation: Elevation::Down };
        assert_eq!(up_right.degrees(), 315);
        assert_eq!(down_left.degrees(), 135);

        let dir = up_right.direction();
        assert!(dir.x > 0.0 && dir.y < 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-5);

        let dir = down_left.direction();
        assert!(dir.x < 0.0 && dir.y > 0.0);
    }

    #[test]
    fn test_horizontal_intent_cancels() {
        let both = InputFrame { move_left: true, move_right: true, ..InputFrame::default() };
        assert_eq!(both.horizontal(), None);
        let left = InputFrame { move_left: true, ..InputFrame::default() };
        assert_eq!(left.horizontal(), Some(Facing::Left));
    }

    #[test]
    fn test_teams_pair_actors() {
        assert_eq!(ActorId(0).team(), ActorId(1).team());
        assert_eq!(ActorId(2).team(), Team(1));
        assert_ne!(ActorId(1).team(), ActorId(2).team());
    }
}
