use bevy_math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    collision::helpers::rect_at,
    constants::*,
    error::LevelError,
    surfaces::{CollisionClass, Surface, SurfaceRegistry},
};

// ============================================================================
// Level Data
// ============================================================================

// Position in world units (top-left corner of whatever is placed there)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default = "default_true")]
    pub portal_eligible: bool,
    #[serde(default)]
    pub collision: CollisionClass,
}

// What may hold a button down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonTrigger {
    #[default]
    Any,
    CargoOnly,
    ActorOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub trigger: ButtonTrigger,
}

impl ButtonSpec {
    #[must_use]
    pub fn bounds(&self) -> Rect {
        rect_at(Vec2::new(self.x, self.y), Vec2::new(BUTTON_WIDTH, BUTTON_HEIGHT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub x: f32,
    pub y: f32,
}

impl DoorSpec {
    #[must_use]
    pub fn bounds(&self) -> Rect {
        rect_at(Vec2::new(self.x, self.y), Vec2::new(DOOR_WIDTH, DOOR_HEIGHT))
    }
}

// Immutable description of a level. A runtime built from it can always be reset back
// to this state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub surfaces: Vec<SurfaceSpec>,
    pub spawns: Vec<Point>,
    #[serde(default)]
    pub cargo: Option<Point>,
    #[serde(default)]
    pub button: Option<ButtonSpec>,
    pub door: DoorSpec,
}

impl LevelSpec {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    // Reject geometry the physics cannot reason about
    pub fn validate(&self, players: usize) -> Result<(), LevelError> {
        if players == 0 || players > MAX_ACTORS {
            return Err(LevelError::PlayerCount { got: players, max: MAX_ACTORS });
        }
        if self.spawns.len() < players {
            return Err(LevelError::MissingSpawn {
                players,
                spawns: self.spawns.len(),
            });
        }

        for (index, surface) in self.surfaces.iter().enumerate() {
            if !(surface.w > 0.0 && surface.h > 0.0) {
                return Err(LevelError::DegenerateSurface {
                    index,
                    width: surface.w,
                    height: surface.h,
                });
            }
        }

        let objects = [
            ("button", self.button.map(|button| button.bounds())),
            ("door", Some(self.door.bounds())),
            ("cargo", self.cargo.map(|cargo| rect_at(cargo.to_vec2(), Vec2::splat(CARGO_SIZE)))),
        ];
        for (what, bounds) in objects {
            if let Some(bounds) = bounds
                && !(bounds.width() > 0.0 && bounds.height() > 0.0 && bounds.min.is_finite())
            {
                return Err(LevelError::DegenerateObject {
                    what,
                    width: bounds.width(),
                    height: bounds.height(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn surface_registry(&self) -> SurfaceRegistry {
        SurfaceRegistry::new(
            self.surfaces
                .iter()
                .map(|s| Surface::new(s.x, s.y, s.w, s.h, s.portal_eligible, s.collision))
                .collect(),
        )
    }
}

// ============================================================================
// Built-in Levels
// ============================================================================

pub const BUILTIN_LEVEL_COUNT: usize = 5;

const W: f32 = WORLD_WIDTH;
const H: f32 = WORLD_HEIGHT;
const T: f32 = WALL_THICKNESS;

const fn solid(x: f32, y: f32, w: f32, h: f32) -> SurfaceSpec {
    SurfaceSpec {
        x,
        y,
        w,
        h,
        portal_eligible: true,
        collision: CollisionClass::Both,
    }
}

const fn at(x: f32, y: f32) -> Point {
    Point { x, y }
}

const DIVIDER_TOP: f32 = 340.0;

// Outer walls, the start ledge and the divider every level shares. The divider stops
// short of the ceiling: a shot aimed up-right from the ledge clears it and opens a
// ceiling portal over room two, and a shot aimed down-right opens the floor portal
// leading there.
fn common_surfaces() -> Vec<SurfaceSpec> {
    vec![
        solid(0.0, H - T, W, T),
        solid(0.0, 0.0, T, H),
        solid(W - T, 0.0, T, H),
        solid(0.0, 0.0, W, T),
        solid(60.0, H - 120.0, 280.0, T),
        solid(400.0, DIVIDER_TOP, T, H - DIVIDER_TOP),
    ]
}

fn common_spawns() -> Vec<Point> {
    vec![at(120.0, H - 170.0), at(180.0, H - 170.0), at(240.0, H - 170.0), at(300.0, H - 170.0)]
}

fn level(name: &str, extra: &[SurfaceSpec], cargo: Option<Point>, button: Option<ButtonSpec>, door: Point) -> LevelSpec {
    let mut surfaces = common_surfaces();
    surfaces.extend_from_slice(extra);
    LevelSpec {
        name: name.to_string(),
        surfaces,
        spawns: common_spawns(),
        cargo,
        button,
        door: DoorSpec { x: door.x, y: door.y },
    }
}

// Button resting on the world floor under the slot between two room-two ledges
const fn slot_button(x: f32, trigger: ButtonTrigger) -> ButtonSpec {
    ButtonSpec {
        x,
        y: H - T - BUTTON_HEIGHT,
        trigger,
    }
}

// Built-in level by number (1-based)
pub fn builtin_level(number: usize) -> Result<LevelSpec, LevelError> {
    let ledge = H - 120.0;
    let door_on_ledge = ledge - DOOR_HEIGHT;

    let spec = match number {
        // Jump the gap between the landing ledge and the exit ledge
        1 => level(
            "The Gap",
            &[
                solid(450.0, ledge, 180.0, T),
                solid(500.0, H - 300.0, T, 180.0),
                solid(630.0, H - 300.0, T, 180.0),
                solid(680.0, ledge, 180.0, T),
                solid(920.0, ledge, 310.0, T),
            ],
            None,
            None,
            at(1100.0, door_on_ledge),
        ),
        // Shove the cube into the slot so it lands on the button below
        2 => level(
            "Button and Door",
            &[
                solid(413.0, ledge, 437.0, T),
                solid(885.0, ledge, 382.0, T),
            ],
            Some(at(760.0, ledge - CARGO_SIZE)),
            Some(slot_button(855.0, ButtonTrigger::Any)),
            at(1100.0, door_on_ledge),
        ),
        // Drop from the high shelf to the exit ledge
        3 => level(
            "Multi-Level",
            &[
                solid(560.0, H - 240.0, 240.0, T),
                solid(820.0, ledge, 447.0, T),
                solid(1000.0, H - 420.0, 200.0, T),
            ],
            None,
            None,
            at(1100.0, door_on_ledge),
        ),
        // Step down two shelves to the exit on the floor
        4 => level(
            "The Maze",
            &[
                solid(450.0, H - 160.0, 150.0, T),
                solid(470.0, H - 300.0, T, 140.0),
                solid(600.0, H - 420.0, 220.0, T),
                solid(840.0, H - 270.0, 200.0, T),
            ],
            None,
            None,
            at(1150.0, H - T - DOOR_HEIGHT),
        ),
        // Cube into the slot, then jump the gap to the exit ledge
        5 => level(
            "The Challenge",
            &[
                solid(413.0, ledge, 437.0, T),
                solid(885.0, ledge, 135.0, T),
                solid(1080.0, ledge, 187.0, T),
            ],
            Some(at(760.0, ledge - CARGO_SIZE)),
            Some(slot_button(855.0, ButtonTrigger::CargoOnly)),
            at(1180.0, door_on_ledge),
        ),
        other => return Err(LevelError::UnknownLevel(other)),
    };
    Ok(spec)
}
