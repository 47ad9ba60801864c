// ============================================================================
// Timing
// ============================================================================

pub const TICK_RATE: u32 = 60; // ticks per second

// ============================================================================
// Floating-Point Comparisons
// ============================================================================

// Small value for floating-point comparisons (near-zero checks, division guards).
pub const PHYSICS_EPSILON: f32 = 1e-6;

// Overlap tolerance for rectangle tests. Coordinates reach ~1300 units, where a single
// f32 ulp is ~1e-4, so touching edges must not count as overlapping.
pub const COLLISION_EPSILON: f32 = 1e-3;

// ============================================================================
// World
// ============================================================================

pub const WORLD_WIDTH: f32 = 1280.0;
pub const WORLD_HEIGHT: f32 = 720.0;
pub const WALL_THICKNESS: f32 = 13.0; // outer wall and default platform thickness

// ============================================================================
// Actors
// ============================================================================

pub const ACTOR_SIZE: f32 = 41.0; // square hitbox
pub const MAX_ACTORS: usize = 4;
pub const TEAM_SIZE: usize = 2;

// Speeds (units per tick)
pub const MOVE_SPEED: f32 = 2.7;
pub const MAX_FALL_SPEED: f32 = 12.0; // stays below WALL_THICKNESS so falls cannot tunnel

// Momentum decay (multiplied into horizontal velocity each tick without input)
pub const FRICTION: f32 = 0.9; // grounded
pub const AIR_RESISTANCE: f32 = 0.98; // airborne
pub const VELOCITY_STOP_THRESHOLD: f32 = 0.01;

// Gravity (units per tick squared)
pub const GRAVITY: f32 = 0.27;

// Jump arc: rise counter^2 * JUMP_ARC_SCALE per tick while the counter counts down
pub const JUMP_COUNT: f32 = 9.1;
pub const JUMP_ARC_SCALE: f32 = 0.1;

// ============================================================================
// Cargo
// ============================================================================

pub const CARGO_SIZE: f32 = 31.0;
pub const CARRY_LIFT: f32 = 20.0; // cargo centre sits this far above the carrier's top edge
pub const THROW_SPEED: f32 = 3.0;
pub const CARGO_PUSH_SPEED: f32 = 2.0; // horizontal nudge per tick from a walking actor

// ============================================================================
// Portals
// ============================================================================

pub const PORTAL_SPAN: f32 = 74.0; // along the surface
pub const PORTAL_THICKNESS: f32 = 37.0; // along the surface normal
pub const PORTAL_REPLACE_RADIUS: f32 = 50.0; // a new portal clears any portal closer than this
pub const WARP_CLEARANCE: f32 = 20.0; // gap between exit portal and the warped body
pub const WARP_COOLDOWN_TICKS: u32 = 120; // 2 seconds at 60 Hz
pub const WARP_SPEED_EPSILON: f32 = 0.1;
pub const WARP_MOMENTUM_BOOST: f32 = 1.5;
pub const WARP_MIN_PUSH_HORIZONTAL: f32 = 1.0;
pub const WARP_MIN_PUSH_VERTICAL: f32 = 2.0;

// ============================================================================
// Projectiles
// ============================================================================

pub const PROJECTILE_SPEED: f32 = 12.0; // units per tick
pub const PROJECTILE_SIZE: f32 = 11.0; // square hitbox
pub const PROJECTILE_LIFETIME_TICKS: u32 = 90;
pub const BARREL_OFFSET: f32 = 30.0; // spawn distance from the shooter's centre
pub const SHOOT_COOLDOWN_TICKS: u32 = 20;

// ============================================================================
// Level Objects
// ============================================================================

pub const BUTTON_WIDTH: f32 = 26.0;
pub const BUTTON_HEIGHT: f32 = 9.0;
pub const DOOR_WIDTH: f32 = 48.0;
pub const DOOR_HEIGHT: f32 = 97.0;

// ============================================================================
// Match Rules
// ============================================================================

pub const TIME_LIMIT_SECS: u32 = 120;
pub const FINISH_GRACE_SECS: u32 = 3;
pub const FINISH_POINTS: i32 = 50;
pub const TEAM_WIN_BONUS: i32 = 100;
pub const RESULT_PREFIX: &str = "RESULT:";
pub const RUN_OUTPUT_TAIL: usize = 4000; // characters of stdout/stderr kept in a run report
