pub mod bodies;
pub mod helpers;
pub mod projectiles;

pub use bodies::{move_horizontal, move_vertical};
pub use helpers::{overlaps, rect_at};
pub use projectiles::{SurfaceContact, sweep_projectile_vs_surfaces};
