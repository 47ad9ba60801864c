pub mod actors;
pub mod bodies;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod levels;
pub mod portals;
pub mod projectiles;
pub mod protocol;
pub mod runtime;
pub mod scoring;
pub mod surfaces;
pub mod systems;

pub use error::LevelError;
pub use runtime::{LevelEvent, LevelRuntimeState};
