use thiserror::Error;

// Errors raised while loading or validating a level. Nothing inside a running tick
// produces an error; those paths degrade to a no-op and a log line instead.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("surface {index} has a non-positive extent ({width} x {height})")]
    DegenerateSurface { index: usize, width: f32, height: f32 },

    #[error("{what} has a non-positive extent ({width} x {height})")]
    DegenerateObject { what: &'static str, width: f32, height: f32 },

    #[error("level provides {spawns} spawn points but {players} players were requested")]
    MissingSpawn { players: usize, spawns: usize },

    #[error("player count must be between 1 and {max}, got {got}")]
    PlayerCount { got: usize, max: usize },

    #[error("no built-in level number {0}")]
    UnknownLevel(usize),

    #[error("invalid level data: {0}")]
    Parse(#[from] serde_json::Error),
}
