use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use common::{
    config::GameConfig,
    levels::{BUILTIN_LEVEL_COUNT, LevelSpec, builtin_level},
};

const LOG_FILTER: &str = "info";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Portal 2D co-op level runner", long_about = None)]
pub struct Args {
    // Number of actors taking part (1 to 4)
    #[arg(long, default_value_t = 4)]
    pub players: usize,

    // Seed for the bot input provider
    #[arg(long, default_value_t = 123)]
    pub seed: u64,

    // Mode string echoed in the result metadata
    #[arg(long, default_value = "jam")]
    pub mode: String,

    // Built-in level number
    #[arg(long, default_value_t = 1)]
    pub level: usize,

    // Load a level from a JSON file instead of the built-in catalog
    #[arg(long)]
    pub level_file: Option<PathBuf>,

    // Drive the actors from a JSON input script instead of bots
    #[arg(long)]
    pub script: Option<PathBuf>,

    // JSON game config overriding the default match rules
    #[arg(long)]
    pub config: Option<PathBuf>,

    // Run ticks back-to-back instead of at the tick rate
    #[arg(long, default_value_t = false)]
    pub unpaced: bool,

    // Stop after this many ticks even if the match is still running
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

impl Args {
    pub fn load_level(&self) -> Result<LevelSpec> {
        if let Some(path) = &self.level_file {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            return LevelSpec::from_json(&text).with_context(|| format!("Failed to parse level {}", path.display()));
        }
        builtin_level(self.level).with_context(|| format!("Built-in levels are 1 to {BUILTIN_LEVEL_COUNT}"))
    }

    pub fn load_config(&self) -> Result<GameConfig> {
        self.config
            .as_deref()
            .map_or_else(|| Ok(GameConfig::default()), GameConfig::load)
    }
}

// ============================================================================
// Logging
// ============================================================================

// Logs go to stderr; stdout is reserved for the result line.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["game"]);
        assert_eq!(args.players, 4);
        assert_eq!(args.seed, 123);
        assert_eq!(args.mode, "jam");
        assert!(!args.unpaced);
        assert_eq!(args.load_level().expect("level 1").name, "The Gap");
        assert_eq!(args.load_config().expect("default config"), GameConfig::default());
    }

    #[test]
    fn test_unknown_level_is_an_error() {
        let args = Args::parse_from(["game", "--level", "9", "--unpaced", "--max-ticks", "10"]);
        assert!(args.unpaced);
        assert_eq!(args.max_ticks, Some(10));
        assert!(args.load_level().is_err());
    }
}
