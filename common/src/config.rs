use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tracing::info;

use crate::{
    constants::{FINISH_GRACE_SECS, TICK_RATE, TIME_LIMIT_SECS},
    portals::PairingPolicy,
    scoring::MatchRules,
};

// ============================================================================
// Game Configuration
// ============================================================================

// Tunables a host may override from a JSON file. Missing fields keep their defaults,
// so `{}` is a valid config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub pairing: PairingPolicy,
    pub time_limit_secs: u32,
    pub finish_grace_secs: u32,
    pub tick_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pairing: PairingPolicy::default(),
            time_limit_secs: TIME_LIMIT_SECS,
            finish_grace_secs: FINISH_GRACE_SECS,
            tick_rate: TICK_RATE,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), ?config, "loaded game config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        anyhow::ensure!(config.tick_rate > 0, "tick_rate must be positive");
        Ok(config)
    }

    // Match timing converted to simulation ticks
    #[must_use]
    pub fn rules(&self) -> MatchRules {
        MatchRules {
            time_limit_ticks: u64::from(self.time_limit_secs) * u64::from(self.tick_rate),
            finish_grace_ticks: u64::from(self.finish_grace_secs) * u64::from(self.tick_rate),
        }
    }

    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate.max(1)))
    }
}
