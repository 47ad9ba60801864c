use bevy_ecs::prelude::*;

use crate::input::InputProvider;
use common::scoring::MatchResult;

// ============================================================================
// Bevy Resources
// ============================================================================

// The input provider driving every actor
#[derive(Resource)]
pub struct InputSource(pub Box<dyn InputProvider>);

// Per-run settings that do not affect the simulation itself
#[derive(Resource, Debug, Clone)]
pub struct MatchSettings {
    pub mode: String,
    pub max_ticks: Option<u64>,
}

// Final result once the match has ended
#[derive(Resource, Debug, Default, Clone)]
pub struct MatchOutcome(pub Option<MatchResult>);
