use bevy_ecs::prelude::*;
use tracing::info;

use crate::resources::{InputSource, MatchOutcome, MatchSettings};
use common::{LevelRuntimeState, systems::PendingInputs};

// ============================================================================
// Input System
// ============================================================================

// Ask the input provider for this tick's frames
pub fn input_system(
    mut source: ResMut<InputSource>,
    state: Res<LevelRuntimeState>,
    mut pending: ResMut<PendingInputs>,
) {
    pending.0 = source.0.frames(&state);
}

// ============================================================================
// Match Progress System
// ============================================================================

// Capture the result once the match is over or the tick cap is reached
pub fn match_progress_system(
    state: Res<LevelRuntimeState>,
    settings: Res<MatchSettings>,
    mut outcome: ResMut<MatchOutcome>,
) {
    if outcome.0.is_some() {
        return;
    }

    let capped = settings.max_ticks.is_some_and(|max| state.tick >= max);
    if state.is_over() || capped {
        let result = state.result(&settings.mode);
        info!(
            tick = state.tick,
            winner = result.winner,
            finished = result.meta.finished,
            capped,
            "match over"
        );
        outcome.0 = Some(result);
    }
}
