pub mod config;
pub mod input;
pub mod resources;
pub mod systems;

pub use config::{Args, init_tracing};
pub use input::{BotInput, InputProvider, ScriptedInput};

use anyhow::{Context, Result};
use bevy_app::{App, Update};
use bevy_ecs::{prelude::*, schedule::ExecutorKind};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use common::{
    LevelRuntimeState,
    scoring::MatchResult,
    systems::{PendingInputs, TickEvents, level_tick_system},
};
use resources::{InputSource, MatchOutcome, MatchSettings};
use systems::{input_system, match_progress_system};

// ============================================================================
// App Setup
// ============================================================================

// One `app.update()` is one simulation tick
#[must_use]
pub fn build_app(state: LevelRuntimeState, provider: Box<dyn InputProvider>, settings: MatchSettings) -> App {
    let mut app = App::new();
    app.edit_schedule(Update, |schedule| {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    });
    app.insert_resource(state)
        .insert_resource(InputSource(provider))
        .insert_resource(settings)
        .init_resource::<PendingInputs>()
        .init_resource::<TickEvents>()
        .init_resource::<MatchOutcome>()
        .add_systems(
            Update,
            // Systems must run in order:
            // 1. Gather input frames
            // 2. Advance the level
            // 3. Check for the end of the match
            (input_system, level_tick_system, match_progress_system).chain(),
        );
    app
}

// ============================================================================
// Main Game Loop
// ============================================================================

pub async fn run_game(args: &Args) -> Result<MatchResult> {
    let config = args.load_config()?;
    let spec = args.load_level()?;
    let level_name = spec.name.clone();
    let state = LevelRuntimeState::new(spec, args.players, config.pairing, config.rules())
        .with_context(|| format!("Failed to start level {level_name}"))?;

    let provider: Box<dyn InputProvider> = match &args.script {
        Some(path) => Box::new(ScriptedInput::load(path)?),
        None => Box::new(BotInput::new(args.seed)),
    };
    let settings = MatchSettings {
        mode: args.mode.clone(),
        max_ticks: args.max_ticks,
    };
    let mut app = build_app(state, provider, settings);

    let tick_duration = config.tick_duration();
    let mut interval = time::interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(level = %level_name, players = args.players, paced = !args.unpaced, "starting level loop");

    loop {
        if !args.unpaced {
            interval.tick().await;
        }

        let update_start = Instant::now();
        app.update();
        let update_elapsed = update_start.elapsed();

        if !args.unpaced && update_elapsed > tick_duration {
            warn!(
                "tick took {:.2}ms (exceeded {:.2}ms budget)",
                update_elapsed.as_secs_f64() * 1000.0,
                tick_duration.as_secs_f64() * 1000.0
            );
        }

        if let Some(result) = app.world_mut().resource_mut::<MatchOutcome>().0.take() {
            return Ok(result);
        }
    }
}
