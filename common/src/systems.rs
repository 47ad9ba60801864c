use bevy_ecs::prelude::*;
use tracing::debug;

use crate::{
    protocol::InputFrame,
    runtime::{LevelEvent, LevelRuntimeState},
};

// ============================================================================
// Resources
// ============================================================================

// Input frames for the coming tick, indexed by actor. Filled by whatever drives the
// actors before `level_tick_system` runs.
#[derive(Resource, Debug, Default, Clone)]
pub struct PendingInputs(pub Vec<InputFrame>);

// Events produced by the most recent tick
#[derive(Resource, Debug, Default, Clone)]
pub struct TickEvents(pub Vec<LevelEvent>);

// ============================================================================
// Shared Game Systems
// ============================================================================

// Advance the level by exactly one fixed tick
pub fn level_tick_system(
    mut state: ResMut<LevelRuntimeState>,
    inputs: Res<PendingInputs>,
    mut events: ResMut<TickEvents>,
) {
    let tick = state.tick;
    events.0 = state.tick(&inputs.0);
    for event in &events.0 {
        debug!(tick, ?event, "level event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{levels::builtin_level, portals::PairingPolicy, scoring::MatchRules};

    fn world_with_level() -> World {
        let spec = builtin_level(1).expect("built-in level");
        let state =
            LevelRuntimeState::new(spec, 2, PairingPolicy::default(), MatchRules::default()).expect("valid level");
        let mut world = World::new();
        world.insert_resource(state);
        world.init_resource::<PendingInputs>();
        world.init_resource::<TickEvents>();
        world
    }

    #[test]
    fn test_tick_system_advances_level() {
        let mut world = world_with_level();
        let mut schedule = Schedule::default();
        schedule.add_systems(level_tick_system);

        world.resource_mut::<PendingInputs>().0 = vec![InputFrame {
            fire: true,
            ..InputFrame::default()
        }];
        schedule.run(&mut world);

        assert_eq!(world.resource::<LevelRuntimeState>().tick, 1);
        let events = &world.resource::<TickEvents>().0;
        assert!(events.iter().any(|event| matches!(event, LevelEvent::ProjectileFired { .. })));

        world.resource_mut::<PendingInputs>().0.clear();
        schedule.run(&mut world);
        assert_eq!(world.resource::<LevelRuntimeState>().tick, 2);
        assert!(world.resource::<TickEvents>().0.iter().all(|event| !matches!(event, LevelEvent::ProjectileFired { .. })));
    }
}
