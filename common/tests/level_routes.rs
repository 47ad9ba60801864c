use common::{
    LevelEvent, LevelRuntimeState,
    levels::builtin_level,
    portals::{Mount, PairingPolicy},
    protocol::{ActorId, InputFrame, Team},
    runtime::BodyRef,
    scoring::MatchRules,
};

// Right face of the divider between the start room and room two
const ROOM_TWO: f32 = 413.0;
const ROUTE_TICK_LIMIT: u64 = 3000;

// Per-actor driver state. Actor 0 opens the ceiling portal over room two, actor 1 the
// floor portal under its own feet; actor 0 follows once actor 1 is out.
#[derive(Default)]
struct Runner {
    fired: bool,
    landed: bool,
}

impl Runner {
    fn frame(&mut self, state: &LevelRuntimeState, index: usize, jump_edges: &[f32]) -> InputFrame {
        let actor = &state.actors[index];
        let body = &actor.body;
        let mut input = InputFrame::default();
        if actor.finished {
            return input;
        }

        if !self.fired {
            if body.grounded {
                self.fired = true;
                input.fire = true;
                input.aim_up = index == 0;
                input.aim_down = index == 1;
            }
            return input;
        }

        if body.pos.x < ROOM_TWO {
            input.move_right = index == 0 && state.portals.live_count() == 2 && state.actors[1].finished;
            return input;
        }

        // Fall straight out of the ceiling portal, then head right
        self.landed |= body.grounded;
        if !self.landed {
            return input;
        }
        input.move_right = true;
        input.jump_or_use = body.grounded && jump_edges.iter().any(|edge| (edge - 10.0..*edge).contains(&body.pos.x));
        input
    }
}

fn run_route(level: usize, jump_edges: &[f32]) -> (LevelRuntimeState, Vec<LevelEvent>) {
    let spec = builtin_level(level).expect("built-in level");
    let mut state = LevelRuntimeState::new(spec, 2, PairingPolicy::Universal, MatchRules::default()).expect("valid level");
    let mut runners = [Runner::default(), Runner::default()];
    let mut events = Vec::new();

    while !state.is_over() && state.tick < ROUTE_TICK_LIMIT {
        let frames: Vec<InputFrame> = runners
            .iter_mut()
            .enumerate()
            .map(|(index, runner)| runner.frame(&state, index, jump_edges))
            .collect();
        events.extend(state.tick(&frames));
    }
    (state, events)
}

fn assert_team_escaped(state: &LevelRuntimeState, events: &[LevelEvent]) {
    assert!(events.iter().any(|event| matches!(
        event,
        LevelEvent::PortalPlaced { owner: ActorId(0), mount: Mount::Ceiling, .. }
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        LevelEvent::PortalPlaced { owner: ActorId(1), mount: Mount::Floor, .. }
    )));
    for id in [ActorId(0), ActorId(1)] {
        assert!(events.iter().any(|event| matches!(
            event,
            LevelEvent::Warped { body: BodyRef::Actor(actor), .. } if *actor == id
        )));
        assert!(events.contains(&LevelEvent::ActorFinished { actor: id }));
    }
    assert!(events.contains(&LevelEvent::TeamWon { team: Team(0) }));

    let result = state.result("route");
    assert_eq!(result.scores, [100, 100, 0, 0]);
    assert_eq!(result.winner, 0);
    assert_eq!(result.meta.finished, 2);
}

fn assert_cube_holds_button(state: &LevelRuntimeState, events: &[LevelEvent]) {
    assert!(events.contains(&LevelEvent::ButtonChanged { pressed: true }));
    assert!(!events.contains(&LevelEvent::ButtonChanged { pressed: false }));
    assert!(state.button_pressed);
    let cargo = state.cargo.as_ref().expect("slot levels have a cube");
    assert!(cargo.is_free());
}

#[test]
fn the_gap_is_crossed_with_a_jump() {
    let (state, events) = run_route(1, &[860.0]);
    assert_team_escaped(&state, &events);
}

#[test]
fn button_and_door_opens_once_the_cube_drops() {
    let (state, events) = run_route(2, &[]);
    assert_cube_holds_button(&state, &events);
    assert_team_escaped(&state, &events);
}

#[test]
fn multi_level_drops_to_the_exit_ledge() {
    let (state, events) = run_route(3, &[]);
    assert_team_escaped(&state, &events);
}

#[test]
fn the_maze_steps_down_to_the_floor_exit() {
    let (state, events) = run_route(4, &[]);
    assert_team_escaped(&state, &events);
}

#[test]
fn the_challenge_needs_cube_and_jump() {
    let (state, events) = run_route(5, &[1020.0]);
    assert_cube_holds_button(&state, &events);
    assert_team_escaped(&state, &events);
}

#[test]
fn the_gap_is_lost_without_jumping() {
    let spec = builtin_level(1).expect("built-in level");
    let mut state = LevelRuntimeState::new(spec, 2, PairingPolicy::Universal, MatchRules::default()).expect("valid level");
    let mut runners = [Runner::default(), Runner::default()];
    for _ in 0..1200 {
        let frames: Vec<InputFrame> = runners
            .iter_mut()
            .enumerate()
            .map(|(index, runner)| runner.frame(&state, index, &[]))
            .collect();
        state.tick(&frames);
    }
    assert!(!state.actors[1].finished);
    assert!(state.actors[1].body.pos.x > ROOM_TWO);
}
