use anyhow::{Context, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use common::{LevelRuntimeState, protocol::InputFrame};

// Where input frames come from. The simulation does not care whether a person, a
// script or a bot holds the buttons.
pub trait InputProvider: Send + Sync {
    // One frame per actor for the tick about to run
    fn frames(&mut self, state: &LevelRuntimeState) -> Vec<InputFrame>;
}

// ============================================================================
// Scripted Input
// ============================================================================

// Buttons held by one actor over the tick range `from..to`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptSegment {
    pub actor: usize,
    pub from: u64,
    pub to: u64,
    pub input: InputFrame,
}

// Replays a fixed list of segments. Actors without a matching segment stay idle; when
// segments overlap the later one wins.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    segments: Vec<ScriptSegment>,
}

impl ScriptedInput {
    #[must_use]
    pub const fn new(segments: Vec<ScriptSegment>) -> Self {
        Self { segments }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let segments: Vec<ScriptSegment> = serde_json::from_str(text)?;
        Ok(Self::new(segments))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let script = Self::from_json(&text).with_context(|| format!("Failed to parse script {}", path.display()))?;
        info!(path = %path.display(), segments = script.segments.len(), "loaded input script");
        Ok(script)
    }

    #[must_use]
    pub fn frame(&self, actor: usize, tick: u64) -> InputFrame {
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.actor == actor && (segment.from..segment.to).contains(&tick))
            .map(|segment| segment.input)
            .unwrap_or_default()
    }
}

impl InputProvider for ScriptedInput {
    fn frames(&mut self, state: &LevelRuntimeState) -> Vec<InputFrame> {
        (0..state.players()).map(|actor| self.frame(actor, state.tick)).collect()
    }
}

// ============================================================================
// Bot Input
// ============================================================================

const BOT_HOLD_MIN: u32 = 10;
const BOT_HOLD_MAX: u32 = 45;
const BOT_SEEK_DOOR_PROBABILITY: f64 = 0.7;
const BOT_JUMP_PROBABILITY: f64 = 0.3;
const BOT_FIRE_PROBABILITY: f64 = 0.25;
const BOT_AIM_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, Default)]
struct BotIntent {
    frame: InputFrame,
    hold: u32,
}

// Seeded random player that drifts toward the exit door. Jump and fire are pressed only
// on the first tick of each intent so they register as fresh presses.
#[derive(Debug, Clone)]
pub struct BotInput {
    rng: StdRng,
    intents: Vec<BotIntent>,
}

impl BotInput {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            intents: Vec::new(),
        }
    }

    fn next_intent(&mut self, actor_x: f32, door_x: f32) -> BotIntent {
        let rng = &mut self.rng;
        let toward_door = door_x >= actor_x;
        let right = if rng.random_bool(BOT_SEEK_DOOR_PROBABILITY) {
            toward_door
        } else {
            rng.random_bool(0.5)
        };
        let aim_up = rng.random_bool(BOT_AIM_PROBABILITY);

        BotIntent {
            frame: InputFrame {
                move_left: !right,
                move_right: right,
                jump_or_use: rng.random_bool(BOT_JUMP_PROBABILITY),
                aim_up,
                aim_down: !aim_up && rng.random_bool(BOT_AIM_PROBABILITY),
                fire: rng.random_bool(BOT_FIRE_PROBABILITY),
            },
            hold: rng.random_range(BOT_HOLD_MIN..=BOT_HOLD_MAX),
        }
    }
}

impl InputProvider for BotInput {
    fn frames(&mut self, state: &LevelRuntimeState) -> Vec<InputFrame> {
        let door_x = state.spec().door.bounds().center().x;
        self.intents.resize(state.actors.len(), BotIntent::default());

        let mut frames = Vec::with_capacity(state.actors.len());
        for (index, actor) in state.actors.iter().enumerate() {
            let mut intent = self.intents[index];
            let fresh = intent.hold == 0;
            if fresh {
                intent = self.next_intent(actor.body.center().x, door_x);
            }
            intent.hold -= 1;
            self.intents[index] = intent;

            let mut frame = intent.frame;
            if !fresh {
                frame.jump_or_use = false;
                frame.fire = false;
            }
            frames.push(frame);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{levels::builtin_level, portals::PairingPolicy, scoring::MatchRules};

    fn state(players: usize) -> LevelRuntimeState {
        let spec = builtin_level(1).expect("built-in level");
        LevelRuntimeState::new(spec, players, PairingPolicy::default(), MatchRules::default()).expect("valid level")
    }

    #[test]
    fn test_script_segments_cover_tick_ranges() {
        let script = ScriptedInput::from_json(
            r#"[
                {"actor": 0, "from": 0, "to": 10, "input": {"move_right": true}},
                {"actor": 0, "from": 5, "to": 6, "input": {"fire": true}},
                {"actor": 1, "from": 3, "to": 4, "input": {"jump_or_use": true}}
            ]"#,
        )
        .expect("valid script");

        assert!(script.frame(0, 0).move_right);
        assert!(script.frame(0, 5).fire);
        assert!(!script.frame(0, 5).move_right);
        assert!(script.frame(0, 9).move_right);
        assert_eq!(script.frame(0, 10), InputFrame::default());
        assert!(script.frame(1, 3).jump_or_use);
        assert_eq!(script.frame(3, 3), InputFrame::default());
    }

    #[test]
    fn test_script_rejects_garbage() {
        assert!(ScriptedInput::from_json("{\"actor\": 0}").is_err());
    }

    #[test]
    fn test_bot_is_deterministic_per_seed() {
        let state = state(4);
        let mut first = BotInput::new(7);
        let mut second = BotInput::new(7);
        for _ in 0..100 {
            assert_eq!(first.frames(&state), second.frames(&state));
        }
    }

    #[test]
    fn test_bot_presses_are_edges() {
        let state = state(1);
        let mut bot = BotInput::new(42);
        let frames: Vec<InputFrame> = (0..500).flat_map(|_| bot.frames(&state)).collect();
        for pair in frames.windows(2) {
            assert!(!(pair[0].fire && pair[1].fire));
        }
        assert!(frames.iter().any(|frame| frame.move_left || frame.move_right));
    }
}
