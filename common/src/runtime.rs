use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use tracing::{debug, info};

use crate::{
    actors::{Actor, Cargo, rising, throw_direction},
    collision::{bodies::move_horizontal, helpers::overlaps},
    constants::*,
    error::LevelError,
    levels::{ButtonTrigger, LevelSpec},
    portals::{Mount, PairingPolicy, Portal, PortalNetwork, WarpResult},
    projectiles::{Projectile, ProjectileOutcome},
    protocol::{ActorId, Aim, BoxView, InputFrame, LevelSnapshot, SurfaceView, Team},
    scoring::{MatchProgress, MatchResult, MatchRules},
    surfaces::SurfaceRegistry,
};

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef {
    Actor(ActorId),
    Cargo,
}

// Things that happened during one tick, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum LevelEvent {
    ProjectileFired { owner: ActorId },
    // Shot expired or hit a surface that cannot hold a portal
    ShotFizzled { owner: ActorId },
    PortalPlaced { owner: ActorId, center: Vec2, mount: Mount },
    PortalClosed { owner: ActorId },
    Warped { body: BodyRef, entry: ActorId, exit: ActorId },
    CargoPicked { by: ActorId },
    CargoThrown { by: ActorId },
    ButtonChanged { pressed: bool },
    ActorFinished { actor: ActorId },
    TeamWon { team: Team },
}

// ============================================================================
// Level Runtime State
// ============================================================================

// Everything that changes while a level is played. Built from an immutable `LevelSpec`
// and reset back to it.
#[derive(Resource, Debug, Clone)]
pub struct LevelRuntimeState {
    spec: LevelSpec,
    players: usize,
    pub surfaces: SurfaceRegistry,
    pub actors: Vec<Actor>,
    pub cargo: Option<Cargo>,
    pub projectiles: Vec<Projectile>,
    pub portals: PortalNetwork,
    pub button_pressed: bool,
    pub progress: MatchProgress,
    pub tick: u64,
}

impl LevelRuntimeState {
    pub fn new(spec: LevelSpec, players: usize, policy: PairingPolicy, rules: MatchRules) -> Result<Self, LevelError> {
        spec.validate(players)?;

        let mut state = Self {
            surfaces: spec.surface_registry(),
            actors: Vec::new(),
            cargo: None,
            projectiles: Vec::new(),
            portals: PortalNetwork::new(policy),
            button_pressed: false,
            progress: MatchProgress::new(players, rules),
            tick: 0,
            spec,
            players,
        };
        state.spawn_bodies();
        info!(level = %state.spec.name, players, "level loaded");
        Ok(state)
    }

    fn spawn_bodies(&mut self) {
        self.actors = self
            .spec
            .spawns
            .iter()
            .take(self.players)
            .enumerate()
            .map(|(id, spawn)| {
                let mut actor = Actor::new(ActorId(id), spawn.to_vec2());
                let filter = actor.filter();
                actor.body.settle(&self.surfaces, filter);
                actor
            })
            .collect();

        self.cargo = self.spec.cargo.map(|spawn| {
            let mut cargo = Cargo::new(spawn.to_vec2());
            let filter = cargo.filter();
            cargo.body.settle(&self.surfaces, filter);
            cargo
        });
    }

    // Back to the state right after loading: bodies respawn, portals and shots vanish,
    // scores clear.
    pub fn reset(&mut self) {
        let rules = self.progress.rules;
        let policy = self.portals.policy;
        self.surfaces = self.spec.surface_registry();
        self.projectiles.clear();
        self.portals = PortalNetwork::new(policy);
        self.button_pressed = false;
        self.progress = MatchProgress::new(self.players, rules);
        self.tick = 0;
        self.spawn_bodies();
        info!(level = %self.spec.name, "level reset");
    }

    #[must_use]
    pub const fn spec(&self) -> &LevelSpec {
        &self.spec
    }

    #[must_use]
    pub const fn players(&self) -> usize {
        self.players
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.progress.is_over(self.tick)
    }

    #[must_use]
    pub const fn door_open(&self) -> bool {
        self.spec.button.is_none() || self.button_pressed
    }

    // Advance the level by one fixed tick. Missing input frames count as idle.
    pub fn tick(&mut self, inputs: &[InputFrame]) -> Vec<LevelEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }

        let frames: Vec<InputFrame> = (0..self.actors.len())
            .map(|index| inputs.get(index).copied().unwrap_or_default())
            .collect();

        for (index, input) in frames.iter().enumerate() {
            self.apply_input(index, *input, &mut events);
        }

        for (actor, input) in self.actors.iter_mut().zip(&frames) {
            if actor.finished {
                continue;
            }
            let filter = actor.filter();
            actor.body.step(input.horizontal(), &self.surfaces, filter);
        }

        self.step_cargo();
        self.step_projectiles(&mut events);
        self.resolve_warps(&mut events);
        self.clamp_bodies();
        self.update_button(&mut events);
        self.check_exits(&mut events);

        self.tick += 1;
        events
    }

    // ========================================================================
    // Tick Phases
    // ========================================================================

    // Aim and facing, then use (pick up or jump), then fire (shoot or throw).
    fn apply_input(&mut self, index: usize, input: InputFrame, events: &mut Vec<LevelEvent>) {
        let Some(actor) = self.actors.get_mut(index) else {
            return;
        };
        if actor.finished {
            return;
        }
        let last = actor.last_input;
        actor.last_input = input;
        actor.shoot_cooldown = actor.shoot_cooldown.saturating_sub(1);

        if let Some(dir) = input.horizontal() {
            actor.body.facing = dir;
        }
        actor.aim = Aim {
            facing: actor.body.facing,
            elevation: input.elevation(),
        };

        if rising(input.jump_or_use, last.jump_or_use) {
            let bounds = actor.body.bounds();
            let reachable = self
                .cargo
                .as_mut()
                .filter(|cargo| cargo.is_free() && !actor.carrying && overlaps(&bounds, &cargo.body.bounds()));
            if let Some(cargo) = reachable {
                cargo.held_by = Some(actor.id);
                cargo.pin_above(&actor.body);
                actor.carrying = true;
                debug!(actor = actor.id.0, "cargo picked up");
                events.push(LevelEvent::CargoPicked { by: actor.id });
            } else {
                actor.body.start_jump();
            }
        }

        if !input.fire {
            return;
        }

        if actor.carrying {
            if rising(input.fire, last.fire) {
                let velocity = throw_direction(&input, actor.body.facing) * THROW_SPEED;
                if let Some(cargo) = self.cargo.as_mut().filter(|cargo| cargo.held_by == Some(actor.id)) {
                    cargo.release(velocity);
                }
                actor.carrying = false;
                actor.shoot_cooldown = SHOOT_COOLDOWN_TICKS;
                debug!(actor = actor.id.0, "cargo thrown");
                events.push(LevelEvent::CargoThrown { by: actor.id });
            }
        } else if actor.shoot_cooldown == 0 {
            if let Some(closed) = self.portals.arm(actor.id) {
                events.push(LevelEvent::PortalClosed { owner: closed.owner });
            }
            self.projectiles.push(Projectile::fire(actor.id, actor.body.center(), actor.aim));
            actor.shoot_cooldown = SHOOT_COOLDOWN_TICKS;
            events.push(LevelEvent::ProjectileFired { owner: actor.id });
        }
    }

    fn step_cargo(&mut self) {
        let Some(cargo) = self.cargo.as_mut() else {
            return;
        };

        if let Some(holder) = cargo.held_by {
            match self.actors.get(holder.0) {
                Some(actor) => cargo.pin_above(&actor.body),
                None => cargo.held_by = None,
            }
            return;
        }

        let filter = cargo.filter();
        cargo.body.step(None, &self.surfaces, filter);

        // Walking into the free cube shoves it sideways
        for actor in self.actors.iter().filter(|actor| !actor.finished && !actor.carrying) {
            if !overlaps(&actor.body.bounds(), &cargo.body.bounds()) {
                continue;
            }
            let away = if cargo.body.center().x >= actor.body.center().x { 1.0 } else { -1.0 };
            let size = cargo.body.size;
            move_horizontal(&mut cargo.body.pos, size, away * CARGO_PUSH_SPEED, &self.surfaces, filter);
        }
    }

    fn step_projectiles(&mut self, events: &mut Vec<LevelEvent>) {
        let mut hits = Vec::new();
        let mut fizzled = Vec::new();

        self.projectiles.retain_mut(|shot| match shot.step(&self.surfaces) {
            ProjectileOutcome::Flying => true,
            ProjectileOutcome::Hit { surface, contact } => {
                hits.push((shot.owner, surface, contact));
                false
            }
            ProjectileOutcome::Blocked { .. } | ProjectileOutcome::Expired => {
                fizzled.push(shot.owner);
                false
            }
        });

        for owner in fizzled {
            self.portals.disarm(owner);
            events.push(LevelEvent::ShotFizzled { owner });
        }

        for (owner, index, contact) in hits {
            let Some(surface) = self.surfaces.get(index) else {
                self.portals.disarm(owner);
                continue;
            };
            match self.portals.spawn_portal(contact, surface, owner, owner.team()) {
                Some(spawn) => {
                    for closed in &spawn.evicted {
                        events.push(LevelEvent::PortalClosed { owner: closed.owner });
                    }
                    events.push(LevelEvent::PortalPlaced {
                        owner,
                        center: spawn.portal.center,
                        mount: spawn.portal.mount,
                    });
                }
                None => self.portals.disarm(owner),
            }
        }
    }

    // Actors first, then free cargo, against every live portal
    fn resolve_warps(&mut self, events: &mut Vec<LevelEvent>) {
        if self.portals.live_count() < 2 {
            return;
        }

        for actor in self.actors.iter_mut().filter(|actor| !actor.finished) {
            if let WarpResult::Warped { entry, exit } = self.portals.resolve_warp(&mut actor.body) {
                debug!(actor = actor.id.0, from = entry.owner.0, to = exit.owner.0, "actor warped");
                events.push(LevelEvent::Warped {
                    body: BodyRef::Actor(actor.id),
                    entry: entry.owner,
                    exit: exit.owner,
                });
            }
        }

        if let Some(cargo) = self.cargo.as_mut().filter(|cargo| cargo.is_free())
            && let WarpResult::Warped { entry, exit } = self.portals.resolve_warp(&mut cargo.body)
        {
            debug!(from = entry.owner.0, to = exit.owner.0, "cargo warped");
            events.push(LevelEvent::Warped {
                body: BodyRef::Cargo,
                entry: entry.owner,
                exit: exit.owner,
            });
        }
    }

    fn clamp_bodies(&mut self) {
        for actor in &mut self.actors {
            actor.body.clamp_to_world();
        }
        if let Some(cargo) = self.cargo.as_mut() {
            // A carrier may have warped this tick
            if let Some(holder) = cargo.held_by
                && let Some(actor) = self.actors.get(holder.0)
            {
                cargo.pin_above(&actor.body);
            }
            cargo.body.clamp_to_world();
        }
    }

    fn update_button(&mut self, events: &mut Vec<LevelEvent>) {
        let Some(button) = self.spec.button else {
            return;
        };
        let rect = button.bounds();
        let by_cargo = self
            .cargo
            .as_ref()
            .is_some_and(|cargo| overlaps(&rect, &cargo.body.bounds()));
        let by_actor = self
            .actors
            .iter()
            .any(|actor| !actor.finished && overlaps(&rect, &actor.body.bounds()));

        let pressed = match button.trigger {
            ButtonTrigger::Any => by_cargo || by_actor,
            ButtonTrigger::CargoOnly => by_cargo,
            ButtonTrigger::ActorOnly => by_actor,
        };
        if pressed != self.button_pressed {
            self.button_pressed = pressed;
            debug!(pressed, "button changed");
            events.push(LevelEvent::ButtonChanged { pressed });
        }
    }

    fn check_exits(&mut self, events: &mut Vec<LevelEvent>) {
        if !self.door_open() {
            return;
        }
        let door = self.spec.door.bounds();

        for actor in &mut self.actors {
            if actor.finished || !overlaps(&door, &actor.body.bounds()) {
                continue;
            }
            actor.finished = true;
            if actor.carrying {
                actor.carrying = false;
                if let Some(cargo) = self.cargo.as_mut().filter(|cargo| cargo.held_by == Some(actor.id)) {
                    cargo.release(Vec2::ZERO);
                }
            }
            info!(actor = actor.id.0, tick = self.tick, "actor reached the exit");
            events.push(LevelEvent::ActorFinished { actor: actor.id });

            if let Some(team) = self.progress.record_finish(actor.id, self.tick) {
                events.push(LevelEvent::TeamWon { team });
            }
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    // Read-only view of the current state for a renderer
    #[must_use]
    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            tick: self.tick,
            actors: self.actors.iter().map(Actor::view).collect(),
            cargo: self.cargo.as_ref().map(Cargo::view),
            portals: self.portals.portals().map(Portal::view).collect(),
            projectiles: self.projectiles.iter().map(Projectile::view).collect(),
            surfaces: self
                .surfaces
                .iter()
                .map(|surface| SurfaceView {
                    bounds: BoxView {
                        x: surface.bounds.min.x,
                        y: surface.bounds.min.y,
                        w: surface.bounds.width(),
                        h: surface.bounds.height(),
                    },
                    portal_eligible: surface.portal_eligible,
                    active: surface.active,
                })
                .collect(),
            button_pressed: self.spec.button.map(|_| self.button_pressed),
            door_open: self.door_open(),
        }
    }

    #[must_use]
    pub fn result(&self, mode: &str) -> MatchResult {
        self.progress.result(mode, &self.spec.name, self.tick)
    }
}
