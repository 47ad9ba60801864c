use bevy_math::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    bodies::{Body, clamp_to_world},
    collision::helpers::{overlaps, touches_point},
    constants::*,
    protocol::{ActorId, PortalView, Team},
    surfaces::Surface,
};

// How far a reported hit point may sit off its surface before placement is refused
const PLACEMENT_TOLERANCE: f32 = 0.5;

// ============================================================================
// Mount
// ============================================================================

// Which edge of a surface a portal sits on. Named after the side of the room the
// portal would be on, so a `RightWall` portal hangs on a surface's left edge and
// opens toward -x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mount {
    RightWall,
    Floor,
    LeftWall,
    Ceiling,
}

impl Mount {
    // Orientation angle in degrees
    #[must_use]
    pub const fn angle(self) -> u16 {
        match self {
            Self::RightWall => 0,
            Self::Floor => 90,
            Self::LeftWall => 180,
            Self::Ceiling => 270,
        }
    }

    // Unit vector pointing out of the portal, away from its surface (y down)
    #[must_use]
    pub const fn normal(self) -> Vec2 {
        match self {
            Self::RightWall => Vec2::NEG_X,
            Self::Floor => Vec2::NEG_Y,
            Self::LeftWall => Vec2::X,
            Self::Ceiling => Vec2::Y,
        }
    }

    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::RightWall | Self::LeftWall)
    }

    // Portal footprint: long side along the surface, thickness along the normal
    #[must_use]
    pub const fn extent(self) -> Vec2 {
        if self.is_wall() {
            Vec2::new(PORTAL_THICKNESS, PORTAL_SPAN)
        } else {
            Vec2::new(PORTAL_SPAN, PORTAL_THICKNESS)
        }
    }

    #[must_use]
    pub const fn min_push(self) -> f32 {
        if self.is_wall() {
            WARP_MIN_PUSH_HORIZONTAL
        } else {
            WARP_MIN_PUSH_VERTICAL
        }
    }
}

// ============================================================================
// Portal
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub owner: ActorId,
    pub team: Team,
    pub center: Vec2,
    pub mount: Mount,
}

impl Portal {
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, self.mount.extent())
    }

    #[must_use]
    pub const fn view(&self) -> PortalView {
        PortalView {
            owner: self.owner,
            center_x: self.center.x,
            center_y: self.center.y,
            angle: self.mount.angle(),
        }
    }
}

// Pick the mount and centre for a portal whose projectile reached `surface` at
// `hit_point`. The nearest edge wins, ties resolved top, bottom, left, right. The centre
// sits half a thickness outside that edge and keeps the hit point's coordinate along it.
#[must_use]
pub fn place_portal(hit_point: Vec2, surface: &Surface) -> Option<(Vec2, Mount)> {
    let rect = surface.bounds;
    if !touches_point(&rect, hit_point, PLACEMENT_TOLERANCE) {
        warn!(?hit_point, ?rect, "portal hit point is not on its surface, no portal placed");
        return None;
    }

    let half = PORTAL_THICKNESS / 2.0;
    let candidates = [
        ((hit_point.y - rect.min.y).abs(), Mount::Floor),
        ((rect.max.y - hit_point.y).abs(), Mount::Ceiling),
        ((hit_point.x - rect.min.x).abs(), Mount::RightWall),
        ((rect.max.x - hit_point.x).abs(), Mount::LeftWall),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }

    let mount = best.1;
    let center = match mount {
        Mount::Floor => Vec2::new(hit_point.x, rect.min.y - half),
        Mount::Ceiling => Vec2::new(hit_point.x, rect.max.y + half),
        Mount::RightWall => Vec2::new(rect.min.x - half, hit_point.y),
        Mount::LeftWall => Vec2::new(rect.max.x + half, hit_point.y),
    };

    Some((center, mount))
}

// ============================================================================
// Portal Network
// ============================================================================

// Which portals may serve as the exit for a given entry portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    // All live portals form one network
    #[default]
    Universal,
    // Only portals fired by the entry portal's team
    SameTeam,
}

// Per-actor portal gun state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PortalSlot {
    #[default]
    Empty,
    // A shot is in flight and the previous portal (if any) is gone
    Armed,
    Placed(Portal),
}

impl PortalSlot {
    #[must_use]
    pub const fn portal(&self) -> Option<&Portal> {
        match self {
            Self::Placed(portal) => Some(portal),
            _ => None,
        }
    }
}

// Result of a successful spawn
#[derive(Debug, Clone, PartialEq)]
pub struct PortalSpawn {
    pub portal: Portal,
    pub evicted: Vec<Portal>,
}

#[derive(Debug, Clone, Default)]
pub struct PortalNetwork {
    slots: [PortalSlot; MAX_ACTORS],
    pub policy: PairingPolicy,
}

impl PortalNetwork {
    #[must_use]
    pub const fn new(policy: PairingPolicy) -> Self {
        Self {
            slots: [PortalSlot::Empty; MAX_ACTORS],
            policy,
        }
    }

    #[must_use]
    pub fn slot(&self, owner: ActorId) -> PortalSlot {
        self.slots.get(owner.0).copied().unwrap_or_default()
    }

    // Live portals in owner order
    pub fn portals(&self) -> impl Iterator<Item = &Portal> {
        self.slots.iter().filter_map(PortalSlot::portal)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.portals().count()
    }

    // The owner fired: the old portal closes and the slot waits for the shot to land.
    // Returns the closed portal.
    pub fn arm(&mut self, owner: ActorId) -> Option<Portal> {
        let slot = self.slots.get_mut(owner.0)?;
        let previous = slot.portal().copied();
        *slot = PortalSlot::Armed;
        previous
    }

    // The shot expired or was blocked. A portal placed by an earlier shot stays.
    pub fn disarm(&mut self, owner: ActorId) {
        if let Some(slot) = self.slots.get_mut(owner.0)
            && *slot == PortalSlot::Armed
        {
            *slot = PortalSlot::Empty;
        }
    }

    // Open a portal where `owner`'s shot reached `surface`. Any portal, of any owner,
    // whose centre is closer than the replacement radius is closed first.
    pub fn spawn_portal(&mut self, hit_point: Vec2, surface: &Surface, owner: ActorId, team: Team) -> Option<PortalSpawn> {
        if owner.0 >= MAX_ACTORS {
            warn!(?owner, "portal owner out of range");
            return None;
        }
        let (center, mount) = place_portal(hit_point, surface)?;

        let mut evicted = Vec::new();
        for slot in &mut self.slots {
            if let PortalSlot::Placed(existing) = *slot
                && existing.center.distance(center) < PORTAL_REPLACE_RADIUS
            {
                debug!(owner = existing.owner.0, "portal replaced by a nearby shot");
                evicted.push(existing);
                *slot = PortalSlot::Empty;
            }
        }

        let portal = Portal { owner, team, center, mount };
        if let Some(previous) = self.slots[owner.0].portal()
            && !evicted.contains(previous)
        {
            evicted.push(*previous);
        }
        self.slots[owner.0] = PortalSlot::Placed(portal);
        debug!(owner = owner.0, x = center.x, y = center.y, angle = mount.angle(), "portal placed");

        Some(PortalSpawn { portal, evicted })
    }

    pub fn clear(&mut self) {
        self.slots = [PortalSlot::Empty; MAX_ACTORS];
    }

    #[must_use]
    pub fn resolve_warp(&self, body: &mut Body) -> WarpResult {
        let live: Vec<Portal> = self.portals().copied().collect();
        resolve_warp(body, &live, self.policy)
    }
}

// ============================================================================
// Warp
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WarpResult {
    // Fewer than two live portals; the body is left untouched
    Inactive,
    // Not touching any portal; cooldown cleared
    Clear,
    // Touching a portal while the cooldown runs down
    CoolingDown,
    // Touching more than one portal at once
    Ambiguous,
    // Touching a portal with no partner under the pairing policy
    NoExit,
    Warped { entry: Portal, exit: Portal },
}

// Teleport `body` if it touches exactly one live portal and is not cooling down. The
// exit is the first other portal the pairing policy admits.
pub fn resolve_warp(body: &mut Body, portals: &[Portal], policy: PairingPolicy) -> WarpResult {
    if portals.len() < 2 {
        trace!(live = portals.len(), "fewer than two portals, warp inactive");
        return WarpResult::Inactive;
    }

    let bounds = body.bounds();
    let mut touching = portals.iter().filter(|portal| overlaps(&bounds, &portal.bounds()));
    let Some(entry) = touching.next().copied() else {
        body.warp_cooldown = 0;
        return WarpResult::Clear;
    };

    if body.warp_cooldown > 0 {
        body.warp_cooldown -= 1;
        return WarpResult::CoolingDown;
    }

    if touching.next().is_some() {
        debug!("body touches several portals, no warp");
        return WarpResult::Ambiguous;
    }

    let exit = portals.iter().find(|portal| {
        **portal != entry
            && match policy {
                PairingPolicy::Universal => true,
                PairingPolicy::SameTeam => portal.team == entry.team,
            }
    });
    let Some(exit) = exit.copied() else {
        return WarpResult::NoExit;
    };

    warp_through(body, &exit);
    WarpResult::Warped { entry, exit }
}

// Place the body outside `exit` and send it along the exit normal. The entry portal
// plays no part: the speed (boosted, floored at the exit's minimum push) is redirected
// along the exit normal, so wall exits drop any vertical velocity.
fn warp_through(body: &mut Body, exit: &Portal) {
    let speed = body.vel.length();
    let boosted = if speed > WARP_SPEED_EPSILON {
        speed * WARP_MOMENTUM_BOOST
    } else {
        0.0
    };
    body.vel = exit.mount.normal() * boosted.max(exit.mount.min_push());

    let rect = exit.bounds();
    let center = rect.center();
    let size = body.size;
    let pos = match exit.mount {
        Mount::RightWall => Vec2::new(rect.min.x - size.x - WARP_CLEARANCE, center.y - size.y / 2.0),
        Mount::LeftWall => Vec2::new(rect.max.x + WARP_CLEARANCE, center.y - size.y / 2.0),
        Mount::Floor => Vec2::new(center.x - size.x / 2.0, rect.min.y - size.y - WARP_CLEARANCE),
        Mount::Ceiling => Vec2::new(center.x - size.x / 2.0, rect.max.y + WARP_CLEARANCE),
    };
    body.pos = clamp_to_world(pos, size);

    body.jumping = false;
    body.jump_counter = 0.0;
    body.grounded = false;
    body.can_jump = exit.mount == Mount::Ceiling;
    body.warp_cooldown = WARP_COOLDOWN_TICKS;
}
