//! Collision detection and response between bodies
//!
//! Detection is a pairwise sweep over the active solids: AABB prefilter, then
//! the exact segment test when a line platform is involved. Response is a pure
//! function of the two bodies, [`resolve_collision`], returning a
//! [`BodyDelta`] for each side; the engine applies both before moving on to
//! the next pair.

use glam::Vec2;

use super::arena::BodyArena;
use super::body::{Body, BodyId, BodyKind, Bounds, Tag};
use super::state::GameEvent;
use crate::consts::ENEMY_SEPARATION;

/// Change to apply to one body as the outcome of a contact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyDelta {
    pub set_x: Option<f32>,
    pub set_y: Option<f32>,
    pub set_vx: Option<f32>,
    pub set_vy: Option<f32>,
    /// Added after the `set_*` fields
    pub translate: Vec2,
    /// Player only: standing on something this tick
    pub grounded: bool,
    /// Player only: back to the spawn point
    pub respawn: bool,
    pub destroy: bool,
    pub event: Option<GameEvent>,
}

impl BodyDelta {
    /// No effect
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, body: &mut Body, events: &mut Vec<GameEvent>) {
        if let Some(x) = self.set_x {
            body.position.x = x;
        }
        if let Some(y) = self.set_y {
            body.position.y = y;
        }
        if let Some(vx) = self.set_vx {
            body.velocity.x = vx;
        }
        if let Some(vy) = self.set_vy {
            body.velocity.y = vy;
        }
        body.position += self.translate;

        if let BodyKind::Player(state) = &mut body.kind {
            if self.grounded {
                state.land();
            }
            if self.respawn {
                body.position = state.respawn();
                body.velocity = Vec2::ZERO;
                events.push(GameEvent::Respawned);
            }
        }

        if self.destroy {
            body.destroy();
        }
        if let Some(event) = self.event {
            events.push(event);
        }
    }
}

/// Per-tick parameters of the response functions
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext {
    pub dt: f32,
    /// How far below a moving platform's top a rider may sink and still be carried
    pub carry_tolerance: f32,
}

/// Response of `this` to touching `other`: `(delta for this, delta for other)`
///
/// Called once in each direction for every colliding pair.
pub fn resolve_collision(
    this: &Body,
    other: &Body,
    ctx: &ResolveContext,
) -> (BodyDelta, BodyDelta) {
    let none = BodyDelta::none;
    match (&this.kind, other.tag()) {
        (BodyKind::Wall, Tag::Player) => (none(), push_out_of(this.bounds(), other)),
        (BodyKind::Spike, Tag::Player) => (
            none(),
            BodyDelta {
                respawn: true,
                ..none()
            },
        ),
        (BodyKind::Moving(_), Tag::Player) => (none(), carry(this, other, ctx)),
        (BodyKind::Collectible(item), Tag::Player) => (
            BodyDelta {
                destroy: true,
                event: Some(GameEvent::Collected {
                    kind: item.kind,
                    value: item.kind.value(),
                }),
                ..none()
            },
            none(),
        ),
        (BodyKind::Enemy(_), Tag::Enemy) => {
            let away = (this.position - other.position).normalize_or_zero();
            (
                BodyDelta {
                    translate: away * ENEMY_SEPARATION,
                    ..none()
                },
                none(),
            )
        }
        _ => (none(), none()),
    }
}

/// Push a body out of a solid box along the axis of least overlap
fn push_out_of(wall: Bounds, body: &Body) -> BodyDelta {
    let b = body.bounds();
    let from_left = b.right - wall.left;
    let from_right = wall.right - b.left;
    let from_top = b.bottom - wall.top;
    let from_bottom = wall.bottom - b.top;
    let min = from_left.min(from_right).min(from_top).min(from_bottom);

    if min == from_top {
        BodyDelta {
            set_y: Some(wall.top - body.height),
            set_vy: Some(0.0),
            grounded: true,
            ..BodyDelta::none()
        }
    } else if min == from_bottom {
        BodyDelta {
            set_y: Some(wall.bottom),
            set_vy: Some(0.0),
            ..BodyDelta::none()
        }
    } else if min == from_left {
        BodyDelta {
            set_x: Some(wall.left - body.width),
            set_vx: Some(0.0),
            ..BodyDelta::none()
        }
    } else {
        BodyDelta {
            set_x: Some(wall.right),
            set_vx: Some(0.0),
            ..BodyDelta::none()
        }
    }
}

/// Seat a falling rider on the platform and move it along for this tick
fn carry(platform: &Body, rider: &Body, ctx: &ResolveContext) -> BodyDelta {
    let top = platform.bounds().top;
    if rider.bottom() > top + ctx.carry_tolerance || rider.velocity.y < 0.0 {
        return BodyDelta::none();
    }
    BodyDelta {
        set_y: Some(top - rider.height),
        set_vy: Some(0.0),
        translate: Vec2::new(platform.velocity.x * ctx.dt, 0.0),
        grounded: true,
        ..BodyDelta::none()
    }
}

/// Pairwise collision pass over the live set
#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    /// Scratch list of active solids, reused between ticks
    solids: Vec<BodyId>,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every pair of active solids in contact, in live order
    ///
    /// Contact is overlap or one body resting on the other's top edge.
    /// Deltas are applied immediately, so later pairs see earlier
    /// corrections. A body deactivated by an earlier response is skipped for
    /// the rest of the pass. Returns the number of pairs in contact.
    pub fn run(
        &mut self,
        bodies: &mut BodyArena,
        ctx: &ResolveContext,
        events: &mut Vec<GameEvent>,
    ) -> usize {
        self.solids.clear();
        self.solids.extend(
            bodies
                .iter_active()
                .filter(|body| body.solid)
                .map(|body| body.id),
        );

        let mut contacts = 0;
        for i in 0..self.solids.len() {
            for j in (i + 1)..self.solids.len() {
                let (a, b) = (self.solids[i], self.solids[j]);
                let Some((first, second)) = bodies.pair_mut(a, b) else {
                    continue;
                };
                if !first.in_contact(second) {
                    continue;
                }
                contacts += 1;

                let (da, db) = resolve_collision(first, second, ctx);
                da.apply(first, events);
                db.apply(second, events);

                if first.active && second.active {
                    let (db, da) = resolve_collision(second, first, ctx);
                    db.apply(second, events);
                    da.apply(first, events);
                }
            }
        }
        contacts
    }

    /// Active solids whose collision shape touches `probe` and pass `filter`
    pub fn query(
        &self,
        bodies: &BodyArena,
        probe: &Bounds,
        filter: impl Fn(&Body) -> bool,
    ) -> Vec<BodyId> {
        bodies
            .iter_active()
            .filter(|body| body.solid && filter(body))
            .filter(|body| {
                if !body.bounds().overlaps(probe) {
                    return false;
                }
                match body.as_segment() {
                    Some(segment) => segment.intersects_rect(probe),
                    None => true,
                }
            })
            .map(|body| body.id)
            .collect()
    }
}
