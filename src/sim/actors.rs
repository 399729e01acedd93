//! Self-driven bodies: moving platforms, collectibles and enemies
//!
//! Each kind advances its own state once per tick through [`update_body`],
//! reading the rest of the world only through the [`SimulationContext`].

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind, Tag};
use super::tick::SimulationContext;
use crate::consts::*;

/// Horizontal shuttle between `origin_x ± travel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub origin_x: f32,
    /// Magnitude only; the sign lives in `direction`
    pub speed: f32,
    /// +1 right, -1 left
    pub direction: f32,
    pub travel: f32,
}

impl MovingPlatform {
    /// A negative `speed` starts the platform moving left
    pub fn new(origin_x: f32, speed: f32, travel: f32) -> Self {
        Self {
            origin_x,
            speed: speed.abs(),
            direction: if speed < 0.0 { -1.0 } else { 1.0 },
            travel,
        }
    }

    /// Turn around once the platform is at or past its travel limit and
    /// still heading away from the origin; returns the new horizontal velocity
    pub fn steer(&mut self, x: f32) -> f32 {
        let offset = x - self.origin_x;
        if offset.abs() >= self.travel && offset.signum() == self.direction {
            self.direction = -self.direction;
        }
        self.speed * self.direction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    Health,
    Score,
    Bonus,
    Power,
}

impl CollectibleKind {
    pub fn value(&self) -> u32 {
        match self {
            CollectibleKind::Health => 20,
            CollectibleKind::Score => 10,
            CollectibleKind::Bonus => 50,
            CollectibleKind::Power => 100,
        }
    }

    /// Unknown names fall back to a score item
    pub fn from_name(name: &str) -> Self {
        match name {
            "health" => CollectibleKind::Health,
            "bonus" => CollectibleKind::Bonus,
            "power" => CollectibleKind::Power,
            _ => CollectibleKind::Score,
        }
    }
}

/// Pickup bobbing around its authored height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub origin_y: f32,
    /// Bob phase (radians)
    pub phase: f32,
}

impl Collectible {
    pub fn new(kind: CollectibleKind, origin_y: f32, phase: f32) -> Self {
        Self {
            kind,
            origin_y,
            phase,
        }
    }

    /// Advance the bob; returns the new top edge
    pub fn bob(&mut self, dt: f32) -> f32 {
        self.phase += COLLECTIBLE_BOB_SPEED * dt;
        self.origin_y + self.phase.sin() * COLLECTIBLE_BOB_HEIGHT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyBehavior {
    /// Random heading, re-rolled every few seconds
    Wanderer,
    /// Heads for the player when close, wanders otherwise
    Chaser,
    /// Straight line, reflecting off the play-area edges
    Patrol,
}

impl EnemyBehavior {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wanderer" => Some(EnemyBehavior::Wanderer),
            "chaser" => Some(EnemyBehavior::Chaser),
            "patrol" => Some(EnemyBehavior::Patrol),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub behavior: EnemyBehavior,
    pub speed: f32,
    /// Unit heading
    pub direction: Vec2,
    /// Seconds since the last heading change
    pub turn_timer: f32,
}

impl Enemy {
    pub fn new(behavior: EnemyBehavior, speed: f32, direction: Vec2) -> Self {
        Self {
            behavior,
            speed,
            direction: unit_or_right(direction),
            turn_timer: 0.0,
        }
    }

    /// Random behavior, speed and heading
    pub fn random(rng: &mut Pcg32) -> Self {
        let behavior = match rng.random_range(0..3) {
            0 => EnemyBehavior::Wanderer,
            1 => EnemyBehavior::Chaser,
            _ => EnemyBehavior::Patrol,
        };
        Self::with_behavior(behavior, rng)
    }

    pub fn with_behavior(behavior: EnemyBehavior, rng: &mut Pcg32) -> Self {
        let speed = rng.random_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED);
        Self::new(behavior, speed, random_heading(rng))
    }

    fn wander(&mut self, dt: f32, rng: &mut Pcg32) -> Vec2 {
        self.turn_timer += dt;
        if self.turn_timer >= ENEMY_TURN_INTERVAL {
            self.turn_timer = 0.0;
            self.direction = random_heading(rng);
        }
        self.direction * self.speed
    }

    /// Desired velocity for this tick
    fn steer(&mut self, center: Vec2, target: Option<Vec2>, dt: f32, rng: &mut Pcg32) -> Vec2 {
        match self.behavior {
            EnemyBehavior::Wanderer => self.wander(dt, rng),
            EnemyBehavior::Chaser => match target {
                Some(target) if center.distance(target) < ENEMY_DETECTION_RADIUS => {
                    (target - center).normalize_or_zero() * self.speed
                }
                _ => self.wander(dt, rng),
            },
            EnemyBehavior::Patrol => self.direction * self.speed,
        }
    }
}

fn random_heading(rng: &mut Pcg32) -> Vec2 {
    let v = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
    unit_or_right(v)
}

fn unit_or_right(v: Vec2) -> Vec2 {
    let n = v.normalize_or_zero();
    if n == Vec2::ZERO { Vec2::X } else { n }
}

/// Advance one body by `ctx.dt`: kind behavior, integration, then any
/// post-move constraint
///
/// The body being updated is detached from `ctx.bodies`.
pub fn update_body(body: &mut Body, ctx: &SimulationContext, rng: &mut Pcg32) {
    let dt = ctx.dt;
    let center = body.center();
    match &mut body.kind {
        BodyKind::Moving(platform) => {
            body.velocity.x = platform.steer(body.position.x);
        }
        BodyKind::Collectible(item) => {
            body.position.y = item.bob(dt);
        }
        BodyKind::Enemy(enemy) => {
            let target = ctx.bodies.find_tag(Tag::Player).map(Body::center);
            body.velocity = enemy.steer(center, target, dt, rng);
        }
        BodyKind::Player(_)
        | BodyKind::Wall
        | BodyKind::Spike
        | BodyKind::Segment(_)
        | BodyKind::Door => {}
    }

    body.integrate(dt);

    if matches!(body.kind, BodyKind::Enemy(_)) {
        bounce_in_bounds(body, ctx);
    }
}

/// Clamp an enemy inside the play area, reflecting its heading off any edge
/// it reached
fn bounce_in_bounds(body: &mut Body, ctx: &SimulationContext) {
    let area = ctx.bounds;
    let max_x = (area.right - body.width).max(area.left);
    let max_y = (area.bottom - body.height).max(area.top);
    let BodyKind::Enemy(enemy) = &mut body.kind else {
        return;
    };

    if body.position.x <= area.left {
        body.position.x = area.left;
        enemy.direction.x = enemy.direction.x.abs();
        body.velocity.x = body.velocity.x.abs();
    } else if body.position.x >= max_x {
        body.position.x = max_x;
        enemy.direction.x = -enemy.direction.x.abs();
        body.velocity.x = -body.velocity.x.abs();
    }

    if body.position.y <= area.top {
        body.position.y = area.top;
        enemy.direction.y = enemy.direction.y.abs();
        body.velocity.y = body.velocity.y.abs();
    } else if body.position.y >= max_y {
        body.position.y = max_y;
        enemy.direction.y = -enemy.direction.y.abs();
        body.velocity.y = -body.velocity.y.abs();
    }
}
