//! Axis-aligned bodies and the closed set of body kinds
//!
//! Every entity in the live set is a [`Body`]: a top-left anchored box with a
//! velocity and a [`BodyKind`] carrying kind-specific state. Collision shape is
//! the box, except for [`BodyKind::Segment`] whose true shape is a line.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actors::{Collectible, CollectibleKind, Enemy, MovingPlatform};
use super::player::PlayerState;
use super::segment::{SegmentPlatform, StrokeOrigin};
use crate::consts::*;

/// Smallest extent a body may have on either axis
const MIN_EXTENT: f32 = 1e-3;

/// Gap below which a body counts as resting on the one beneath it
const CONTACT_EPSILON: f32 = 1e-2;

/// Stable handle into the body arena (slot index + generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId {
    pub index: u32,
    pub generation: u32,
}

impl BodyId {
    /// Placeholder carried by bodies that have not been inserted yet
    pub const DETACHED: BodyId = BodyId {
        index: u32::MAX,
        generation: 0,
    };
}

/// Closed-open rectangle `[left, right) × [top, bottom)` (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn from_rect(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            left: position.x,
            right: position.x + width,
            top: position.y,
            bottom: position.y + height,
        }
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    /// Inclusive point test, used for segment endpoints
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Same box grown downward by `amount`
    pub fn extend_down(&self, amount: f32) -> Self {
        Self {
            bottom: self.bottom + amount,
            ..*self
        }
    }

    /// The four edges in top, right, bottom, left order
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let tl = Vec2::new(self.left, self.top);
        let tr = Vec2::new(self.right, self.top);
        let br = Vec2::new(self.right, self.bottom);
        let bl = Vec2::new(self.left, self.bottom);
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }
}

/// Discriminator exposed to collaborators (rendering, game flow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Player,
    Wall,
    Spike,
    Platform,
    Door,
    Collectible,
    Enemy,
}

/// Kind-specific state of a body
#[derive(Debug, Clone)]
pub enum BodyKind {
    Player(PlayerState),
    Wall,
    Spike,
    /// Line platform, either drawn in ink or authored by the level
    Segment(SegmentPlatform),
    /// Rectangular platform sliding back and forth horizontally
    Moving(MovingPlatform),
    /// Level exit; overlap is checked by the terminal step, not the collision pass
    Door,
    Collectible(Collectible),
    Enemy(Enemy),
}

impl BodyKind {
    pub fn tag(&self) -> Tag {
        match self {
            BodyKind::Player(_) => Tag::Player,
            BodyKind::Wall => Tag::Wall,
            BodyKind::Spike => Tag::Spike,
            BodyKind::Segment(_) | BodyKind::Moving(_) => Tag::Platform,
            BodyKind::Door => Tag::Door,
            BodyKind::Collectible(_) => Tag::Collectible,
            BodyKind::Enemy(_) => Tag::Enemy,
        }
    }
}

/// An entity in the live set
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    /// Top-left corner
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    pub solid: bool,
    pub kind: BodyKind,
}

impl Body {
    pub fn new(kind: BodyKind, position: Vec2, width: f32, height: f32) -> Self {
        let solid = !matches!(kind, BodyKind::Door);
        Self {
            id: BodyId::DETACHED,
            position,
            velocity: Vec2::ZERO,
            width: width.max(MIN_EXTENT),
            height: height.max(MIN_EXTENT),
            active: true,
            solid,
            kind,
        }
    }

    pub fn player(spawn: Vec2, width: f32, height: f32) -> Self {
        Self::new(BodyKind::Player(PlayerState::new(spawn)), spawn, width, height)
    }

    pub fn wall(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(BodyKind::Wall, Vec2::new(x, y), width, height)
    }

    pub fn spike(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(BodyKind::Spike, Vec2::new(x, y), width, height)
    }

    pub fn door(x: f32, y: f32) -> Self {
        Self::new(BodyKind::Door, Vec2::new(x, y), DOOR_WIDTH, DOOR_HEIGHT)
    }

    /// Segment platform; the box is the stroke's padded bounds
    pub fn segment(start: Vec2, end: Vec2, thickness: f32, origin: StrokeOrigin) -> Self {
        let segment = SegmentPlatform::new(start, end, thickness, origin);
        let bounds = segment.padded_bounds();
        Self::new(
            BodyKind::Segment(segment),
            Vec2::new(bounds.left, bounds.top),
            bounds.width(),
            bounds.height(),
        )
    }

    pub fn moving(x: f32, y: f32, width: f32, height: f32, speed: f32, travel: f32) -> Self {
        Self::new(
            BodyKind::Moving(MovingPlatform::new(x, speed, travel)),
            Vec2::new(x, y),
            width,
            height,
        )
    }

    pub fn collectible(x: f32, y: f32, kind: CollectibleKind, phase: f32) -> Self {
        Self::new(
            BodyKind::Collectible(Collectible::new(kind, y, phase)),
            Vec2::new(x, y),
            COLLECTIBLE_SIZE,
            COLLECTIBLE_SIZE,
        )
    }

    pub fn enemy(x: f32, y: f32, enemy: Enemy) -> Self {
        Self::new(
            BodyKind::Enemy(enemy),
            Vec2::new(x, y),
            ENEMY_SIZE,
            ENEMY_SIZE,
        )
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.kind.tag()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.position, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) * 0.5
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - Vec2::new(self.width, self.height) * 0.5;
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }

    pub fn as_segment(&self) -> Option<&SegmentPlatform> {
        match &self.kind {
            BodyKind::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            BodyKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Ink stroke drawn by the player (as opposed to level geometry)
    pub fn is_drawn_platform(&self) -> bool {
        matches!(&self.kind, BodyKind::Segment(s) if s.origin == StrokeOrigin::Drawn)
    }

    /// Broad phase only
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.active && other.active && self.bounds().overlaps(&other.bounds())
    }

    /// Broad phase, then exact segment test when either side is a segment
    pub fn collides_with(&self, other: &Body) -> bool {
        if !self.overlaps(other) {
            return false;
        }
        match (self.as_segment(), other.as_segment()) {
            (Some(a), Some(b)) => a.intersects_segment(b),
            (Some(segment), None) => segment.intersects_rect(&other.bounds()),
            (None, Some(segment)) => segment.intersects_rect(&self.bounds()),
            (None, None) => true,
        }
    }

    /// Bottom edge sits on `support`'s top edge with horizontal overlap
    ///
    /// Touching edges are not an overlap, so a body standing exactly on a
    /// box is only seen through this test. Segments never support by box.
    pub fn rests_on(&self, support: &Body) -> bool {
        if !self.active || !support.active || support.as_segment().is_some() {
            return false;
        }
        let (a, b) = (self.bounds(), support.bounds());
        a.left < b.right && a.right > b.left && (a.bottom - b.top).abs() <= CONTACT_EPSILON
    }

    /// Overlapping shapes, or one resting on the other
    pub fn in_contact(&self, other: &Body) -> bool {
        self.collides_with(other) || self.rests_on(other) || other.rests_on(self)
    }

    /// Mark for eviction at the start of the next step
    pub fn destroy(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}
