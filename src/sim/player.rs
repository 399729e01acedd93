//! Player movement and platform snapping
//!
//! `drive` turns input into velocity before integration; `resolve_landing`
//! runs after integration and decides whether the player is standing on a
//! platform this tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::BodyArena;
use super::body::{Body, BodyId, BodyKind, Tag};
use super::collision::CollisionEngine;
use super::input::{InputState, Key};
use crate::tuning::{PlayerTuning, SnapTieBreak};

/// Per-player state carried inside the body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Recomputed every tick
    pub grounded: bool,
    /// One-shot jump latch, re-armed on landing
    pub can_jump: bool,
    pub facing_right: bool,
    pub spawn: Vec2,
}

impl PlayerState {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            grounded: false,
            can_jump: true,
            facing_right: true,
            spawn,
        }
    }

    pub fn land(&mut self) {
        self.grounded = true;
        self.can_jump = true;
    }

    /// Reset to a fresh airborne state at the spawn point
    pub fn respawn(&mut self) -> Vec2 {
        self.grounded = false;
        self.can_jump = true;
        self.spawn
    }
}

/// A platform able to catch the player this tick
#[derive(Debug, Clone, Copy, PartialEq)]
struct SnapCandidate {
    platform: BodyId,
    new_y: f32,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    pub tuning: PlayerTuning,
}

impl PlayerController {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self { tuning }
    }

    /// Horizontal speed, jump and gravity for one tick
    ///
    /// Gravity uses the grounded flag left by the previous tick.
    pub fn drive(&self, body: &mut Body, input: &InputState, dt: f32) {
        let BodyKind::Player(state) = &mut body.kind else {
            return;
        };

        let axis = input.horizontal_axis();
        body.velocity.x = axis * self.tuning.speed;
        if axis > 0.0 {
            state.facing_right = true;
        } else if axis < 0.0 {
            state.facing_right = false;
        }

        if input.is_just_pressed(Key::Jump) && state.can_jump {
            body.velocity.y = -self.tuning.jump_force;
            state.grounded = false;
            state.can_jump = false;
            log::debug!("Jump");
        }

        if !state.grounded {
            body.velocity.y = (body.velocity.y + self.tuning.gravity * dt)
                .min(self.tuning.max_fall_speed);
        }
    }

    /// Snap the player onto the platform that catches it, if any
    ///
    /// Candidates come from a probe that extends the player's box downward by
    /// the landing tolerance. A candidate qualifies when the player is not
    /// rising and its bottom edge is no deeper than the tolerance below the
    /// contact point: the closest point on a line, or the top edge of a box.
    /// Returns the platform landed on.
    pub fn resolve_landing(
        &self,
        player: BodyId,
        bodies: &mut BodyArena,
        engine: &CollisionEngine,
        play_width: f32,
    ) -> Option<BodyId> {
        let body = bodies.get_mut(player)?;
        let BodyKind::Player(state) = &mut body.kind else {
            return None;
        };
        state.grounded = false;
        if !body.active || body.velocity.y < 0.0 {
            return None;
        }

        let body = bodies.get(player)?;
        let probe = body.bounds().extend_down(self.tuning.landing_tolerance);
        let center = body.center();
        let bottom = body.bottom();
        let height = body.height;

        let mut chosen: Option<SnapCandidate> = None;
        for id in engine.query(bodies, &probe, |b| b.tag() == Tag::Platform) {
            let Some(platform) = bodies.get(id) else {
                continue;
            };
            let contact = match &platform.kind {
                BodyKind::Segment(segment) => segment.closest_point(center),
                _ => Vec2::new(platform.center().x, platform.bounds().top),
            };
            if bottom > contact.y + self.tuning.landing_tolerance {
                continue;
            }
            if contact.x < 0.0 || contact.x > play_width || contact.y < 0.0 {
                continue;
            }
            let candidate = SnapCandidate {
                platform: id,
                new_y: (contact.y - height).max(0.0),
            };
            chosen = match (chosen, self.tuning.tie_break) {
                (None, _) | (Some(_), SnapTieBreak::LastWins) => Some(candidate),
                (Some(best), SnapTieBreak::Nearest) => {
                    let y = bottom - height;
                    if (candidate.new_y - y).abs() < (best.new_y - y).abs() {
                        Some(candidate)
                    } else {
                        Some(best)
                    }
                }
            };
        }

        let chosen = chosen?;
        let body = bodies.get_mut(player)?;
        body.position.y = chosen.new_y;
        body.velocity.y = 0.0;
        if let BodyKind::Player(state) = &mut body.kind {
            state.land();
        }
        Some(chosen.platform)
    }
}
