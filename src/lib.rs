//! Draw & Escape - a platformer where you draw your own platforms
//!
//! Core modules:
//! - `sim`: Simulation core (bodies, segment geometry, collisions, player, ink drawing)
//! - `level`: Level descriptor table and entity construction
//! - `tuning`: Data-driven physics and drawing constants
//! - `error`: Errors raised at the data/configuration boundary

pub mod error;
pub mod level;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, TuningError};
pub use level::{LevelDescriptor, LevelSet};
pub use tuning::{SnapTieBreak, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the driver will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play area dimensions
    pub const PLAY_WIDTH: f32 = 450.0;
    pub const PLAY_HEIGHT: f32 = 800.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 24.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;
    pub const PLAYER_SPEED: f32 = 180.0;
    pub const PLAYER_JUMP_FORCE: f32 = 400.0;
    pub const GRAVITY: f32 = 800.0;
    pub const MAX_FALL_SPEED: f32 = 600.0;
    /// Vertical window in which a falling player still lands on a platform
    pub const LANDING_TOLERANCE: f32 = 15.0;

    /// Segment platforms are stroked with a fixed width regardless of ink cost
    pub const SEGMENT_THICKNESS: f32 = 4.0;
    /// Segments shorter than this project to their midpoint
    pub const MIN_PROJECTION_LENGTH: f32 = 2.0;

    /// Ink defaults
    pub const INK_MAX: f32 = 100.0;
    pub const INK_CONSUMPTION_RATE: f32 = 0.5; // ink per unit drawn
    pub const MIN_STROKE_DISTANCE: f32 = 2.0;
    pub const CLEAR_REFUND_PER_PLATFORM: f32 = 10.0;

    /// Door (level exit) size
    pub const DOOR_WIDTH: f32 = 48.0;
    pub const DOOR_HEIGHT: f32 = 64.0;

    /// Moving platform defaults
    pub const MOVING_PLATFORM_TRAVEL: f32 = 150.0;
    pub const MOVING_PLATFORM_SPEED: f32 = 50.0;
    pub const MOVING_CARRY_TOLERANCE: f32 = 10.0;

    /// Collectibles
    pub const COLLECTIBLE_SIZE: f32 = 16.0;
    pub const COLLECTIBLE_BOB_SPEED: f32 = 2.0;
    pub const COLLECTIBLE_BOB_HEIGHT: f32 = 3.0;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 24.0;
    pub const ENEMY_MIN_SPEED: f32 = 50.0;
    pub const ENEMY_MAX_SPEED: f32 = 150.0;
    pub const ENEMY_DETECTION_RADIUS: f32 = 150.0;
    pub const ENEMY_TURN_INTERVAL: f32 = 2.0; // seconds
    pub const ENEMY_SEPARATION: f32 = 2.0;
}

/// Closest point to `p` on the segment `a`-`b`
///
/// Segments shorter than [`consts::MIN_PROJECTION_LENGTH`] collapse to their
/// midpoint, so near-zero denominators never reach the division.
#[inline]
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    if a.distance(b) < consts::MIN_PROJECTION_LENGTH {
        return (a + b) * 0.5;
    }
    let ab = b - a;
    let t = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    a + ab * t
}

/// Parametric intersection test between segments `p1`-`p2` and `p3`-`p4`
///
/// Parallel (and collinear) segments never intersect.
#[inline]
pub fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let denom = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denom == 0.0 {
        return false;
    }
    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / denom;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(-5.0, 3.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(15.0, 3.0)), b);
        assert_eq!(
            closest_point_on_segment(a, b, Vec2::new(4.0, -7.0)),
            Vec2::new(4.0, 0.0)
        );
    }

    #[test]
    fn test_closest_point_short_segment_uses_midpoint() {
        let a = Vec2::new(5.0, 5.0);
        let b = Vec2::new(6.0, 5.0);
        let p = closest_point_on_segment(a, b, Vec2::new(100.0, 100.0));
        assert_eq!(p, Vec2::new(5.5, 5.0));

        // Zero length must not produce NaN
        let p = closest_point_on_segment(a, a, Vec2::ZERO);
        assert!(p.is_finite());
        assert_eq!(p, a);
    }

    #[test]
    fn test_segments_intersect() {
        // Crossing X
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0)
        ));
        // Parallel
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0)
        ));
        // Lines cross but segments stop short
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0)
        ));
        // Touching at an endpoint counts
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(10.0, 0.0)
        ));
    }
}
