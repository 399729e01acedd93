//! Data-driven physics and drawing constants
//!
//! Defaults come from [`crate::consts`]; a host may override any subset of
//! fields from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// How the controller picks between several platforms that could catch the
/// player in the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SnapTieBreak {
    /// Platform requiring the smallest vertical correction wins
    #[default]
    Nearest,
    /// Last platform in live-set order wins (legacy behavior)
    LastWins,
}

impl SnapTieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapTieBreak::Nearest => "nearest",
            SnapTieBreak::LastWins => "last_wins",
        }
    }
}

/// Player movement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    /// Horizontal speed (units/s), applied instantly
    pub speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Landing band around a platform's top surface
    pub landing_tolerance: f32,
    pub tie_break: SnapTieBreak,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
            jump_force: PLAYER_JUMP_FORCE,
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            landing_tolerance: LANDING_TOLERANCE,
            tie_break: SnapTieBreak::default(),
        }
    }
}

/// Ink drawing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InkTuning {
    pub consumption_rate: f32,
    pub min_stroke_distance: f32,
    /// Flat credit per cleared user-drawn platform
    pub clear_refund: f32,
    pub segment_thickness: f32,
}

impl Default for InkTuning {
    fn default() -> Self {
        Self {
            consumption_rate: INK_CONSUMPTION_RATE,
            min_stroke_distance: MIN_STROKE_DISTANCE,
            clear_refund: CLEAR_REFUND_PER_PLATFORM,
            segment_thickness: SEGMENT_THICKNESS,
        }
    }
}

/// Complete tuning table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub play_width: f32,
    pub play_height: f32,
    pub player: PlayerTuning,
    pub ink: InkTuning,
    pub moving_platform_travel: f32,
    pub moving_carry_tolerance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,
            player: PlayerTuning::default(),
            ink: InkTuning::default(),
            moving_platform_travel: MOVING_PLATFORM_TRAVEL,
            moving_carry_tolerance: MOVING_CARRY_TOLERANCE,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning (tie-break: {})",
            tuning.player.tie_break.as_str()
        );
        Ok(tuning)
    }

    /// Serialize for hosts that persist or display the active tuning
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break body invariants or the integrator
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("play_width", self.play_width),
            ("play_height", self.play_height),
            ("player.width", self.player.width),
            ("player.height", self.player.height),
            ("player.speed", self.player.speed),
            ("player.jump_force", self.player.jump_force),
            ("player.gravity", self.player.gravity),
            ("player.max_fall_speed", self.player.max_fall_speed),
            ("player.landing_tolerance", self.player.landing_tolerance),
            ("ink.consumption_rate", self.ink.consumption_rate),
            ("ink.min_stroke_distance", self.ink.min_stroke_distance),
            ("ink.segment_thickness", self.ink.segment_thickness),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                log::warn!("Rejecting tuning: {} = {}", field, value);
                return Err(TuningError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
