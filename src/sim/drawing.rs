//! Freehand strokes to segment platforms
//!
//! A stroke is a session opened by a pointer press. Every pointer sample far
//! enough from the cursor becomes one segment platform, paid for in ink. A
//! sample the budget cannot cover ends the session without drawing anything.

use glam::Vec2;

use super::arena::BodyArena;
use super::body::{Body, BodyId};
use super::ink::InkBudget;
use super::segment::StrokeOrigin;
use crate::tuning::InkTuning;

/// What a pointer sample did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOutcome {
    /// No stroke in progress
    Idle,
    /// Closer than the minimum stroke distance to the cursor; ignored
    Debounced,
    /// New segment inserted into the live set
    Committed { platform: BodyId, cost: f32 },
    /// Not enough ink; the stroke was ended
    Exhausted { cost: f32 },
}

#[derive(Debug, Clone)]
pub struct InkDrawingSystem {
    pub ink: InkBudget,
    /// Last committed point of the stroke in progress
    cursor: Option<Vec2>,
    min_stroke_distance: f32,
    clear_refund: f32,
    thickness: f32,
}

impl InkDrawingSystem {
    pub fn new(tuning: &InkTuning, max_ink: f32) -> Self {
        Self {
            ink: InkBudget::new(max_ink, tuning.consumption_rate),
            cursor: None,
            min_stroke_distance: tuning.min_stroke_distance,
            clear_refund: tuning.clear_refund,
            thickness: tuning.segment_thickness,
        }
    }

    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Open a stroke at `at`; refused when the budget is empty
    pub fn begin_stroke(&mut self, at: Vec2) -> bool {
        if !self.ink.has_ink() {
            log::debug!("Stroke refused: out of ink");
            self.cursor = None;
            return false;
        }
        self.cursor = Some(at);
        true
    }

    /// Extend the stroke in progress to `to`
    pub fn extend_stroke(&mut self, to: Vec2, bodies: &mut BodyArena) -> StrokeOutcome {
        let Some(from) = self.cursor else {
            return StrokeOutcome::Idle;
        };
        let distance = from.distance(to);
        if distance < self.min_stroke_distance {
            return StrokeOutcome::Debounced;
        }

        let cost = self.ink.cost_of(distance);
        if !self.ink.try_spend(cost) {
            log::debug!(
                "Stroke ended: segment costs {:.1}, {:.1} ink left",
                cost,
                self.ink.current
            );
            self.cursor = None;
            return StrokeOutcome::Exhausted { cost };
        }

        let platform = bodies.insert(Body::segment(
            from,
            to,
            self.thickness,
            StrokeOrigin::Drawn,
        ));
        self.cursor = Some(to);
        log::debug!(
            "Committed segment {:?} ({:.1} ink, {:.1} left)",
            platform,
            cost,
            self.ink.current
        );
        StrokeOutcome::Committed { platform, cost }
    }

    /// Close the stroke; idempotent and never touches geometry
    pub fn end_stroke(&mut self) {
        self.cursor = None;
    }

    /// Remove every player-drawn platform and refund a flat amount per
    /// platform, capped at the budget
    ///
    /// Returns `(platforms removed, ink refunded)`.
    pub fn clear_drawn(&mut self, bodies: &mut BodyArena) -> (usize, f32) {
        let mut removed = 0;
        for id in bodies.ids() {
            if let Some(body) = bodies.get_mut(id)
                && body.active
                && body.is_drawn_platform()
            {
                body.destroy();
                removed += 1;
            }
        }
        self.end_stroke();
        let refunded = self.ink.refund(removed as f32 * self.clear_refund);
        if removed > 0 {
            log::info!(
                "Cleared {} drawn platforms, refunded {:.1} ink",
                removed,
                refunded
            );
        }
        (removed, refunded)
    }

    /// Live drawn platforms
    pub fn drawn_count(&self, bodies: &BodyArena) -> usize {
        bodies
            .iter_active()
            .filter(|body| body.is_drawn_platform())
            .count()
    }
}
