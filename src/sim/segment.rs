//! Line-segment platform geometry
//!
//! A segment platform is a stroke of fixed thickness between two points. The
//! broad phase sees its padded bounding box; the narrow phase tests the raw
//! line against the other body's rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Bounds;
use crate::{closest_point_on_segment, segments_intersect};

/// Who created a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeOrigin {
    /// Drawn by the player with ink (removable, refundable)
    Drawn,
    /// Authored by the level
    Level,
}

/// A solid line platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPlatform {
    pub start: Vec2,
    pub end: Vec2,
    /// Stroke width; padding for the bounding box
    pub thickness: f32,
    pub origin: StrokeOrigin,
}

impl SegmentPlatform {
    pub fn new(start: Vec2, end: Vec2, thickness: f32, origin: StrokeOrigin) -> Self {
        Self {
            start,
            end,
            thickness,
            origin,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Angle of the stroke direction (radians)
    pub fn angle(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }

    /// Unit normal (direction rotated 90°); zero for a dot
    pub fn normal(&self) -> Vec2 {
        let dir = (self.end - self.start).normalize_or_zero();
        Vec2::new(-dir.y, dir.x)
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    /// Endpoint bounding box grown by half the thickness on every side
    ///
    /// Always contains the rendered stroke; a dot still gets a
    /// `thickness`-sized box.
    pub fn padded_bounds(&self) -> Bounds {
        let half = self.thickness * 0.5;
        let min = self.start.min(self.end);
        let max = self.start.max(self.end);
        Bounds {
            left: min.x - half,
            right: max.x + half,
            top: min.y - half,
            bottom: max.y + half,
        }
    }

    /// Exact segment-vs-rectangle test
    ///
    /// True if an endpoint lies inside the rectangle or the line crosses one
    /// of its four edges.
    pub fn intersects_rect(&self, rect: &Bounds) -> bool {
        if rect.contains_point(self.start) || rect.contains_point(self.end) {
            return true;
        }
        rect.edges()
            .iter()
            .any(|&(a, b)| segments_intersect(self.start, self.end, a, b))
    }

    /// Line-vs-line test; gives the same answer from either side
    pub fn intersects_segment(&self, other: &SegmentPlatform) -> bool {
        segments_intersect(self.start, self.end, other.start, other.end)
            || segments_intersect(other.start, other.end, self.start, self.end)
    }

    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        closest_point_on_segment(self.start, self.end, p)
    }
}
