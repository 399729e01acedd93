//! Level descriptor table
//!
//! Levels are plain data: where the player and door go, which line platforms
//! and obstacles exist, and how much ink the player gets. The built-in table
//! ships as JSON inside the crate.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::MOVING_PLATFORM_SPEED;
use crate::error::LevelError;
use crate::sim::actors::{CollectibleKind, Enemy, EnemyBehavior};
use crate::sim::arena::BodyArena;
use crate::sim::body::{Body, BodyId};
use crate::sim::segment::StrokeOrigin;
use crate::tuning::Tuning;

const BUILTIN_LEVELS: &str = include_str!("../assets/levels.json");

/// `{ "x": .., "y": .. }` point in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDescriptor {
    pub x: f32,
    pub y: f32,
}

impl From<PointDescriptor> for Vec2 {
    fn from(p: PointDescriptor) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub start: PointDescriptor,
    pub end: PointDescriptor,
}

/// Rectangular level entity, keyed by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Moving platforms only; sign picks the starting direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Collectibles only: health, score, bonus or power
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Enemies only: wanderer, chaser or patrol (random when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
}

impl ObstacleDescriptor {
    /// Build the body this descriptor names; `None` for unknown types
    pub fn build(&self, tuning: &Tuning, rng: &mut Pcg32) -> Option<Body> {
        use rand::Rng;

        let body = match self.kind.as_str() {
            "wall" => Body::wall(self.x, self.y, self.width, self.height),
            "spike" => Body::spike(self.x, self.y, self.width, self.height),
            "moving" => {
                // Zero speed falls back to the default, as an absent one does
                let speed = self
                    .speed
                    .filter(|s| *s != 0.0)
                    .unwrap_or(MOVING_PLATFORM_SPEED);
                Body::moving(
                    self.x,
                    self.y,
                    self.width,
                    self.height,
                    speed,
                    tuning.moving_platform_travel,
                )
            }
            "collectible" => {
                let kind = self
                    .item
                    .as_deref()
                    .map(CollectibleKind::from_name)
                    .unwrap_or(CollectibleKind::Score);
                let phase = rng.random_range(0.0..std::f32::consts::TAU);
                Body::collectible(self.x, self.y, kind, phase)
            }
            "enemy" => {
                let enemy = match self.behavior.as_deref().and_then(EnemyBehavior::from_name) {
                    Some(behavior) => Enemy::with_behavior(behavior, rng),
                    None => Enemy::random(rng),
                };
                Body::enemy(self.x, self.y, enemy)
            }
            other => {
                log::debug!("Skipping obstacle of unknown type '{}'", other);
                return None;
            }
        };
        Some(body)
    }
}

/// One level of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ink: f32,
    pub player_start: PointDescriptor,
    pub door_position: PointDescriptor,
    #[serde(default)]
    pub platforms: Vec<SegmentDescriptor>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDescriptor>,
}

/// Handles to the bodies every level has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedLevel {
    pub player: BodyId,
    pub door: BodyId,
}

impl LevelDescriptor {
    /// Insert this level's bodies into an empty arena
    ///
    /// Order: player, door, line platforms, obstacles.
    pub fn spawn(&self, bodies: &mut BodyArena, tuning: &Tuning, rng: &mut Pcg32) -> SpawnedLevel {
        let player = bodies.insert(Body::player(
            self.player_start.into(),
            tuning.player.width,
            tuning.player.height,
        ));
        let door = bodies.insert(Body::door(self.door_position.x, self.door_position.y));

        for segment in &self.platforms {
            bodies.insert(Body::segment(
                segment.start.into(),
                segment.end.into(),
                tuning.ink.segment_thickness,
                StrokeOrigin::Level,
            ));
        }

        let mut skipped = 0;
        for obstacle in &self.obstacles {
            match obstacle.build(tuning, rng) {
                Some(body) => {
                    bodies.insert(body);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("{}: skipped {} unknown obstacles", self.name, skipped);
        }

        SpawnedLevel { player, door }
    }
}

/// Ordered, non-empty table of levels (indices are 0-based)
#[derive(Debug, Clone)]
pub struct LevelSet {
    levels: Vec<LevelDescriptor>,
}

impl LevelSet {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<LevelDescriptor> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn new(levels: Vec<LevelDescriptor>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(Self { levels })
    }

    /// The five levels shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn get(&self, index: usize) -> Result<&LevelDescriptor, LevelError> {
        self.levels.get(index).ok_or(LevelError::OutOfRange {
            requested: index,
            available: self.levels.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDescriptor> {
        self.levels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::Tag;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_table() {
        let levels = LevelSet::builtin().unwrap();
        assert_eq!(levels.len(), 5);

        let first = levels.get(0).unwrap();
        assert_eq!(first.name, "First Steps");
        assert_eq!(first.ink, 100.0);
        assert_eq!(first.player_start, PointDescriptor { x: 225.0, y: 720.0 });

        let last = levels.get(4).unwrap();
        assert_eq!(last.ink, 30.0);
        assert_eq!(last.obstacles[7].speed, Some(-70.0));
    }

    #[test]
    fn test_out_of_range() {
        let levels = LevelSet::builtin().unwrap();
        assert!(matches!(
            levels.get(5),
            Err(LevelError::OutOfRange {
                requested: 5,
                available: 5
            })
        ));
    }

    #[test]
    fn test_empty_and_malformed_tables_are_rejected() {
        assert!(matches!(LevelSet::from_json("[]"), Err(LevelError::Empty)));
        assert!(matches!(
            LevelSet::from_json("{ nope"),
            Err(LevelError::Parse(_))
        ));
    }

    #[test]
    fn test_spawn_skips_unknown_obstacles() {
        let json = r#"[{
            "name": "Test",
            "ink": 40,
            "playerStart": { "x": 10, "y": 20 },
            "doorPosition": { "x": 300, "y": 50 },
            "platforms": [{ "start": { "x": 0, "y": 100 }, "end": { "x": 80, "y": 100 } }],
            "obstacles": [
                { "type": "wall", "x": 100, "y": 200, "width": 20, "height": 50 },
                { "type": "lava", "x": 0, "y": 0, "width": 10, "height": 10 },
                { "type": "moving", "x": 50, "y": 300, "width": 60, "height": 10 },
                { "type": "collectible", "x": 200, "y": 200, "item": "power" },
                { "type": "enemy", "x": 200, "y": 400, "behavior": "patrol" }
            ]
        }]"#;
        let levels = LevelSet::from_json(json).unwrap();
        let mut bodies = BodyArena::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let spawned = levels
            .get(0)
            .unwrap()
            .spawn(&mut bodies, &Tuning::default(), &mut rng);

        assert_eq!(bodies.len(), 7);
        assert_eq!(bodies.get(spawned.player).unwrap().position, Vec2::new(10.0, 20.0));
        assert_eq!(bodies.get(spawned.door).unwrap().tag(), Tag::Door);
        assert_eq!(bodies.count_tag(Tag::Platform), 2);
        assert_eq!(bodies.count_tag(Tag::Wall), 1);
        assert_eq!(bodies.count_tag(Tag::Collectible), 1);
        assert_eq!(bodies.count_tag(Tag::Enemy), 1);

        // Missing speed falls back to the default
        let moving = bodies
            .iter()
            .find_map(|b| match &b.kind {
                crate::sim::body::BodyKind::Moving(m) => Some(m.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(moving.speed, MOVING_PLATFORM_SPEED);
        assert_eq!(moving.direction, 1.0);
    }
}
