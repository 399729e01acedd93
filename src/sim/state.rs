//! Simulation state and game-flow signals
//!
//! Everything a tick reads or writes lives in [`Simulation`]. Rendering and
//! UI see it only through [`Simulation::render_snapshot`], [`Simulation::stats`]
//! and the drained event list.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actors::CollectibleKind;
use super::arena::BodyArena;
use super::body::{BodyId, BodyKind, Bounds, Tag};
use super::collision::CollisionEngine;
use super::drawing::InkDrawingSystem;
use super::player::PlayerController;
use crate::error::LevelError;
use crate::level::LevelSet;
use crate::tuning::Tuning;

/// Things the host may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player touched the door (terminal)
    ReachedGoal,
    /// Player fell below the play area (terminal)
    Died,
    /// Player touched a spike and was sent back to the start
    Respawned,
    Collected { kind: CollectibleKind, value: u32 },
    StrokeCommitted { platform: BodyId, cost: f32 },
    /// A stroke ended because the next segment was unaffordable
    InkExhausted,
    PlatformsCleared { count: usize, refund: f32 },
}

impl GameEvent {
    /// Ends the level attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::ReachedGoal | GameEvent::Died)
    }
}

/// Collision shape as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Segment {
        start: Vec2,
        end: Vec2,
        thickness: f32,
    },
}

/// Read-only view of one active body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub id: BodyId,
    pub tag: Tag,
    #[serde(flatten)]
    pub shape: Shape,
    /// Player-drawn ink stroke
    pub drawn: bool,
}

/// HUD numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    /// 1-based, for display
    pub level_number: usize,
    pub level_count: usize,
    pub level_name: String,
    pub ink: f32,
    pub max_ink: f32,
    pub drawn_platforms: usize,
    pub bodies: usize,
    pub time_ticks: u64,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct Simulation {
    pub tuning: Tuning,
    levels: LevelSet,
    /// 0-based index into `levels`
    level_index: usize,
    pub bodies: BodyArena,
    pub drawing: InkDrawingSystem,
    pub collisions: CollisionEngine,
    pub controller: PlayerController,
    pub player: BodyId,
    pub door: BodyId,
    seed: u64,
    /// Reseeded on every level load
    pub rng: Pcg32,
    /// Ticks since the level was loaded
    pub time_ticks: u64,
    /// Latched terminal signal; ticks are no-ops while set
    pub(crate) terminal: Option<GameEvent>,
    pub(crate) events: Vec<GameEvent>,
}

impl Simulation {
    /// New simulation with the first level loaded
    pub fn new(tuning: Tuning, levels: LevelSet, seed: u64) -> Result<Self, LevelError> {
        let drawing = InkDrawingSystem::new(&tuning.ink, 0.0);
        let controller = PlayerController::new(tuning.player.clone());
        let mut sim = Self {
            tuning,
            levels,
            level_index: 0,
            bodies: BodyArena::new(),
            drawing,
            collisions: CollisionEngine::new(),
            controller,
            player: BodyId::DETACHED,
            door: BodyId::DETACHED,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            terminal: None,
            events: Vec::new(),
        };
        sim.load_level(0)?;
        Ok(sim)
    }

    /// Default tuning and the built-in level table
    pub fn with_builtin_levels(seed: u64) -> Result<Self, LevelError> {
        Self::new(Tuning::default(), LevelSet::builtin()?, seed)
    }

    /// Replace the live set with level `index` (0-based)
    ///
    /// An index outside the table is rejected and leaves the simulation as
    /// it was.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let level = match self.levels.get(index) {
            Ok(level) => level,
            Err(err) => {
                log::warn!("Rejected level load: {}", err);
                return Err(err);
            }
        };

        self.bodies.clear();
        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(index as u64));
        let spawned = level.spawn(&mut self.bodies, &self.tuning, &mut self.rng);
        self.player = spawned.player;
        self.door = spawned.door;

        self.drawing.end_stroke();
        self.drawing.ink.set_max(level.ink);
        self.level_index = index;
        self.time_ticks = 0;
        self.terminal = None;
        self.events.clear();

        log::info!(
            "Level {}: {} loaded ({} ink, {} bodies)",
            index + 1,
            level.name,
            level.ink,
            self.bodies.len()
        );
        Ok(())
    }

    /// Reload the current level from its descriptor
    pub fn restart_level(&mut self) -> Result<(), LevelError> {
        self.load_level(self.level_index)
    }

    /// Advance to the next level; `false` (and no change) on the last one
    pub fn next_level(&mut self) -> Result<bool, LevelError> {
        if self.is_last_level() {
            log::info!("All {} levels completed", self.levels.len());
            return Ok(false);
        }
        self.load_level(self.level_index + 1)?;
        Ok(true)
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn is_last_level(&self) -> bool {
        self.level_index + 1 >= self.levels.len()
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    /// Play area as a box anchored at the origin
    pub fn play_bounds(&self) -> Bounds {
        Bounds::from_rect(Vec2::ZERO, self.tuning.play_width, self.tuning.play_height)
    }

    /// Terminal signal raised this level attempt, if any
    pub fn terminal(&self) -> Option<&GameEvent> {
        self.terminal.as_ref()
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Shapes and tags of every active body, in live order
    pub fn render_snapshot(&self) -> Vec<BodyView> {
        self.bodies
            .iter_active()
            .map(|body| {
                let shape = match &body.kind {
                    BodyKind::Segment(segment) => Shape::Segment {
                        start: segment.start,
                        end: segment.end,
                        thickness: segment.thickness,
                    },
                    _ => Shape::Rect {
                        x: body.position.x,
                        y: body.position.y,
                        width: body.width,
                        height: body.height,
                    },
                };
                BodyView {
                    id: body.id,
                    tag: body.tag(),
                    shape,
                    drawn: body.is_drawn_platform(),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> SimStats {
        let level_name = self
            .levels
            .get(self.level_index)
            .map(|level| level.name.clone())
            .unwrap_or_default();
        SimStats {
            level_number: self.level_index + 1,
            level_count: self.levels.len(),
            level_name,
            ink: self.drawing.ink.current,
            max_ink: self.drawing.ink.max,
            drawn_platforms: self.drawing.drawn_count(&self.bodies),
            bodies: self.bodies.iter_active().count(),
            time_ticks: self.time_ticks,
        }
    }
}
