//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (live-set insertion order)
//! - No rendering or platform dependencies

pub mod actors;
pub mod arena;
pub mod body;
pub mod collision;
pub mod drawing;
pub mod ink;
pub mod input;
pub mod player;
pub mod segment;
pub mod state;
pub mod tick;

pub use actors::{Collectible, CollectibleKind, Enemy, EnemyBehavior, MovingPlatform};
pub use arena::BodyArena;
pub use body::{Body, BodyId, BodyKind, Bounds, Tag};
pub use collision::{BodyDelta, CollisionEngine, ResolveContext, resolve_collision};
pub use drawing::{InkDrawingSystem, StrokeOutcome};
pub use ink::InkBudget;
pub use input::{InputState, Key, PointerEvent};
pub use player::{PlayerController, PlayerState};
pub use segment::{SegmentPlatform, StrokeOrigin};
pub use state::{BodyView, GameEvent, Shape, SimStats, Simulation};
pub use tick::{FixedStepper, SimulationContext, tick};
