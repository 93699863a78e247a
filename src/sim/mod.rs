//! Deterministic simulation module
//!
//! All chase logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod agent;
pub mod astar;
pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;

pub use agent::{AgentEvent, AgentMode, DeactivationCause, Distress, PursuitAgent, TickContext};
pub use astar::{find_path, heuristic, path_cost};
pub use collision::{Aabb, Bounded, CollisionResult, aabb_collision, resolve_overlaps};
pub use grid::{Cell, Grid, GridLayout};
pub use state::{Brick, ChaseState, GameEvent};
pub use tick::{TickInput, tick};
