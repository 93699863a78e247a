//! Brick Chaser - a pursuit agent for a brick-breaker playfield
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid search, chaser, collisions, session)
//! - `settings`: Data-driven chaser tuning

pub mod settings;
pub mod sim;

pub use settings::ChaserSettings;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Playfield dimensions (world units, +y down)
    pub const PLAYFIELD_WIDTH: f32 = 400.0;
    pub const PLAYFIELD_HEIGHT: f32 = 480.0;
    /// World units per occupancy cell, shared with the brick layout
    pub const CELL_SIZE: Vec2 = Vec2::new(20.0, 20.0);

    /// Brick defaults
    pub const BRICK_HEIGHT: f32 = 20.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 64.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    /// Space between paddle bottom edge and playfield bottom
    pub const PADDLE_BOTTOM_GAP: f32 = 12.0;

    /// A fresh path is only adopted after this many waypoints of the current one
    pub const MIN_CONSUMED_BEFORE_REPLAN: u32 = 2;
    /// Waypoints skipped by a stuck teleport (needs one more remaining)
    pub const TELEPORT_SKIP: usize = 2;
}
