//! Chase session state
//!
//! Owns everything the chaser reads each tick: bricks, paddle, play area, the
//! shared occupancy grid, plus the seeded RNG and entity id counter.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::{DeactivationCause, PursuitAgent};
use super::collision::{Aabb, Bounded};
use super::grid::{Cell, Grid, GridLayout};
use crate::consts::*;
use crate::settings::ChaserSettings;

/// A brick, as far as the chaser is concerned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub bbox: Aabb,
}

impl Bounded for Brick {
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Events for the host (audio, HUD, score display)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ChaserSpawned { id: u32 },
    ChaserDeactivated { id: u32, cause: DeactivationCause, score_delta: i32 },
}

/// Complete chase session state (deterministic for a given seed and inputs)
#[derive(Debug, Clone)]
pub struct ChaseState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub settings: ChaserSettings,
    pub play_area: Aabb,
    pub layout: GridLayout,
    /// Rebuilt from `bricks` every tick
    pub grid: Grid,
    /// Alive bricks (sorted by id)
    pub bricks: Vec<Brick>,
    pub paddle: Aabb,
    pub chaser: Option<PursuitAgent>,
    pub score: i64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending events, drained by the host
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl ChaseState {
    /// Empty playfield of the default size with the paddle centered at the bottom
    pub fn new(seed: u64, settings: ChaserSettings) -> Self {
        let play_area = Aabb::new(Vec2::ZERO, Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT));
        Self::with_play_area(seed, settings, play_area, CELL_SIZE)
    }

    pub fn with_play_area(seed: u64, settings: ChaserSettings, play_area: Aabb, cell_size: Vec2) -> Self {
        let layout = GridLayout::covering(&play_area, cell_size);
        let paddle_size = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
        let paddle_center = Vec2::new(
            play_area.center().x,
            play_area.max().y - PADDLE_BOTTOM_GAP - PADDLE_HEIGHT / 2.0,
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings: settings.sanitized(),
            play_area,
            layout,
            grid: Grid::new(layout.rows, layout.cols, true),
            bricks: Vec::new(),
            paddle: Aabb::from_center(paddle_center, paddle_size),
            chaser: None,
            score: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a brick and return its id
    pub fn add_brick(&mut self, pos: Vec2, size: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.bricks.push(Brick {
            id,
            bbox: Aabb::new(pos, size),
        });
        id
    }

    /// Lay out `rows x cols` bricks starting at `top`, skipping cells where `gap` says so
    pub fn add_brick_wall(&mut self, top: f32, rows: usize, cols: usize, gap: impl Fn(usize, usize) -> bool) {
        let size = Vec2::new(self.play_area.size.x / cols as f32, BRICK_HEIGHT);
        for row in 0..rows {
            for col in 0..cols {
                if gap(row, col) {
                    continue;
                }
                let pos = self.play_area.pos + Vec2::new(col as f32 * size.x, top + row as f32 * size.y);
                self.add_brick(pos, size);
            }
        }
    }

    pub fn remove_bricks(&mut self, ids: &[u32]) {
        self.bricks.retain(|b| !ids.contains(&b.id));
    }

    /// Re-rasterize the occupancy grid from the alive bricks
    pub fn rebuild_grid(&mut self) {
        self.grid = self.layout.rasterize(&self.bricks);
    }

    /// Center the paddle on `x`, kept inside the play area
    pub fn move_paddle(&mut self, x: f32) {
        let half = self.paddle.size.x / 2.0;
        let x = x.clamp(self.play_area.min().x + half, self.play_area.max().x - half);
        let center = Vec2::new(x, self.paddle.center().y);
        self.paddle = Aabb::from_center(center, self.paddle.size);
    }

    /// Spawn a chaser on a random open cell of the top row
    ///
    /// Returns `None` if one is already active.
    pub fn spawn_chaser(&mut self) -> Option<u32> {
        if self.chaser.is_some() {
            return None;
        }
        self.rebuild_grid();

        let open: Vec<usize> = (0..self.grid.cols())
            .filter(|&col| self.grid.is_passable(Cell::new(0, col)))
            .collect();
        let col = if open.is_empty() {
            self.rng.random_range(0..self.layout.cols.max(1))
        } else {
            open[self.rng.random_range(0..open.len())]
        };

        // Small horizontal jitter inside the spawn cell
        let jitter = self.layout.cell_size.x * 0.25;
        let offset = if jitter > 0.0 { self.rng.random_range(-jitter..=jitter) } else { 0.0 };
        let center = self.layout.cell_center(Cell::new(0, col)) + Vec2::new(offset, 0.0);

        let id = self.next_entity_id();
        let agent = PursuitAgent::new(id, center, self.settings.clone(), &mut self.rng);
        log::info!("Chaser {} spawned at {:?}", id, center);
        self.chaser = Some(agent);
        self.events.push(GameEvent::ChaserSpawned { id });
        Some(id)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
