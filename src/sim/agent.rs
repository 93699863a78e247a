//! The chaser: a pursuit agent that hunts the paddle through the brick field
//!
//! Every tick it re-plans with A* toward the paddle's column on the bottom
//! row, steers at the head waypoint, shoves itself out of bricks, and falls
//! back to wandering sideways when the paddle is unreachable. If it stops
//! making progress it raises a distress signal and eventually teleports a few
//! waypoints ahead.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::astar::{find_path, path_cost};
use super::collision::{Aabb, Bounded, aabb_collision, resolve_overlaps};
use super::grid::{Cell, Grid, GridLayout};
use crate::consts::{MIN_CONSUMED_BEFORE_REPLAN, TELEPORT_SKIP};
use crate::settings::ChaserSettings;

/// What the chaser is doing this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMode {
    /// Steering along an A* path
    PathFollowing,
    /// No path to the paddle; drifting sideways
    Wandering,
}

/// Why the chaser went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationCause {
    /// Touched the paddle
    HitTarget,
    /// Fell out through the bottom of the play area
    LeftPlayArea,
    /// Removed by the host
    Removed,
}

impl DeactivationCause {
    /// Score change the host should apply
    pub fn score_delta(self) -> i32 {
        match self {
            DeactivationCause::HitTarget => -1,
            DeactivationCause::LeftPlayArea | DeactivationCause::Removed => 0,
        }
    }
}

/// Emitted by `PursuitAgent::tick`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentEvent {
    Deactivated { cause: DeactivationCause, score_delta: i32 },
}

/// Stuck warning for the renderer (intensity 0..=1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distress {
    pub intensity: f32,
}

/// Per-tick inputs borrowed from the session
///
/// The grid is borrowed mutably for the whole tick: start/goal cells are
/// forced passable during the search and restored before the borrow ends.
pub struct TickContext<'a, O: Bounded> {
    pub grid: &'a mut Grid,
    pub layout: &'a GridLayout,
    pub target: Aabb,
    pub obstacles: &'a [O],
    pub play_area: Aabb,
}

/// Pursuit agent state
#[derive(Debug, Clone)]
pub struct PursuitAgent {
    pub id: u32,
    /// Box center (world units, +y down)
    pub pos: Vec2,
    pub size: Vec2,
    /// Movement direction for this tick (normalized before integration)
    pub dir: Vec2,
    pub speed: f32,
    pub dashing: bool,
    pub mode: AgentMode,
    /// Waypoints (cell centers), head first
    pub path: VecDeque<Vec2>,
    /// Waypoints reached on the current path
    pub consumed: u32,
    /// Seconds without meaningful progress
    pub stuck_timer: f32,
    /// Position when the stuck timer last reset
    pub last_pos: Vec2,
    pub active: bool,
    /// +1 or -1, horizontal wander direction
    pub wander_sign: f32,
    pub distress: Option<Distress>,
    pub settings: ChaserSettings,
}

impl PursuitAgent {
    pub fn new<R: Rng + ?Sized>(id: u32, center: Vec2, settings: ChaserSettings, rng: &mut R) -> Self {
        let wander_sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            id,
            pos: center,
            size: Vec2::new(settings.width, settings.height),
            dir: Vec2::ZERO,
            speed: settings.base_speed,
            dashing: false,
            mode: AgentMode::PathFollowing,
            path: VecDeque::new(),
            consumed: 0,
            stuck_timer: 0.0,
            last_pos: center,
            active: true,
            wander_sign,
            distress: None,
            settings,
        }
    }

    #[inline]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    #[inline]
    pub fn distress(&self) -> Option<Distress> {
        self.distress
    }

    /// External removal
    pub fn deactivate(&mut self) -> Option<AgentEvent> {
        self.retire(DeactivationCause::Removed)
    }

    /// Advance one tick. Returns an event when the chaser deactivates.
    pub fn tick<O: Bounded>(&mut self, ctx: &mut TickContext<'_, O>, dt: f32) -> Option<AgentEvent> {
        if !self.active || !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        self.replan(ctx.grid, ctx.layout, &ctx.target);

        match self.mode {
            AgentMode::PathFollowing => {
                self.follow_path();
                self.resolve_collisions(ctx.obstacles);
                self.apply_dash(&ctx.target);
                self.integrate(dt);
            }
            AgentMode::Wandering => {
                self.apply_dash(&ctx.target);
                self.wander(dt, ctx.obstacles, &ctx.play_area);
            }
        }

        if let Some(event) = self.check_termination(&ctx.target, &ctx.play_area) {
            return Some(event);
        }

        if self.mode == AgentMode::PathFollowing && !self.path.is_empty() {
            self.update_stuck(dt);
        } else {
            self.clear_stuck();
        }
        None
    }

    /// Search from the chaser's cell to the paddle's column on the last row
    fn replan(&mut self, grid: &mut Grid, layout: &GridLayout, target: &Aabb) {
        let start = grid.clamp(layout.cell_of(self.pos));
        let goal = grid.clamp(Cell::new(
            grid.rows().saturating_sub(1),
            layout.col_of(target.center().x),
        ));

        let cells = grid.with_passable(&[start, goal], |g| find_path(g, start, goal, true));

        if cells.is_empty() {
            if self.mode != AgentMode::Wandering {
                log::debug!("Chaser {} has no path to paddle, wandering", self.id);
            }
            self.path.clear();
            self.mode = AgentMode::Wandering;
            return;
        }

        self.mode = AgentMode::PathFollowing;
        let waypoints = cells.iter().map(|&c| layout.cell_center(c)).collect();
        if self.accept_path(waypoints) {
            log::debug!(
                "Chaser {} adopted path with {} waypoints (cost {:.2})",
                self.id,
                self.path.len(),
                path_cost(&cells)
            );
        }
    }

    /// Replan hysteresis: keep the current path until enough of it was walked
    ///
    /// Returns whether `waypoints` replaced the current path.
    pub fn accept_path(&mut self, waypoints: VecDeque<Vec2>) -> bool {
        if !self.path.is_empty() && self.consumed < MIN_CONSUMED_BEFORE_REPLAN {
            return false;
        }
        self.path = waypoints;
        self.consumed = 0;
        true
    }

    /// Pop the head waypoint if reached, then aim at whatever is next
    fn follow_path(&mut self) {
        let arrived = self
            .path
            .front()
            .is_some_and(|&head| self.pos.distance(head) < self.settings.arrival_threshold);
        if arrived {
            self.path.pop_front();
            self.consumed += 1;
        }

        self.dir = match self.path.front() {
            Some(&next) => (next - self.pos).normalize_or_zero(),
            None => Vec2::ZERO,
        };
    }

    /// Push out of every overlapping obstacle, cancelling movement on the pushed axis
    pub fn resolve_collisions<O: Bounded>(&mut self, obstacles: &[O]) {
        let pushes = resolve_overlaps(&mut self.pos, self.size, &mut self.dir, obstacles);
        if pushes > 1 {
            log::trace!("Chaser {} resolved {} overlaps", self.id, pushes);
        }
    }

    /// Dash is recomputed each tick from the current distance
    fn apply_dash(&mut self, target: &Aabb) {
        let distance = self.pos.distance(target.center());
        self.speed = self.settings.speed_at(distance);
        self.dashing = self.speed > self.settings.base_speed;
    }

    /// Step toward the head waypoint, never past it
    fn integrate(&mut self, dt: f32) {
        let mut step = self.speed * dt;
        if let Some(&head) = self.path.front() {
            step = step.min(self.pos.distance(head));
        }
        self.pos += self.dir.normalize_or_zero() * step;
    }

    /// Sideways drift, bouncing off the play-area sides and obstacles
    fn wander<O: Bounded>(&mut self, dt: f32, obstacles: &[O], play_area: &Aabb) {
        self.dir = Vec2::new(self.wander_sign, 0.0);
        self.pos.x += self.wander_sign * self.speed * dt;

        let half = self.size.x / 2.0;
        let left = play_area.min().x + half;
        let right = play_area.max().x - half;
        if self.pos.x <= left {
            self.pos.x = left;
            self.wander_sign = 1.0;
        } else if self.pos.x >= right {
            self.pos.x = right;
            self.wander_sign = -1.0;
        }

        // Side hits bounce; grazes from above or below only push out vertically
        for obstacle in obstacles.iter().map(|o| o.bounding_box()) {
            let hit = aabb_collision(&self.bounding_box(), &obstacle);
            if !hit.hit {
                continue;
            }
            if hit.normal.x < 0.0 {
                self.pos.x = obstacle.min().x - half;
                self.wander_sign = -1.0;
            } else if hit.normal.x > 0.0 {
                self.pos.x = obstacle.max().x + half;
                self.wander_sign = 1.0;
            } else {
                self.pos += hit.push();
            }
        }
    }

    fn check_termination(&mut self, target: &Aabb, play_area: &Aabb) -> Option<AgentEvent> {
        let bbox = self.bounding_box();
        if bbox.overlaps(target) {
            return self.retire(DeactivationCause::HitTarget);
        }
        if bbox.min().y > play_area.max().y {
            return self.retire(DeactivationCause::LeftPlayArea);
        }
        None
    }

    fn retire(&mut self, cause: DeactivationCause) -> Option<AgentEvent> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.path.clear();
        self.distress = None;
        log::info!("Chaser {} deactivated: {:?}", self.id, cause);
        Some(AgentEvent::Deactivated {
            cause,
            score_delta: cause.score_delta(),
        })
    }

    /// Accumulate the stuck timer while the chaser stays near `last_pos`
    pub fn update_stuck(&mut self, dt: f32) {
        if self.pos.distance(self.last_pos) >= self.settings.arrival_threshold {
            self.clear_stuck();
            return;
        }

        self.stuck_timer += dt;
        let duration = self.settings.stuck_duration;
        let onset = duration * self.settings.distress_onset;

        if self.stuck_timer > onset {
            let ramp = duration - onset;
            let intensity = if ramp > 0.0 {
                ((self.stuck_timer - onset) / ramp).clamp(0.0, 1.0)
            } else {
                1.0
            };
            self.distress = Some(Distress { intensity });
        }

        if self.stuck_timer >= duration {
            self.try_teleport();
        }
    }

    /// Skip `TELEPORT_SKIP` waypoints and jump onto the next one
    ///
    /// No-op unless at least `TELEPORT_SKIP + 1` waypoints remain.
    pub fn try_teleport(&mut self) -> bool {
        if self.path.len() <= TELEPORT_SKIP {
            return false;
        }
        self.path.drain(..TELEPORT_SKIP);
        self.consumed += TELEPORT_SKIP as u32;
        let Some(&dest) = self.path.front() else {
            return false;
        };
        log::info!("Chaser {} stuck, teleporting {:?} -> {:?}", self.id, self.pos, dest);
        self.pos = dest;
        self.clear_stuck();
        true
    }

    fn clear_stuck(&mut self) {
        self.stuck_timer = 0.0;
        self.distress = None;
        self.last_pos = self.pos;
    }
}
