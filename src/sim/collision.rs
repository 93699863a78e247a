//! Axis-aligned box collision
//!
//! Everything the chaser bumps into (bricks, the paddle, the play area) is
//! reduced to an `Aabb`. Resolution pushes along the axis of least overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (top-left corner + size, +y is down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size / 2.0
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    /// Overlap depth along each axis (negative on an axis means separated)
    pub fn overlap_depth(&self, other: &Aabb) -> Vec2 {
        let delta = (self.center() - other.center()).abs();
        self.half_extents() + other.half_extents() - delta
    }
}

/// Anything the chaser can read a bounding box from
pub trait Bounded {
    fn bounding_box(&self) -> Aabb;
}

impl Bounded for Aabb {
    fn bounding_box(&self) -> Aabb {
        *self
    }
}

/// Result of a box-vs-box collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit axis pointing from the obstacle toward the mover
    pub normal: Vec2,
    /// Overlap along `normal` (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    /// Translation that separates the mover from the obstacle
    #[inline]
    pub fn push(&self) -> Vec2 {
        self.normal * self.penetration
    }
}

/// Minimum translation of `mover` out of `obstacle`
///
/// Picks the axis with the smaller overlap. A mover exactly centered on the
/// obstacle along that axis is pushed toward +x / +y.
pub fn aabb_collision(mover: &Aabb, obstacle: &Aabb) -> CollisionResult {
    if !mover.overlaps(obstacle) {
        return CollisionResult::miss();
    }

    let delta = mover.center() - obstacle.center();
    let depth = mover.overlap_depth(obstacle);

    if depth.x < depth.y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        CollisionResult {
            hit: true,
            normal: Vec2::new(sign, 0.0),
            penetration: depth.x,
        }
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        CollisionResult {
            hit: true,
            normal: Vec2::new(0.0, sign),
            penetration: depth.y,
        }
    }
}

/// Push a box of `size` centered at `center` out of every overlapping obstacle
///
/// Obstacles are handled in slice order, each against the already-corrected
/// position. Every axis that was pushed on is zeroed in `dir`.
pub fn resolve_overlaps<O: Bounded>(center: &mut Vec2, size: Vec2, dir: &mut Vec2, obstacles: &[O]) -> u32 {
    let mut resolved = 0;
    for obstacle in obstacles {
        let mover = Aabb::from_center(*center, size);
        let result = aabb_collision(&mover, &obstacle.bounding_box());
        if !result.hit {
            continue;
        }
        *center += result.push();
        if result.normal.x != 0.0 {
            dir.x = 0.0;
        } else {
            dir.y = 0.0;
        }
        resolved += 1;
    }
    resolved
}
