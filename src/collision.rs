//! Collision collaborator
//!
//! The simulation only ever asks two questions of the collision layer:
//! "move this body along one axis until something blocks it" and "which
//! bodies overlap". [`MoveResolver`] is the seam for the first; the
//! [`ObstacleWorld`] implementation resolves against static axis-aligned
//! obstacles, which is all a tile stage contains.
//!
//! Coordinates are stage pixels with `y` growing downward; a body's position
//! is its top-left corner.

use bevy::prelude::*;

/// Axis-aligned box described by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            size: self.size,
        }
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            size: self.size + Vec2::splat(margin * 2.0),
        }
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.overlaps_on(other, Axis::X) && self.overlaps_on(other, Axis::Y)
    }

    fn overlaps_on(&self, other: &Aabb, axis: Axis) -> bool {
        let (a_min, a_max) = (axis.of(self.min), axis.of(self.max()));
        let (b_min, b_max) = (axis.of(other.min), axis.of(other.max()));
        a_min < b_max && b_min < a_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    fn vector(self, amount: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }
}

/// Collision footprint of anything that takes part in movement or overlap checks
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub size: Vec2,
}

impl Body {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
        }
    }

    /// The box this body occupies when its top-left corner sits at `position`
    pub fn aabb(&self, position: Vec2) -> Aabb {
        Aabb::new(position, self.size)
    }
}

/// The region of an actor that attacks can hit, relative to its position.
///
/// Separate from [`Body`], which only covers the feet and drives movement.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hurtbox {
    pub offset: Vec2,
    pub size: Vec2,
}

impl Hurtbox {
    pub fn aabb(&self, position: Vec2) -> Aabb {
        Aabb::new(position + self.offset, self.size)
    }
}

/// Single-axis sweep against whatever blocks movement.
pub trait MoveResolver {
    /// Returns how much of `delta` along `axis` the body can travel before
    /// touching the first blocker. The sign always matches `delta`.
    fn move_until_blocked(&self, body: Aabb, axis: Axis, delta: f32) -> f32;
}

/// Static obstacle set, rebuilt each frame from the stage's obstacles
#[derive(Debug, Default, Clone)]
pub struct ObstacleWorld {
    obstacles: Vec<Aabb>,
}

impl ObstacleWorld {
    pub fn new(obstacles: Vec<Aabb>) -> Self {
        Self { obstacles }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl FromIterator<Aabb> for ObstacleWorld {
    fn from_iter<I: IntoIterator<Item = Aabb>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl MoveResolver for ObstacleWorld {
    fn move_until_blocked(&self, body: Aabb, axis: Axis, delta: f32) -> f32 {
        if delta == 0.0 {
            return 0.0;
        }
        let mut allowed = delta;
        for obstacle in &self.obstacles {
            // Only obstacles sharing the perpendicular span can be hit
            if !body.overlaps_on(obstacle, axis.other()) {
                continue;
            }
            if delta > 0.0 {
                let gap = axis.of(obstacle.min) - axis.of(body.max());
                if gap >= 0.0 && gap < allowed {
                    allowed = gap;
                }
            } else {
                let gap = axis.of(obstacle.max()) - axis.of(body.min);
                if gap <= 0.0 && gap > allowed {
                    allowed = gap;
                }
            }
        }
        allowed
    }
}

/// Move `body` by `delta`, vertical axis first, then horizontal.
///
/// Each axis is swept independently so a blocked horizontal move never
/// cancels the vertical one (no snagging on walls when moving diagonally).
/// Returns the delta actually applied.
pub fn resolve_movement(resolver: &impl MoveResolver, body: Aabb, delta: Vec2) -> Vec2 {
    let dy = resolver.move_until_blocked(body, Axis::Y, delta.y);
    let moved = body.translated(Axis::Y.vector(dy));
    let dx = resolver.move_until_blocked(moved, Axis::X, delta.x);
    Vec2::new(dx, dy)
}
