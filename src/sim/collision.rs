//! Circle overlap tests and line-of-sight queries
//!
//! Every collider in the game is a circle: obstacles, tanks, infantry, bullets,
//! pickups. All contact checks are strict `distance < sum of radii`.

use glam::Vec2;

use super::terrain::Obstacle;
use crate::consts::LINE_OF_SIGHT_STEPS;

/// True if two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// True if `point` lies inside any obstacle footprint
pub fn point_hits_obstacle(point: Vec2, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| point.distance(o.pos) < o.radius)
}

/// True if a circle at `pos` would overlap any obstacle.
/// `tolerance` lets smaller units squeeze closer than the full radius sum.
pub fn overlaps_obstacle(pos: Vec2, radius: f32, tolerance: f32, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .any(|o| pos.distance(o.pos) < o.radius + radius - tolerance)
}

/// True if `pos` is within `reach` of some obstacle's edge
pub fn near_cover(pos: Vec2, reach: f32, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .any(|o| pos.distance(o.pos) < o.radius + reach)
}

/// Sampled raycast: the segment is checked at evenly spaced interior points,
/// endpoints excluded. Blocked if any sample falls inside an obstacle.
pub fn line_of_sight(from: Vec2, to: Vec2, obstacles: &[Obstacle]) -> bool {
    let step = (to - from) / LINE_OF_SIGHT_STEPS as f32;
    (1..LINE_OF_SIGHT_STEPS).all(|i| !point_hits_obstacle(from + step * i as f32, obstacles))
}

/// True if `pos` is inside `[0, width] × [0, height]`
#[inline]
pub fn within_bounds(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x >= 0.0 && pos.x <= width && pos.y >= 0.0 && pos.y <= height
}

/// Clamp a circle of `radius` so it stays inside the world
#[inline]
pub fn clamp_to_bounds(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pos.x.max(radius).min(width - radius),
        pos.y.max(radius).min(height - radius),
    )
}
