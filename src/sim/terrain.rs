//! Terrain selection and procedural obstacle placement
//!
//! Obstacles are placed by rejection sampling. Candidates falling inside a
//! safe zone, on the river, or too close to an earlier obstacle are rejected;
//! an obstacle that never finds a spot is skipped, so a level may end up a
//! little sparser than its target count.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::World;
use crate::consts::*;

/// Terrain themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Forest,
    River,
    Desert,
    Snow,
    Urban,
    Swamp,
}

impl Terrain {
    /// Rotation order for levels without a fixed theme
    pub const ROTATION: [Terrain; 6] = [
        Terrain::Forest,
        Terrain::River,
        Terrain::Desert,
        Terrain::Snow,
        Terrain::Urban,
        Terrain::Swamp,
    ];

    /// Theme for a level: fixed on threshold levels, otherwise rotates every 3 levels
    pub fn for_level(level: u32) -> Self {
        match level {
            1 => Terrain::Forest,
            4 => Terrain::River,
            7 => Terrain::Desert,
            10 => Terrain::Snow,
            13 => Terrain::Urban,
            16 => Terrain::Swamp,
            20 => Terrain::Urban,
            _ => {
                let index = (level.saturating_sub(1) / 3) as usize % Self::ROTATION.len();
                Self::ROTATION[index]
            }
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Forest => "Forest",
            Terrain::River => "Forest River",
            Terrain::Desert => "Desert",
            Terrain::Snow => "Snowy Mountains",
            Terrain::Urban => "Urban Ruins",
            Terrain::Swamp => "Toxic Swamp",
        }
    }

    /// What the obstacles are called on this terrain
    pub fn obstacle_noun(&self) -> &'static str {
        match self {
            Terrain::Forest | Terrain::River | Terrain::Swamp => "trees",
            Terrain::Desert | Terrain::Snow => "rocks",
            Terrain::Urban => "buildings",
        }
    }
}

/// A static circular obstacle (tree, rock, building)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
    /// Terrain the obstacle was generated for (drives its look)
    pub kind: Terrain,
}

/// Winding river polyline. Also an exclusion zone for obstacles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct River {
    pub points: Vec<Vec2>,
    pub width: f32,
}

impl River {
    /// Sinusoidal river spanning the world width
    pub fn across(width: f32, height: f32) -> Self {
        let last = (RIVER_POINTS - 1) as f32;
        let points = (0..RIVER_POINTS)
            .map(|i| {
                let i = i as f32;
                Vec2::new(
                    i / last * width,
                    height / 2.0 + (i * 0.8).sin() * RIVER_AMPLITUDE,
                )
            })
            .collect();
        Self {
            points,
            width: RIVER_WIDTH,
        }
    }

    /// True if `pos` is within the river width of any river point
    pub fn excludes(&self, pos: Vec2) -> bool {
        self.points.iter().any(|p| pos.distance(*p) < self.width)
    }
}

/// Region kept clear of obstacles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub center: Vec2,
    pub radius: f32,
}

impl SafeZone {
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.distance(self.center) < self.radius
    }
}

/// World centre and two opposite corners
pub fn safe_zones(width: f32, height: f32) -> [SafeZone; 3] {
    [
        SafeZone {
            center: Vec2::new(width / 2.0, height / 2.0),
            radius: CENTER_SAFE_RADIUS,
        },
        SafeZone {
            center: Vec2::new(CORNER_SAFE_INSET, CORNER_SAFE_INSET),
            radius: CORNER_SAFE_RADIUS,
        },
        SafeZone {
            center: Vec2::new(width - CORNER_SAFE_INSET, height - CORNER_SAFE_INSET),
            radius: CORNER_SAFE_RADIUS,
        },
    ]
}

/// Rebuild obstacles (and the river, if any) for the world's current terrain
pub fn generate_terrain(world: &mut World) {
    world.obstacles.clear();
    world.river = None;

    if world.terrain == Terrain::River {
        world.river = Some(River::across(world.width, world.height));
    }

    let zones = safe_zones(world.width, world.height);
    let target = world.rng.random_range(MIN_OBSTACLES..MAX_OBSTACLES);
    let mut skipped = 0;

    for _ in 0..target {
        let mut placed = None;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                world.rng.random::<f32>() * world.width,
                world.rng.random::<f32>() * world.height,
            );
            let radius = world
                .rng
                .random_range(MIN_OBSTACLE_RADIUS..MAX_OBSTACLE_RADIUS);

            if zones.iter().any(|z| z.contains(pos)) {
                continue;
            }
            if world.river.as_ref().is_some_and(|r| r.excludes(pos)) {
                continue;
            }
            let crowded = world
                .obstacles
                .iter()
                .any(|o| pos.distance(o.pos) < o.radius + radius + OBSTACLE_SPACING);
            if crowded {
                continue;
            }

            placed = Some(Obstacle {
                pos,
                radius,
                kind: world.terrain,
            });
            break;
        }

        match placed {
            Some(obstacle) => world.obstacles.push(obstacle),
            None => skipped += 1,
        }
    }

    log::info!(
        "Generated {} terrain: {} {} ({} skipped)",
        world.terrain.name(),
        world.obstacles.len(),
        world.terrain.obstacle_noun(),
        skipped
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_thresholds() {
        assert_eq!(Terrain::for_level(1), Terrain::Forest);
        assert_eq!(Terrain::for_level(4), Terrain::River);
        assert_eq!(Terrain::for_level(7), Terrain::Desert);
        assert_eq!(Terrain::for_level(10), Terrain::Snow);
        assert_eq!(Terrain::for_level(13), Terrain::Urban);
        assert_eq!(Terrain::for_level(16), Terrain::Swamp);
        assert_eq!(Terrain::for_level(20), Terrain::Urban);
    }

    #[test]
    fn test_terrain_rotation_between_thresholds() {
        assert_eq!(Terrain::for_level(2), Terrain::Forest);
        assert_eq!(Terrain::for_level(5), Terrain::River);
        assert_eq!(Terrain::for_level(9), Terrain::Desert);
        // (19 - 1) / 3 = 6 wraps back to the first theme
        assert_eq!(Terrain::for_level(19), Terrain::Forest);
    }

    #[test]
    fn test_river_shape() {
        let river = River::across(1000.0, 800.0);
        assert_eq!(river.points.len(), RIVER_POINTS);
        assert_eq!(river.points[0], Vec2::new(0.0, 400.0));
        assert!((river.points[10].x - 1000.0).abs() < 1e-3);
        assert!(river.excludes(Vec2::new(0.0, 430.0)));
        assert!(!river.excludes(Vec2::new(0.0, 470.0)));
    }

    #[test]
    fn test_generated_obstacles_respect_constraints() {
        for seed in 0..8 {
            let mut world = World::new(1200.0, 800.0, seed);
            world.terrain = Terrain::River;
            generate_terrain(&mut world);

            assert!(world.obstacles.len() < MAX_OBSTACLES as usize);
            let river = world.river.as_ref().expect("river terrain has a river");
            let zones = safe_zones(world.width, world.height);

            for (i, a) in world.obstacles.iter().enumerate() {
                assert!(a.radius >= MIN_OBSTACLE_RADIUS && a.radius < MAX_OBSTACLE_RADIUS);
                assert!(zones.iter().all(|z| !z.contains(a.pos)));
                assert!(!river.excludes(a.pos));
                for b in &world.obstacles[i + 1..] {
                    assert!(a.pos.distance(b.pos) >= a.radius + b.radius + OBSTACLE_SPACING);
                }
            }
        }
    }

    #[test]
    fn test_non_river_terrain_has_no_river() {
        let mut world = World::new(1200.0, 800.0, 3);
        world.terrain = Terrain::Snow;
        generate_terrain(&mut world);
        assert!(world.river.is_none());
        assert!(world.obstacles.iter().all(|o| o.kind == Terrain::Snow));
    }
}
