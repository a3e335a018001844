//! Bullets and the per-frame bullet pass

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, point_hits_obstacle, within_bounds};
use super::state::World;
use crate::consts::*;

/// Who fired a bullet; decides what it can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub owner: BulletOwner,
    pub size: f32,
    pub damage: u32,
    /// Total path length so far
    pub traveled: f32,
    pub max_distance: f32,
    /// Last positions, oldest first
    #[serde(skip)]
    pub trail: VecDeque<Vec2>,
    pub active: bool,
}

impl Bullet {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, owner: BulletOwner) -> Self {
        Self {
            id,
            pos,
            vel,
            owner,
            size: BULLET_SIZE,
            damage: BULLET_DAMAGE,
            traveled: 0.0,
            max_distance: BULLET_MAX_DISTANCE,
            trail: VecDeque::with_capacity(BULLET_TRAIL_LENGTH + 1),
            active: true,
        }
    }

    /// Integrate position, record the trail and accumulate travel
    pub fn advance(&mut self, dt_ms: f32) {
        let secs = dt_ms / 1000.0;
        self.pos += self.vel * secs;

        self.trail.push_back(self.pos);
        if self.trail.len() > BULLET_TRAIL_LENGTH {
            self.trail.pop_front();
        }

        self.traveled += self.vel.length() * secs;
    }

    /// Out of bounds, out of range or inside an obstacle
    fn expired(&self, world: &World) -> bool {
        !within_bounds(self.pos, world.width, world.height)
            || self.traveled > self.max_distance
            || point_hits_obstacle(self.pos, &world.obstacles)
    }
}

/// Advance every live bullet.
///
/// Player bullets damage the newest overlapping enemy; a killed enemy leaves the
/// enemy list immediately so later bullets this frame cannot hit it again.
/// Enemy bullets only move here: contact with the player is resolved by the
/// player's collision pass, which applies the damage exactly once.
pub fn update_bullets(world: &mut World, dt_ms: f32) {
    let mut bullets = std::mem::take(&mut world.bullets);

    for bullet in bullets.iter_mut().filter(|b| b.active) {
        bullet.advance(dt_ms);

        if bullet.expired(world) {
            bullet.active = false;
            continue;
        }

        if bullet.owner == BulletOwner::Player {
            let target = world
                .enemies
                .iter()
                .rposition(|e| e.is_alive() && circles_overlap(bullet.pos, bullet.size, e.pos, e.size()));
            if let Some(index) = target {
                bullet.active = false;
                if world.damage_enemy(index, bullet.damage) {
                    world.enemies.remove(index);
                }
            }
        }
    }

    // Keep anything spawned while the list was taken
    bullets.append(&mut world.bullets);
    world.bullets = bullets;
}
