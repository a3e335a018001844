//! Enemy units and their AI
//!
//! Tanks and infantry share one record; everything that differs between them
//! lives in a per-kind stats table. Each tick an enemy:
//! 1. re-evaluates whether it can see the player (range, line of sight, stealth)
//! 2. steps its alert state: Combat pre-empts Search pre-empts Patrol
//! 3. turns toward its goal, fires if in range, then tries to move

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, BulletOwner};
use super::collision::{clamp_to_bounds, line_of_sight, overlaps_obstacle};
use super::state::World;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::{angle_between, heading};

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Tank,
    Infantry,
}

/// Per-kind constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: u32,
    /// Pixels per second
    pub speed: f32,
    /// Collision radius
    pub size: f32,
    pub shoot_delay_ms: f32,
    pub attack_range: f32,
    pub sight_range: f32,
    pub score_value: u64,
    /// How much closer than the radius sum this unit may get to obstacles
    pub obstacle_tolerance: f32,
    /// Has a walk cycle
    pub animated: bool,
}

const TANK_STATS: EnemyStats = EnemyStats {
    health: 12,
    speed: 30.0,
    size: 24.0,
    shoot_delay_ms: 1500.0,
    attack_range: 250.0,
    sight_range: 200.0,
    score_value: 200,
    obstacle_tolerance: 0.0,
    animated: false,
};

const INFANTRY_STATS: EnemyStats = EnemyStats {
    health: 6,
    speed: 80.0,
    size: 12.0,
    shoot_delay_ms: 800.0,
    attack_range: 180.0,
    sight_range: 160.0,
    score_value: 100,
    obstacle_tolerance: 5.0,
    animated: true,
};

impl EnemyKind {
    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Tank => &TANK_STATS,
            EnemyKind::Infantry => &INFANTRY_STATS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Tank => "tank",
            EnemyKind::Infantry => "infantry",
        }
    }
}

/// AI state ordinal: 0 patrol, 1 search, 2 combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Patrol = 0,
    Search = 1,
    Combat = 2,
}

/// An AI-controlled unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// Facing (radians)
    pub angle: f32,
    pub alert: AlertLevel,
    pub last_seen: Vec2,
    pub search_timer: f32,
    pub shoot_cooldown: f32,
    pub patrol_target: Vec2,
    pub stuck: bool,
    pub stuck_time: f32,
    pub anim_time: f32,
    pub anim_frame: u32,
}

impl Enemy {
    /// New unit at `pos`. Its first patrol target is its own position, so it
    /// picks a real one on its first tick.
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            pos,
            health: stats.health,
            max_health: stats.health,
            angle: 0.0,
            alert: AlertLevel::Patrol,
            last_seen: pos,
            search_timer: 0.0,
            shoot_cooldown: 0.0,
            patrol_target: pos,
            stuck: false,
            stuck_time: 0.0,
            anim_time: 0.0,
            anim_frame: 0,
        }
    }

    pub fn stats(&self) -> &'static EnemyStats {
        self.kind.stats()
    }

    pub fn size(&self) -> f32 {
        self.stats().size
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health fraction for the health bar
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health.max(1) as f32
    }

    /// Reduce health (clamped at 0). Returns true only on the killing hit.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.health == 0 {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }

    /// Turn to face `target` unless already on top of it
    fn face(&mut self, target: Vec2) {
        if self.pos.distance(target) > 5.0 {
            self.angle = angle_between(self.pos, target);
        }
    }

    /// Movement check against obstacles with this kind's tolerance
    pub fn can_move_to(&self, pos: Vec2, world: &World) -> bool {
        let stats = self.stats();
        !overlaps_obstacle(pos, stats.size, stats.obstacle_tolerance, &world.obstacles)
    }

    /// Step the alert state from the current view of the player
    fn perceive(&mut self, world: &World, dt_ms: f32) {
        let sighting = world.player.as_ref().and_then(|player| {
            let in_range = self.pos.distance(player.pos) < self.stats().sight_range;
            let visible = in_range
                && !player.hidden
                && line_of_sight(self.pos, player.pos, &world.obstacles);
            visible.then_some(player.pos)
        });

        match (sighting, self.alert) {
            (Some(player_pos), _) => {
                self.alert = AlertLevel::Combat;
                self.last_seen = player_pos;
                self.search_timer = SEARCH_DURATION_MS;
            }
            (None, AlertLevel::Combat) => {
                self.alert = AlertLevel::Search;
                self.search_timer = SEARCH_DURATION_MS;
            }
            (None, AlertLevel::Search) => {
                self.search_timer -= dt_ms;
            }
            (None, AlertLevel::Patrol) => {}
        }
    }

    fn tick_timers(&mut self, dt_ms: f32) {
        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt_ms;
        }
        if self.stuck {
            self.stuck_time += dt_ms;
        }
    }

    /// Try to step forward along the facing angle
    fn step(&mut self, world: &World, dt_ms: f32) {
        let stats = self.stats();
        let next = self.pos + heading(self.angle) * stats.speed * (dt_ms / 1000.0);

        if self.can_move_to(next, world) {
            self.pos = next;
            self.stuck = false;
            self.stuck_time = 0.0;
            if stats.animated {
                self.anim_time += dt_ms;
                self.anim_frame = (self.anim_time / 200.0) as u32 % 4;
            }
        } else {
            self.stuck = true;
        }

        self.pos = clamp_to_bounds(self.pos, stats.size, world.width, world.height);
    }

    fn fire(&self, id: u32) -> Bullet {
        let dir = heading(self.angle);
        Bullet::new(
            id,
            self.pos + dir * (self.size() + MUZZLE_OFFSET),
            dir * ENEMY_BULLET_SPEED,
            BulletOwner::Enemy,
        )
    }
}

/// Pick a fresh patrol point by rejection sampling. Falls back to the last
/// candidate if every attempt was blocked.
pub fn choose_patrol_target(world: &mut World) -> Vec2 {
    let mut candidate = Vec2::ZERO;
    for _ in 0..PATROL_ATTEMPTS {
        candidate = Vec2::new(
            world.rng.random::<f32>() * world.width,
            world.rng.random::<f32>() * world.height,
        );
        if !world.is_position_blocked(candidate, SPAWN_TEST_RADIUS) {
            break;
        }
    }
    candidate
}

/// Run AI and movement for one enemy
pub fn update_enemy(enemy: &mut Enemy, world: &mut World, dt_ms: f32) {
    if !enemy.is_alive() {
        return;
    }

    enemy.perceive(world, dt_ms);

    if enemy.alert == AlertLevel::Search && enemy.search_timer <= 0.0 {
        enemy.alert = AlertLevel::Patrol;
        enemy.patrol_target = choose_patrol_target(world);
    }

    match enemy.alert {
        AlertLevel::Combat => {
            if let Some(player) = world.player.as_ref() {
                let player_pos = player.pos;
                enemy.face(player_pos);
                let in_range = enemy.pos.distance(player_pos) < enemy.stats().attack_range;
                if in_range && enemy.shoot_cooldown <= 0.0 {
                    let id = world.next_entity_id();
                    world.bullets.push(enemy.fire(id));
                    enemy.shoot_cooldown = enemy.stats().shoot_delay_ms;
                    world.play(SoundEffect::EnemyShoot);
                }
            }
        }
        AlertLevel::Search => enemy.face(enemy.last_seen),
        AlertLevel::Patrol => {
            if enemy.pos.distance(enemy.patrol_target) < PATROL_ARRIVE_DISTANCE {
                enemy.patrol_target = choose_patrol_target(world);
            } else {
                enemy.face(enemy.patrol_target);
            }
        }
    }

    enemy.tick_timers(dt_ms);
    if enemy.stuck && enemy.stuck_time > STUCK_TIMEOUT_MS {
        enemy.patrol_target = choose_patrol_target(world);
        enemy.stuck = false;
        enemy.stuck_time = 0.0;
    }

    enemy.step(world, dt_ms);
}

/// Update every enemy against the world as it stood at the start of the pass
pub fn update_enemies(world: &mut World, dt_ms: f32) {
    let mut enemies = std::mem::take(&mut world.enemies);
    for enemy in enemies.iter_mut() {
        update_enemy(enemy, world, dt_ms);
    }
    enemies.append(&mut world.enemies);
    world.enemies = enemies;
}
