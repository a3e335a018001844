//! World state owned by a play session
//!
//! One `World` lives from "start game" until the session returns to the menu.
//! Subsystems receive it by `&mut` reference; nothing is global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::collision::point_hits_obstacle;
use super::director::LevelTable;
use super::enemy::Enemy;
use super::explosive::Explosive;
use super::player::Player;
use super::powerup::Powerup;
use super::schedule::{Scheduler, TimerToken};
use super::terrain::{Obstacle, River, Terrain};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::ui::NotificationTone;

/// Global game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No active play; the world is idle
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen until unpaused
    Paused,
    /// Level cleared, next level loads after a short banner
    LevelTransition,
    /// Run ended (won = cleared the final level)
    GameOver { won: bool },
}

/// Side effects the simulation asks its collaborators to perform.
/// Drained by the session after every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Fire-and-forget sound cue
    Sound(SoundEffect),
    /// Health, ammo, TNT, lives, score or level changed
    StatsChanged,
    /// Transient on-screen message
    Notify {
        message: String,
        duration_ms: f32,
        tone: NotificationTone,
    },
    /// A level finished loading
    LevelLoaded { level: u32, terrain: Terrain },
    /// Run finished; the leaderboard should record it
    GameEnded { won: bool, score: u64, level: u32 },
}

/// Complete simulation state for one play session
#[derive(Debug, Clone)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub terrain: Terrain,
    /// Present only on river terrain
    pub river: Option<River>,
    pub obstacles: Vec<Obstacle>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<Powerup>,
    pub explosives: Vec<Explosive>,
    /// Absent outside active play
    pub player: Option<Player>,
    pub score: u64,
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    /// Set on load when at least one enemy spawned; gates completion
    pub level_started: bool,
    pub levels: LevelTable,
    pub schedule: Scheduler,
    /// Pending debounced completion check
    pub completion_check: Option<TimerToken>,
    pub emergency_ammo_dropped: bool,
    pub emergency_ammo_cooldown: f32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    seed: u64,
    next_id: u32,
}

impl World {
    /// Create an idle world (menu phase, no player)
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self {
            width,
            height,
            terrain: Terrain::Forest,
            river: None,
            obstacles: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            explosives: Vec::new(),
            player: None,
            score: 0,
            level: 1,
            phase: GamePhase::Menu,
            level_started: false,
            levels: LevelTable::default(),
            schedule: Scheduler::new(),
            completion_check: None,
            emergency_ammo_dropped: false,
            emergency_ammo_cooldown: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            next_id: 1,
        }
    }

    /// Seed the world RNG was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, effect: SoundEffect) {
        self.events.push(GameEvent::Sound(effect));
    }

    pub fn stats_changed(&mut self) {
        self.events.push(GameEvent::StatsChanged);
    }

    pub fn notify(&mut self, message: impl Into<String>, duration_ms: f32, tone: NotificationTone) {
        self.events.push(GameEvent::Notify {
            message: message.into(),
            duration_ms,
            tone,
        });
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Uniform random point at least `margin` away from every edge
    pub fn random_point(&mut self, margin: f32) -> Vec2 {
        let span_x = (self.width - 2.0 * margin).max(0.0);
        let span_y = (self.height - 2.0 * margin).max(0.0);
        Vec2::new(
            self.rng.random::<f32>() * span_x + margin,
            self.rng.random::<f32>() * span_y + margin,
        )
    }

    /// Spawn-placement test: too close to an obstacle or to the player
    pub fn is_position_blocked(&self, pos: Vec2, radius: f32) -> bool {
        let near_obstacle = self
            .obstacles
            .iter()
            .any(|o| pos.distance(o.pos) < o.radius + radius);
        if near_obstacle {
            return true;
        }
        self.player
            .as_ref()
            .is_some_and(|p| pos.distance(p.pos) < radius + SPAWN_TEST_RADIUS)
    }

    /// Position for the player, well clear of obstacles.
    /// Falls back to the world centre if sampling fails.
    pub fn find_safe_spawn_position(&mut self) -> Vec2 {
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = self.random_point(100.0);
            let clear = self
                .obstacles
                .iter()
                .all(|o| pos.distance(o.pos) >= o.radius + 60.0);
            if clear {
                return pos;
            }
        }
        log::warn!("No safe spawn found, using world centre");
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True if a sample point is inside some obstacle footprint
    pub fn point_blocked(&self, pos: Vec2) -> bool {
        point_hits_obstacle(pos, &self.obstacles)
    }

    /// Number of enemies still alive
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Apply damage to the enemy at `index`. Returns true if this hit killed it,
    /// in which case the kill score is awarded and the death cue queued.
    pub fn damage_enemy(&mut self, index: usize, amount: u32) -> bool {
        let Some(enemy) = self.enemies.get_mut(index) else {
            return false;
        };
        if !enemy.take_damage(amount) {
            return false;
        }
        let value = enemy.stats().score_value;
        self.score += value;
        self.play(SoundEffect::EnemyDeath);
        self.stats_changed();
        true
    }

    /// Drop everything that died or expired this frame
    pub fn cull(&mut self) {
        self.bullets.retain(|b| b.active);
        self.enemies.retain(|e| e.is_alive());
        self.powerups.retain(|p| p.active);
        self.explosives.retain(|x| x.active);
    }
}
