//! Level director: difficulty table, spawning and level progression

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::overlaps_obstacle;
use super::enemy::{Enemy, EnemyKind};
use super::explosive::detonate;
use super::player::Player;
use super::powerup::{Powerup, PowerupKind};
use super::schedule::ScheduledEvent;
use super::state::{GameEvent, GamePhase, World};
use super::terrain::{Terrain, generate_terrain};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::heading;
use crate::ui::NotificationTone;

/// Spawn counts for one level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub tanks: u32,
    pub infantry: u32,
    pub powerups: u32,
}

impl LevelConfig {
    pub const fn new(tanks: u32, infantry: u32, powerups: u32) -> Self {
        Self {
            tanks,
            infantry,
            powerups,
        }
    }
}

const DEFAULT_LEVELS: [LevelConfig; FINAL_LEVEL as usize] = [
    LevelConfig::new(1, 2, 3),
    LevelConfig::new(2, 3, 3),
    LevelConfig::new(2, 4, 3),
    LevelConfig::new(3, 4, 4),
    LevelConfig::new(3, 5, 4),
    LevelConfig::new(4, 5, 4),
    LevelConfig::new(4, 6, 5),
    LevelConfig::new(5, 6, 5),
    LevelConfig::new(5, 7, 5),
    LevelConfig::new(6, 7, 6),
    LevelConfig::new(6, 8, 6),
    LevelConfig::new(7, 8, 6),
    LevelConfig::new(7, 9, 7),
    LevelConfig::new(8, 9, 7),
    LevelConfig::new(8, 10, 7),
    LevelConfig::new(9, 10, 8),
    LevelConfig::new(9, 11, 8),
    LevelConfig::new(10, 11, 8),
    LevelConfig::new(10, 12, 9),
    LevelConfig::new(12, 15, 10),
];

/// Level index (1-based) to spawn counts. Levels past the end use the last row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.to_vec(),
        }
    }
}

impl LevelTable {
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn config_for(&self, level: u32) -> LevelConfig {
        let index = (level.max(1) as usize - 1).min(self.levels.len().saturating_sub(1));
        self.levels.get(index).copied().unwrap_or_default()
    }
}

/// Begin a fresh run on level 1 with forest terrain
pub fn start_game(world: &mut World) {
    world.level = 1;
    world.score = 0;
    world.enemies.clear();
    world.bullets.clear();
    world.powerups.clear();
    world.explosives.clear();

    world.terrain = Terrain::Forest;
    generate_terrain(world);

    let spawn = world.find_safe_spawn_position();
    world.player = Some(Player::new(spawn));
    world.phase = GamePhase::Playing;

    log::info!("Game started (seed {})", world.seed());
    load_level(world, 1);
}

/// Populate `level`. Level 1 keeps existing terrain so a fresh run plays on
/// the map the player spawned into.
pub fn load_level(world: &mut World, level: u32) {
    log::info!("Loading level {}", level);

    if let Some(token) = world.completion_check.take() {
        world.schedule.cancel(token);
    }
    world.level = level;
    world.level_started = false;
    world.enemies.clear();
    world.bullets.clear();
    world.powerups.clear();
    world.emergency_ammo_dropped = false;
    world.emergency_ammo_cooldown = 0.0;

    if level != 1 || world.obstacles.is_empty() {
        world.terrain = Terrain::for_level(level);
        generate_terrain(world);
        relocate_player_if_buried(world);
    }

    let config = world.levels.config_for(level);
    for _ in 0..config.tanks {
        spawn_enemy(world, EnemyKind::Tank);
    }
    for _ in 0..config.infantry {
        spawn_enemy(world, EnemyKind::Infantry);
    }
    world.level_started = !world.enemies.is_empty();
    for _ in 0..config.powerups {
        spawn_powerup(world, None);
    }

    log::info!(
        "Level {} on {}: {} enemies, {} powerups",
        level,
        world.terrain.name(),
        world.enemies.len(),
        world.powerups.len()
    );

    let terrain = world.terrain;
    world.emit(GameEvent::LevelLoaded { level, terrain });
    world.notify(
        format!("LEVEL {}\n{}", level, terrain.name()),
        3000.0,
        NotificationTone::Info,
    );
    world.stats_changed();
}

/// New obstacles may land on top of a surviving player, who could then never
/// move again
fn relocate_player_if_buried(world: &mut World) {
    let buried = world
        .player
        .as_ref()
        .is_some_and(|p| overlaps_obstacle(p.pos, p.size, 0.0, &world.obstacles));
    if !buried {
        return;
    }
    let spawn = world.find_safe_spawn_position();
    if let Some(player) = world.player.as_mut() {
        log::debug!("Player buried by new terrain, moved to ({:.0}, {:.0})", spawn.x, spawn.y);
        player.pos = spawn;
    }
}

/// Place an enemy by rejection sampling; falls back to an unchecked position
pub fn spawn_enemy(world: &mut World, kind: EnemyKind) -> u32 {
    let mut sampled = None;
    for _ in 0..SPAWN_ATTEMPTS {
        let pos = world.random_point(SPAWN_TEST_RADIUS);
        if !world.is_position_blocked(pos, SPAWN_TEST_RADIUS) {
            sampled = Some(pos);
            break;
        }
    }

    let pos = match sampled {
        Some(pos) => pos,
        None => {
            log::warn!(
                "No clear spawn for {} after {} attempts",
                kind.name(),
                SPAWN_ATTEMPTS
            );
            world.random_point(50.0)
        }
    };

    let id = world.next_entity_id();
    world.enemies.push(Enemy::new(id, kind, pos));
    log::debug!("Spawned {} {} at ({:.0}, {:.0})", kind.name(), id, pos.x, pos.y);
    id
}

/// Place a powerup of `kind` (random when None). Falls back to the last
/// sampled position.
pub fn spawn_powerup(world: &mut World, kind: Option<PowerupKind>) -> u32 {
    let mut pos = world.random_point(POWERUP_SIZE + 4.0);
    for _ in 1..SPAWN_ATTEMPTS {
        if !world.is_position_blocked(pos, SPAWN_TEST_RADIUS) {
            break;
        }
        pos = world.random_point(POWERUP_SIZE + 4.0);
    }

    let kind = kind.unwrap_or_else(|| {
        let index = world.rng.random_range(0..PowerupKind::ALL.len());
        PowerupKind::ALL[index]
    });
    let id = world.next_entity_id();
    world.powerups.push(Powerup::new(id, kind, pos));
    id
}

/// Arm or disarm the debounced completion check for this frame
pub fn track_completion(world: &mut World) {
    let cleared = world.phase == GamePhase::Playing
        && world.level_started
        && world.live_enemy_count() == 0;

    if cleared {
        if world.completion_check.is_none() {
            let token = world
                .schedule
                .schedule(COMPLETION_DEBOUNCE_MS, ScheduledEvent::LevelCompletionCheck);
            world.completion_check = Some(token);
        }
    } else if let Some(token) = world.completion_check.take() {
        world.schedule.cancel(token);
    }
}

/// Award the level bonus and move on. Ignored unless playing.
pub fn complete_level(world: &mut World) {
    if world.phase != GamePhase::Playing {
        log::debug!("Level completion ignored in {:?}", world.phase);
        return;
    }

    let completed = world.level;
    world.score += 1000 * completed as u64;
    world.play(SoundEffect::LevelUp);
    world.notify(
        format!("LEVEL {} COMPLETE!", completed),
        2000.0,
        NotificationTone::Success,
    );
    log::info!("Level {} complete, score {}", completed, world.score);

    if completed >= FINAL_LEVEL {
        end_game(world, true);
    } else {
        world.phase = GamePhase::LevelTransition;
        world.level = completed + 1;
        world
            .schedule
            .schedule(LEVEL_TRANSITION_MS, ScheduledEvent::LoadNextLevel);
    }
    world.stats_changed();
}

/// Finish the run
pub fn end_game(world: &mut World, won: bool) {
    world.phase = GamePhase::GameOver { won };
    world.play(if won {
        SoundEffect::GameWin
    } else {
        SoundEffect::GameOver
    });
    log::info!(
        "Game {} on level {} with score {}",
        if won { "won" } else { "over" },
        world.level,
        world.score
    );
    world.emit(GameEvent::GameEnded {
        won,
        score: world.score,
        level: world.level,
    });
}

pub fn check_game_over(world: &mut World) {
    let out_of_lives = world.player.as_ref().is_some_and(|p| p.lives == 0);
    if world.phase == GamePhase::Playing && out_of_lives {
        end_game(world, false);
    }
}

/// Dispatch a timer that came due
pub fn handle_scheduled(world: &mut World, event: ScheduledEvent) {
    match event {
        ScheduledEvent::LevelCompletionCheck => {
            world.completion_check = None;
            let player_alive = world.player.as_ref().is_some_and(|p| p.lives > 0);
            if world.phase == GamePhase::Playing
                && player_alive
                && world.live_enemy_count() == 0
            {
                complete_level(world);
            }
        }
        ScheduledEvent::LoadNextLevel => {
            if world.phase == GamePhase::LevelTransition {
                world.phase = GamePhase::Playing;
                let level = world.level;
                load_level(world, level);
            }
        }
        ScheduledEvent::Detonate(id) => {
            detonate(world, id);
        }
    }
}

/// Emergency ammo when the player runs dry, plus random ambient drops
pub fn drop_supplies(world: &mut World, dt_ms: f32) {
    if world.emergency_ammo_cooldown > 0.0 {
        world.emergency_ammo_cooldown -= dt_ms;
    }

    let Some(ammo) = world.player.as_ref().map(|p| p.ammo) else {
        return;
    };

    if ammo == 0 && !world.emergency_ammo_dropped && world.emergency_ammo_cooldown <= 0.0 {
        drop_emergency_ammo(world);
    }
    if ammo > 0 {
        world.emergency_ammo_dropped = false;
    }

    if ammo < 10 {
        if world.rng.random::<f32>() < 0.002 {
            spawn_powerup(world, Some(PowerupKind::Ammo));
        }
    } else if world.rng.random::<f32>() < 0.0005 {
        spawn_powerup(world, None);
    }
}

fn drop_emergency_ammo(world: &mut World) {
    let Some(center) = world.player.as_ref().map(|p| p.pos) else {
        return;
    };
    for i in 0..2 {
        let angle = PI * i as f32 + world.rng.random::<f32>() * 0.5;
        let distance = 80.0 + world.rng.random::<f32>() * 40.0;
        let raw = center + heading(angle) * distance;
        let pos = Vec2::new(
            raw.x.clamp(20.0, world.width - 20.0),
            raw.y.clamp(20.0, world.height - 20.0),
        );
        let id = world.next_entity_id();
        world.powerups.push(Powerup::new(id, PowerupKind::Ammo, pos));
    }

    world.emergency_ammo_dropped = true;
    world.emergency_ammo_cooldown = EMERGENCY_AMMO_COOLDOWN_MS;
    log::info!("Emergency ammo dropped");
    world.notify("EMERGENCY AMMO DROPPED!", 2000.0, NotificationTone::Warning);
}
