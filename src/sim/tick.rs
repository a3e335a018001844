//! Per-frame simulation step
//!
//! Advances the world by one variable-length frame. Every subsystem updates
//! against the world as it stood when its pass began; removals happen in one
//! cull after all of them have run.

use super::bullet::update_bullets;
use super::director;
use super::enemy::update_enemies;
use super::explosive::detonate_all;
use super::player::{player_place_tnt, player_shoot, update_player};
use super::state::{GamePhase, World};
use crate::input::KeyState;
use crate::ui::NotificationTone;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement, turret and stealth keys
    pub keys: KeyState,
    /// Fire the turret (one-shot)
    pub shoot: bool,
    /// Drop a TNT charge (one-shot)
    pub place_tnt: bool,
    /// Set off every placed charge (one-shot)
    pub detonate: bool,
    /// Pause toggle
    pub pause: bool,
    /// Multiplayer invite; only acknowledged
    pub call_for_help: bool,
}

/// Advance the world by `dt_ms` milliseconds
pub fn tick(world: &mut World, input: &TickInput, dt_ms: f32) {
    if input.pause {
        match world.phase {
            GamePhase::Playing => {
                world.phase = GamePhase::Paused;
                log::info!("Paused");
            }
            GamePhase::Paused => {
                world.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    // Clock only runs while the game is live
    if !matches!(world.phase, GamePhase::Playing | GamePhase::LevelTransition) {
        return;
    }
    world.schedule.advance(dt_ms);

    if world.phase == GamePhase::Playing {
        if input.shoot {
            player_shoot(world);
        }
        if input.place_tnt {
            player_place_tnt(world);
        }
        if input.detonate {
            detonate_all(world);
        }
        if input.call_for_help {
            call_for_help(world);
        }

        update_player(world, &input.keys, dt_ms);
        update_enemies(world, dt_ms);
        update_bullets(world, dt_ms);
        for powerup in world.powerups.iter_mut() {
            powerup.update(dt_ms);
        }

        // A run lost this frame must not also clear the level
        director::check_game_over(world);
    }

    for event in world.schedule.drain_due() {
        director::handle_scheduled(world, event);
    }

    world.cull();

    director::track_completion(world);
    director::check_game_over(world);

    if world.phase == GamePhase::Playing {
        director::drop_supplies(world, dt_ms);
    }
}

fn call_for_help(world: &mut World) {
    log::info!("Calling for multiplayer help");
    world.notify("MULTIPLAYER INVITE SENT!", 2000.0, NotificationTone::Info);
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::*;
    use crate::input::Key;
    use crate::sim::GameEvent;
    use crate::sim::bullet::{Bullet, BulletOwner};
    use crate::sim::director::{LevelConfig, LevelTable, start_game};
    use crate::sim::explosive::place_explosive;

    fn playing_world(seed: u64) -> World {
        let mut world = World::new(WORLD_WIDTH, WORLD_HEIGHT, seed);
        start_game(&mut world);
        world
    }

    fn run(world: &mut World, input: &TickInput, frames: usize, dt_ms: f32) {
        for _ in 0..frames {
            tick(world, input, dt_ms);
        }
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut world = playing_world(12);
        world.bullets.push(Bullet::new(
            999,
            Vec2::new(600.0, 10.0),
            Vec2::new(100.0, 0.0),
            BulletOwner::Enemy,
        ));
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &pause, 16.0);
        assert_eq!(world.phase, GamePhase::Paused);

        let clock = world.schedule.now();
        let pos = world.bullets[0].pos;
        let enemies: Vec<Vec2> = world.enemies.iter().map(|e| e.pos).collect();
        run(&mut world, &TickInput::default(), 30, 16.0);
        assert_eq!(world.schedule.now(), clock);
        assert_eq!(world.bullets[0].pos, pos);
        assert_eq!(world.enemies.iter().map(|e| e.pos).collect::<Vec<_>>(), enemies);

        tick(&mut world, &pause, 16.0);
        assert_eq!(world.phase, GamePhase::Playing);
    }

    #[test]
    fn test_paused_fuse_does_not_burn() {
        let mut world = playing_world(12);
        let at = world.player.as_ref().unwrap().pos;
        place_explosive(&mut world, at);
        world.phase = GamePhase::Paused;
        run(&mut world, &TickInput::default(), 200, 100.0);
        assert_eq!(world.explosives.len(), 1);
        assert!(world.explosives[0].active);
    }

    #[test]
    fn test_fuse_detonates_on_schedule() {
        let mut world = playing_world(12);
        // Far corner, away from the player
        place_explosive(&mut world, Vec2::new(5.0, 5.0));
        run(&mut world, &TickInput::default(), 99, 100.0);
        assert_eq!(world.explosives.len(), 1);
        tick(&mut world, &TickInput::default(), 100.0);
        assert!(world.explosives.is_empty());
    }

    #[test]
    fn test_fuse_blink_keeps_pace_during_transition() {
        let mut world = playing_world(12);
        place_explosive(&mut world, Vec2::new(5.0, 5.0));
        world.phase = GamePhase::LevelTransition;
        run(&mut world, &TickInput::default(), 81, 100.0);
        assert!(world.explosives[0].is_blinking(&world.schedule));
    }

    #[test]
    fn test_shoot_action_spawns_player_bullet() {
        let mut world = playing_world(3);
        world.drain_events();
        let input = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut world, &input, 16.0);
        assert_eq!(world.player.as_ref().unwrap().ammo, PLAYER_MAX_AMMO - 1);
        assert!(
            world
                .drain_events()
                .contains(&GameEvent::Sound(crate::audio::SoundEffect::Shoot))
        );
    }

    #[test]
    fn test_actions_ignored_outside_play() {
        let mut world = playing_world(3);
        world.phase = GamePhase::LevelTransition;
        let input = TickInput {
            shoot: true,
            place_tnt: true,
            keys: KeyState::from_keys([Key::Right]),
            ..Default::default()
        };
        let before = world.player.as_ref().unwrap().pos;
        tick(&mut world, &input, 16.0);
        let player = world.player.as_ref().unwrap();
        assert_eq!(player.ammo, PLAYER_MAX_AMMO);
        assert_eq!(player.tnt, PLAYER_START_TNT);
        assert_eq!(player.pos, before);
    }

    #[test]
    fn test_clearing_level_advances_after_debounce() {
        let mut world = World::new(WORLD_WIDTH, WORLD_HEIGHT, 40);
        world.levels = LevelTable::new(vec![LevelConfig::new(2, 3, 0), LevelConfig::new(1, 1, 0)]);
        start_game(&mut world);
        assert_eq!(world.enemies.len(), 5);
        world.score = 0;

        for enemy in world.enemies.iter_mut() {
            enemy.health = 0;
        }
        let idle = TickInput::default();
        tick(&mut world, &idle, 50.0);
        assert_eq!(world.level, 1);
        assert!(world.completion_check.is_some());

        run(&mut world, &idle, 3, 50.0);
        assert_eq!(world.level, 2);
        assert_eq!(world.score, 1000);
        assert_eq!(world.phase, GamePhase::LevelTransition);

        // More frames during the banner do not complete again
        run(&mut world, &idle, 10, 50.0);
        assert_eq!(world.level, 2);
        assert_eq!(world.score, 1000);

        run(&mut world, &idle, 60, 50.0);
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.enemies.len(), 2);
    }

    #[test]
    fn test_death_during_debounce_ends_the_run() {
        let mut world = World::new(WORLD_WIDTH, WORLD_HEIGHT, 40);
        world.levels = LevelTable::new(vec![LevelConfig::new(1, 0, 0), LevelConfig::new(1, 0, 0)]);
        start_game(&mut world);
        world.enemies[0].health = 0;
        let idle = TickInput::default();
        tick(&mut world, &idle, 50.0);
        assert!(world.completion_check.is_some());
        let score = world.score;

        let player = world.player.as_mut().unwrap();
        player.lives = 1;
        player.health = 1;
        player.invulnerable = false;
        player.hidden = false;
        let at = player.pos;
        world
            .bullets
            .push(Bullet::new(900, at, Vec2::new(1.0, 0.0), BulletOwner::Enemy));
        world.drain_events();

        tick(&mut world, &idle, 100.0);
        assert_eq!(world.phase, GamePhase::GameOver { won: false });
        assert_eq!(world.level, 1);
        assert_eq!(world.score, score);
        let ended: Vec<GameEvent> = world
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
            .collect();
        assert_eq!(
            ended,
            vec![GameEvent::GameEnded {
                won: false,
                score,
                level: 1
            }]
        );
    }

    #[test]
    fn test_call_for_help_only_notifies() {
        let mut world = playing_world(3);
        world.drain_events();
        let input = TickInput {
            call_for_help: true,
            ..Default::default()
        };
        tick(&mut world, &input, 16.0);
        let notified = world.drain_events().into_iter().any(|e| {
            matches!(e, GameEvent::Notify { ref message, .. } if message == "MULTIPLAYER INVITE SENT!")
        });
        assert!(notified);
    }
}
