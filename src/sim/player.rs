//! The player's tank: input mapping, damage, respawn and pickups
//!
//! The player's own collision pass is the only place enemy-bullet contact is
//! resolved. A bullet is deactivated in the same step its damage is applied,
//! so each hit lands exactly once.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, BulletOwner};
use super::collision::{circles_overlap, clamp_to_bounds, near_cover, overlaps_obstacle};
use super::explosive::place_explosive;
use super::powerup::PowerupKind;
use super::state::World;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::heading;
use crate::input::{Key, KeyState};
use crate::ui::NotificationTone;

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable or hidden: nothing happened
    Ignored,
    Hurt,
    /// Health reached zero
    Killed,
}

/// The player-controlled tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per second
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub lives: u32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub tnt: u32,
    /// Body facing (radians)
    pub angle: f32,
    /// Turret aim, independent of the body
    pub turret_angle: f32,
    /// In stealth: undetectable and immune to damage
    pub hidden: bool,
    pub invulnerable: bool,
    pub invulnerable_ms: f32,
    pub shoot_cooldown: f32,
    pub tnt_cooldown: f32,
    pub anim_time: f32,
    pub anim_frame: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            lives: PLAYER_START_LIVES,
            ammo: PLAYER_MAX_AMMO,
            max_ammo: PLAYER_MAX_AMMO,
            tnt: PLAYER_START_TNT,
            angle: 0.0,
            turret_angle: 0.0,
            hidden: false,
            invulnerable: false,
            invulnerable_ms: 0.0,
            shoot_cooldown: 0.0,
            tnt_cooldown: 0.0,
            anim_time: 0.0,
            anim_frame: 0,
        }
    }

    /// Apply held keys: turret, movement, facing and stealth
    pub fn steer(&mut self, keys: &KeyState, dt_ms: f32, world: &World) {
        let secs = dt_ms / 1000.0;

        if keys.is_down(Key::TurretLeft) {
            self.turret_angle -= TURRET_ROTATION_SPEED * secs;
        }
        if keys.is_down(Key::TurretRight) {
            self.turret_angle += TURRET_ROTATION_SPEED * secs;
        }

        let step = self.speed * secs;
        let up = keys.is_down(Key::Up);
        let down = keys.is_down(Key::Down);
        let left = keys.is_down(Key::Left);
        let right = keys.is_down(Key::Right);

        // Each axis moves at full speed; diagonals are not normalized
        let mut next = self.pos;
        if up {
            next.y -= step;
        }
        if down {
            next.y += step;
        }
        if left {
            next.x -= step;
        }
        if right {
            next.x += step;
        }
        if let Some(angle) = facing_for(up, down, left, right) {
            self.angle = angle;
        }

        // All-or-nothing: no sliding along obstacles
        if !overlaps_obstacle(next, self.size, 0.0, &world.obstacles) {
            self.pos = next;
        }
        self.pos = clamp_to_bounds(self.pos, self.size, world.width, world.height);

        self.hidden = keys.is_down(Key::Hide)
            && near_cover(self.pos, STEALTH_COVER_DISTANCE, &world.obstacles);
    }

    pub fn tick_timers(&mut self, dt_ms: f32) {
        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt_ms;
        }
        if self.tnt_cooldown > 0.0 {
            self.tnt_cooldown -= dt_ms;
        }
        if self.invulnerable {
            self.invulnerable_ms -= dt_ms;
            if self.invulnerable_ms <= 0.0 {
                self.invulnerable = false;
            }
        }
        self.anim_time += dt_ms;
        self.anim_frame = (self.anim_time / 200.0) as u32 % 4;
    }

    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.invulnerable || self.hidden {
            return DamageOutcome::Ignored;
        }
        self.health = self.health.saturating_sub(amount);
        self.invulnerable = true;
        self.invulnerable_ms = HIT_INVULNERABILITY_MS;
        if self.health == 0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt
        }
    }

    /// Come back at `pos` with full health and ammo and a grace period
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.health = self.max_health;
        self.ammo = self.max_ammo;
        self.hidden = false;
        self.invulnerable = true;
        self.invulnerable_ms = RESPAWN_INVULNERABILITY_MS;
    }

    /// Apply a pickup. Returns the score it is worth.
    pub fn collect(&mut self, kind: PowerupKind) -> u64 {
        match kind {
            PowerupKind::Ammo => {
                self.ammo = (self.ammo + 25).min(self.max_ammo);
                self.tnt = (self.tnt + 1).min(PLAYER_MAX_TNT);
            }
            PowerupKind::Health => {
                self.health = (self.health + 3).min(self.max_health);
            }
            PowerupKind::Life => {
                self.lives += 1;
            }
        }
        kind.score()
    }

    /// Where turret shots leave the barrel
    pub fn muzzle(&self) -> Vec2 {
        self.pos + heading(self.turret_angle) * (self.size + MUZZLE_OFFSET)
    }
}

/// Body facing from the pressed direction keys. Later keys win, diagonal pairs
/// override single directions. None when no direction is held.
pub fn facing_for(up: bool, down: bool, left: bool, right: bool) -> Option<f32> {
    let mut angle = None;
    if up {
        angle = Some(-FRAC_PI_2);
    }
    if down {
        angle = Some(FRAC_PI_2);
    }
    if left {
        angle = Some(PI);
    }
    if right {
        angle = Some(0.0);
    }
    if up && left {
        angle = Some(-3.0 * FRAC_PI_4);
    }
    if up && right {
        angle = Some(-FRAC_PI_4);
    }
    if down && left {
        angle = Some(3.0 * FRAC_PI_4);
    }
    if down && right {
        angle = Some(FRAC_PI_4);
    }
    angle
}

/// Damage the player, handling death and respawn
pub fn damage_player(world: &mut World, amount: u32) {
    let outcome = match world.player.as_mut() {
        Some(player) => player.take_damage(amount),
        None => return,
    };

    match outcome {
        DamageOutcome::Ignored => return,
        DamageOutcome::Hurt => world.play(SoundEffect::Hurt),
        DamageOutcome::Killed => {
            world.play(SoundEffect::Hurt);
            lose_life(world);
        }
    }
    world.stats_changed();
}

fn lose_life(world: &mut World) {
    let lives = match world.player.as_mut() {
        Some(player) => {
            player.lives = player.lives.saturating_sub(1);
            player.lives
        }
        None => return,
    };
    if lives == 0 {
        log::info!("Player destroyed, no lives left");
        return;
    }

    let spawn = world.find_safe_spawn_position();
    if let Some(player) = world.player.as_mut() {
        player.respawn(spawn);
    }
    log::info!("Player respawned, {} lives left", lives);
    world.notify("RESPAWNED!", 2000.0, NotificationTone::Success);
}

/// Fire a turret shot if off cooldown and loaded
pub fn player_shoot(world: &mut World) -> bool {
    let Some(player) = world.player.as_ref() else {
        return false;
    };
    if player.shoot_cooldown > 0.0 || player.ammo == 0 {
        return false;
    }
    let origin = player.muzzle();
    let vel = heading(player.turret_angle) * PLAYER_BULLET_SPEED;

    let id = world.next_entity_id();
    world
        .bullets
        .push(Bullet::new(id, origin, vel, BulletOwner::Player));
    if let Some(player) = world.player.as_mut() {
        player.ammo -= 1;
        player.shoot_cooldown = PLAYER_SHOOT_DELAY_MS;
    }
    world.play(SoundEffect::Shoot);
    world.stats_changed();
    true
}

/// Drop a charge at the player's feet if off cooldown and carrying one
pub fn player_place_tnt(world: &mut World) -> bool {
    let Some(player) = world.player.as_mut() else {
        return false;
    };
    if player.tnt_cooldown > 0.0 || player.tnt == 0 {
        return false;
    }
    player.tnt -= 1;
    player.tnt_cooldown = PLAYER_TNT_DELAY_MS;
    let pos = player.pos;

    place_explosive(world, pos);
    world.play(SoundEffect::TntPlace);
    world.stats_changed();
    true
}

/// Enemy bullets, pickups and body contact with enemies
pub fn resolve_player_contacts(world: &mut World) {
    for index in 0..world.bullets.len() {
        let Some((pos, size)) = world.player.as_ref().map(|p| (p.pos, p.size)) else {
            return;
        };
        let bullet = &world.bullets[index];
        if bullet.active
            && bullet.owner == BulletOwner::Enemy
            && circles_overlap(pos, size, bullet.pos, bullet.size)
        {
            let damage = bullet.damage;
            world.bullets[index].active = false;
            damage_player(world, damage);
        }
    }

    let mut collected = false;
    for index in 0..world.powerups.len() {
        let Some(player) = world.player.as_mut() else {
            return;
        };
        let pickup = &mut world.powerups[index];
        if pickup.active && circles_overlap(player.pos, player.size, pickup.pos, pickup.size) {
            pickup.active = false;
            let kind = pickup.kind;
            world.score += player.collect(kind);
            world.play(SoundEffect::Powerup);
            world.notify(pickup_message(kind), 1500.0, NotificationTone::Info);
            collected = true;
        }
    }
    if collected {
        world.powerups.retain(|p| p.active);
        world.stats_changed();
    }

    let Some((pos, size)) = world.player.as_ref().map(|p| (p.pos, p.size)) else {
        return;
    };
    let touching = world
        .enemies
        .iter()
        .any(|e| e.is_alive() && circles_overlap(pos, size, e.pos, e.size()));
    if touching {
        // At most one contact hit per frame
        damage_player(world, 1);
    }
}

fn pickup_message(kind: PowerupKind) -> &'static str {
    match kind {
        PowerupKind::Ammo => "AMMO COLLECTED!",
        PowerupKind::Health => "HEALTH RESTORED!",
        PowerupKind::Life => "EXTRA LIFE!",
    }
}

/// Per-frame player update: held input, timers, then contacts
pub fn update_player(world: &mut World, keys: &KeyState, dt_ms: f32) {
    let Some(mut player) = world.player.take() else {
        return;
    };
    player.steer(keys, dt_ms, world);
    player.tick_timers(dt_ms);
    world.player = Some(player);

    resolve_player_contacts(world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::powerup::Powerup;
    use crate::sim::terrain::{Obstacle, Terrain};

    fn world_with_player(pos: Vec2) -> World {
        let mut world = World::new(1000.0, 1000.0, 3);
        world.player = Some(Player::new(pos));
        world
    }

    fn player(world: &World) -> &Player {
        world.player.as_ref().unwrap()
    }

    fn tree(x: f32, y: f32, radius: f32) -> Obstacle {
        Obstacle {
            pos: Vec2::new(x, y),
            radius,
            kind: Terrain::Forest,
        }
    }

    #[test]
    fn test_facing_from_keys() {
        assert_eq!(facing_for(false, false, false, false), None);
        assert_eq!(facing_for(true, false, false, false), Some(-FRAC_PI_2));
        assert_eq!(facing_for(false, false, true, false), Some(PI));
        assert_eq!(facing_for(true, false, false, true), Some(-FRAC_PI_4));
        assert_eq!(facing_for(false, true, true, false), Some(3.0 * FRAC_PI_4));
    }

    #[test]
    fn test_diagonal_moves_both_axes() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        let keys = KeyState::from_keys([Key::Down, Key::Right]);
        update_player(&mut world, &keys, 100.0);
        assert_eq!(player(&world).pos, Vec2::new(520.0, 520.0));
        assert_eq!(player(&world).angle, FRAC_PI_4);
    }

    #[test]
    fn test_turret_rotates_independently() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        let keys = KeyState::from_keys([Key::TurretRight, Key::Left]);
        update_player(&mut world, &keys, 500.0);
        let p = player(&world);
        assert!((p.turret_angle - 1.5).abs() < 1e-5);
        assert_eq!(p.angle, PI);
    }

    #[test]
    fn test_movement_into_obstacle_is_rejected() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        world.obstacles.push(tree(540.0, 530.0, 20.0));
        // Moving right alone would clear the tree, moving down-right would not
        let keys = KeyState::from_keys([Key::Down, Key::Right]);
        update_player(&mut world, &keys, 100.0);
        assert_eq!(player(&world).pos, Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_stealth_needs_cover() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        let hide = KeyState::from_keys([Key::Hide]);
        update_player(&mut world, &hide, 16.0);
        assert!(!player(&world).hidden);

        world.obstacles.push(tree(540.0, 500.0, 15.0));
        update_player(&mut world, &hide, 16.0);
        assert!(player(&world).hidden);

        // Released: visible again next frame
        update_player(&mut world, &KeyState::default(), 16.0);
        assert!(!player(&world).hidden);
    }

    #[test]
    fn test_damage_ignored_while_invulnerable_or_hidden() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        world.player.as_mut().unwrap().hidden = true;
        damage_player(&mut world, 3);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH);

        let p = world.player.as_mut().unwrap();
        p.hidden = false;
        p.invulnerable = true;
        p.invulnerable_ms = 500.0;
        damage_player(&mut world, 3);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH);
        assert_eq!(player(&world).lives, PLAYER_START_LIVES);
    }

    #[test]
    fn test_hit_grants_invulnerability_window() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        damage_player(&mut world, 1);
        damage_player(&mut world, 1);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH - 1);

        world.player.as_mut().unwrap().tick_timers(1000.0);
        damage_player(&mut world, 1);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH - 2);
    }

    #[test]
    fn test_death_respawns_with_full_stats() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        world.player.as_mut().unwrap().ammo = 3;
        damage_player(&mut world, 20);

        let p = player(&world);
        assert_eq!(p.lives, PLAYER_START_LIVES - 1);
        assert_eq!(p.health, PLAYER_MAX_HEALTH);
        assert_eq!(p.ammo, PLAYER_MAX_AMMO);
        assert!(p.invulnerable);
        assert_eq!(p.invulnerable_ms, RESPAWN_INVULNERABILITY_MS);
    }

    #[test]
    fn test_last_life_is_not_respawned() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        world.player.as_mut().unwrap().lives = 1;
        damage_player(&mut world, 20);
        let p = player(&world);
        assert_eq!(p.lives, 0);
        assert_eq!(p.health, 0);
    }

    #[test]
    fn test_enemy_bullet_damages_exactly_once() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        world.bullets.push(Bullet::new(
            1,
            Vec2::new(505.0, 500.0),
            Vec2::new(-300.0, 0.0),
            BulletOwner::Enemy,
        ));
        world.bullets.push(Bullet::new(
            2,
            Vec2::new(498.0, 500.0),
            Vec2::new(300.0, 0.0),
            BulletOwner::Player,
        ));

        resolve_player_contacts(&mut world);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH - 1);
        assert!(!world.bullets[0].active);
        // Own bullets pass through
        assert!(world.bullets[1].active);

        world.player.as_mut().unwrap().invulnerable = false;
        resolve_player_contacts(&mut world);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH - 1);
    }

    #[test]
    fn test_pickup_applies_once_and_is_removed() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        world.player.as_mut().unwrap().ammo = 40;
        world
            .powerups
            .push(Powerup::new(1, PowerupKind::Ammo, Vec2::new(510.0, 500.0)));

        resolve_player_contacts(&mut world);
        resolve_player_contacts(&mut world);

        let p = player(&world);
        assert_eq!(p.ammo, PLAYER_MAX_AMMO);
        assert_eq!(p.tnt, PLAYER_START_TNT + 1);
        assert_eq!(world.score, 50);
        assert!(world.powerups.is_empty());
    }

    #[test]
    fn test_collect_caps() {
        let mut p = Player::new(Vec2::ZERO);
        p.tnt = PLAYER_MAX_TNT;
        p.health = 8;
        assert_eq!(p.collect(PowerupKind::Ammo), 50);
        assert_eq!(p.tnt, PLAYER_MAX_TNT);
        assert_eq!(p.collect(PowerupKind::Health), 100);
        assert_eq!(p.health, PLAYER_MAX_HEALTH);
        assert_eq!(p.collect(PowerupKind::Life), 500);
        assert_eq!(p.lives, PLAYER_START_LIVES + 1);
    }

    #[test]
    fn test_enemy_contact_hurts_once_per_frame() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        for id in 1..=2 {
            world
                .enemies
                .push(Enemy::new(id, EnemyKind::Infantry, Vec2::new(510.0, 500.0)));
        }
        resolve_player_contacts(&mut world);
        assert_eq!(player(&world).health, PLAYER_MAX_HEALTH - 1);
    }

    #[test]
    fn test_shoot_consumes_ammo_and_respects_cooldown() {
        let mut world = world_with_player(Vec2::new(500.0, 500.0));
        assert!(player_shoot(&mut world));
        assert!(!player_shoot(&mut world));
        assert_eq!(player(&world).ammo, PLAYER_MAX_AMMO - 1);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].pos, Vec2::new(521.0, 500.0));

        world.player.as_mut().unwrap().tick_timers(200.0);
        assert!(player_shoot(&mut world));

        world.player.as_mut().unwrap().ammo = 0;
        world.player.as_mut().unwrap().tick_timers(200.0);
        assert!(!player_shoot(&mut world));
    }

    #[test]
    fn test_place_tnt() {
        let mut world = world_with_player(Vec2::new(300.0, 300.0));
        assert!(player_place_tnt(&mut world));
        assert!(!player_place_tnt(&mut world));
        assert_eq!(player(&world).tnt, PLAYER_START_TNT - 1);
        assert_eq!(world.explosives.len(), 1);
        assert_eq!(world.explosives[0].pos, Vec2::new(300.0, 300.0));

        world.player.as_mut().unwrap().tnt = 0;
        world.player.as_mut().unwrap().tick_timers(1000.0);
        assert!(!player_place_tnt(&mut world));
    }
}
