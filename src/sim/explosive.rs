//! Placeable TNT
//!
//! A charge detonates when its scheduled fuse fires or when the player sets it
//! off early; manual detonation cancels the fuse. Detonation is one-shot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::damage_player;
use super::schedule::{ScheduledEvent, Scheduler, TimerToken};
use super::state::World;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Blast damage to an enemy at `distance` from the charge
pub fn enemy_blast_damage(distance: f32) -> u32 {
    let falloff = (distance / 2.0).floor() as u32;
    TNT_DAMAGE.saturating_sub(falloff).max(1)
}

/// Blast damage to the player: a quarter of the base, steeper falloff
pub fn player_blast_damage(distance: f32) -> u32 {
    let falloff = (distance / 10.0).floor() as u32;
    (TNT_DAMAGE / 4).saturating_sub(falloff).max(1)
}

/// A placed charge. Its fuse lives in the world scheduler, so the clock that
/// drives the blink is the same one that fires the detonation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosive {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub radius: f32,
    pub fuse_ms: f32,
    pub fuse: Option<TimerToken>,
    pub active: bool,
}

impl Explosive {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            size: TNT_SIZE,
            radius: TNT_RADIUS,
            fuse_ms: TNT_FUSE_MS,
            fuse: None,
            active: true,
        }
    }

    /// Time left on a lit fuse
    pub fn fuse_remaining(&self, schedule: &Scheduler) -> Option<f32> {
        self.fuse.and_then(|token| schedule.remaining(token))
    }

    /// Fuse is in its last two seconds
    pub fn is_blinking(&self, schedule: &Scheduler) -> bool {
        self.fuse_remaining(schedule)
            .is_some_and(|left| left <= TNT_BLINK_MS)
    }

    /// Blink phase: 200 ms off, 200 ms on, starting off
    pub fn blink_visible(&self, schedule: &Scheduler) -> bool {
        match self.fuse_remaining(schedule) {
            Some(left) if left <= TNT_BLINK_MS => {
                let blink_time = TNT_BLINK_MS - left;
                ((blink_time / 200.0) as u32) % 2 == 1
            }
            _ => true,
        }
    }
}

/// Drop a charge at `pos` and light its fuse. Returns the explosive id.
pub fn place_explosive(world: &mut World, pos: Vec2) -> u32 {
    let id = world.next_entity_id();
    let mut tnt = Explosive::new(id, pos);
    tnt.fuse = Some(
        world
            .schedule
            .schedule(tnt.fuse_ms, ScheduledEvent::Detonate(id)),
    );
    world.explosives.push(tnt);
    log::debug!("TNT {} placed at ({:.0}, {:.0})", id, pos.x, pos.y);
    id
}

/// Detonate the charge with `id`. No-op (false) if it is gone or already spent.
pub fn detonate(world: &mut World, id: u32) -> bool {
    let Some(tnt) = world.explosives.iter_mut().find(|x| x.id == id && x.active) else {
        return false;
    };
    tnt.active = false;
    let (center, radius, fuse) = (tnt.pos, tnt.radius, tnt.fuse.take());
    if let Some(token) = fuse {
        world.schedule.cancel(token);
    }

    for index in 0..world.enemies.len() {
        let enemy = &world.enemies[index];
        if !enemy.is_alive() {
            continue;
        }
        let distance = enemy.pos.distance(center);
        if distance <= radius {
            world.damage_enemy(index, enemy_blast_damage(distance));
        }
    }

    let player_distance = world.player.as_ref().map(|p| p.pos.distance(center));
    if let Some(distance) = player_distance.filter(|d| *d <= radius) {
        damage_player(world, player_blast_damage(distance));
    }

    let before = world.obstacles.len();
    world.obstacles.retain(|o| o.pos.distance(center) > radius);
    log::debug!(
        "TNT {} exploded, {} obstacles destroyed",
        id,
        before - world.obstacles.len()
    );

    world.play(SoundEffect::Explosion);
    true
}

/// Set off every live charge. Returns how many went off.
pub fn detonate_all(world: &mut World) -> usize {
    let ids: Vec<u32> = world
        .explosives
        .iter()
        .filter(|x| x.active)
        .map(|x| x.id)
        .collect();
    let count = ids.into_iter().filter(|id| detonate(world, *id)).count();
    if count > 0 {
        world.play(SoundEffect::TntDetonate);
    }
    count
}
