//! Numeric properties of bullets, blasts and damage gating

use glam::Vec2;
use proptest::prelude::*;
use tank_run::sim::explosive::{enemy_blast_damage, player_blast_damage};
use tank_run::sim::player::DamageOutcome;
use tank_run::sim::{Bullet, BulletOwner, Player};

proptest! {
    #[test]
    fn test_bullet_travel_is_sum_of_steps(
        angle in 0.0f32..std::f32::consts::TAU,
        speed in 50.0f32..600.0,
        steps in prop::collection::vec(1.0f32..50.0, 1..40),
    ) {
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let mut bullet = Bullet::new(1, Vec2::new(600.0, 400.0), vel, BulletOwner::Player);
        let mut expected = 0.0f32;
        for dt in &steps {
            bullet.advance(*dt);
            expected += vel.length() * dt / 1000.0;
        }
        prop_assert!((bullet.traveled - expected).abs() <= expected * 1e-4 + 1e-3);
        prop_assert!(bullet.trail.len() <= 5);
    }

    #[test]
    fn test_blast_damage_never_grows_with_distance(a in 0.0f32..200.0, b in 0.0f32..200.0) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(enemy_blast_damage(near) >= enemy_blast_damage(far));
        prop_assert!(player_blast_damage(near) >= player_blast_damage(far));
        prop_assert!(enemy_blast_damage(far) >= 1);
        prop_assert!(player_blast_damage(far) >= 1);
    }

    #[test]
    fn test_shielded_player_takes_no_damage(amount in 1u32..100, hidden in any::<bool>()) {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        if hidden {
            player.hidden = true;
        } else {
            player.invulnerable = true;
            player.invulnerable_ms = 500.0;
        }
        let before = player.health;
        prop_assert_eq!(player.take_damage(amount), DamageOutcome::Ignored);
        prop_assert_eq!(player.health, before);
    }
}

#[test]
fn test_blast_damage_at_centre() {
    assert_eq!(enemy_blast_damage(0.0), 50);
    assert_eq!(player_blast_damage(0.0), 12);
    assert_eq!(enemy_blast_damage(79.0), 11);
}
