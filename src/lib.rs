//! Tank Run - a top-down arcade tank game
//!
//! Core modules:
//! - `sim`: Simulation core (entities, enemy AI, collisions, level director, frame tick)
//! - `session`: Play-session orchestrator that feeds collaborators from sim events
//! - `audio`, `ui`, `render`: Sinks the core calls into
//! - `input`: Key-state source read once per frame
//! - `leaderboard`, `settings`: Persistence at the edge
//! - `platform`: Browser/native differences (dates, seeds, logging)

pub mod audio;
pub mod input;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;
pub mod ui;

pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default world dimensions
    pub const WORLD_WIDTH: f32 = 1200.0;
    pub const WORLD_HEIGHT: f32 = 800.0;

    /// Longest frame the simulation will integrate in one step (ms)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Number of levels; the level table clamps beyond this
    pub const FINAL_LEVEL: u32 = 20;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 16.0;
    pub const PLAYER_SPEED: f32 = 200.0;
    pub const PLAYER_MAX_HEALTH: u32 = 9;
    pub const PLAYER_START_LIVES: u32 = 3;
    pub const PLAYER_MAX_AMMO: u32 = 50;
    pub const PLAYER_START_TNT: u32 = 3;
    pub const PLAYER_MAX_TNT: u32 = 5;
    /// Turret rotation (radians per second)
    pub const TURRET_ROTATION_SPEED: f32 = 3.0;
    pub const PLAYER_SHOOT_DELAY_MS: f32 = 200.0;
    pub const PLAYER_TNT_DELAY_MS: f32 = 1000.0;
    pub const HIT_INVULNERABILITY_MS: f32 = 1000.0;
    pub const RESPAWN_INVULNERABILITY_MS: f32 = 3000.0;
    /// Extra reach around an obstacle within which the player can hide
    pub const STEALTH_COVER_DISTANCE: f32 = 30.0;

    /// Bullets
    pub const BULLET_SIZE: f32 = 3.0;
    pub const BULLET_DAMAGE: u32 = 1;
    pub const BULLET_MAX_DISTANCE: f32 = 400.0;
    pub const BULLET_TRAIL_LENGTH: usize = 5;
    pub const PLAYER_BULLET_SPEED: f32 = 400.0;
    pub const ENEMY_BULLET_SPEED: f32 = 300.0;
    /// Distance past the shooter's edge where bullets spawn
    pub const MUZZLE_OFFSET: f32 = 5.0;

    /// Powerups
    pub const POWERUP_SIZE: f32 = 12.0;
    pub const POWERUP_LIFETIME_MS: f32 = 30_000.0;
    pub const POWERUP_BLINK_MS: f32 = 5_000.0;

    /// Explosives
    pub const TNT_SIZE: f32 = 12.0;
    pub const TNT_FUSE_MS: f32 = 10_000.0;
    pub const TNT_BLINK_MS: f32 = 2_000.0;
    pub const TNT_RADIUS: f32 = 80.0;
    pub const TNT_DAMAGE: u32 = 50;

    /// Terrain generation. Count and radius ranges exclude the upper bound.
    pub const MIN_OBSTACLES: u32 = 35;
    pub const MAX_OBSTACLES: u32 = 50;
    pub const MIN_OBSTACLE_RADIUS: f32 = 12.0;
    pub const MAX_OBSTACLE_RADIUS: f32 = 30.0;
    /// Extra clearance between neighbouring obstacles
    pub const OBSTACLE_SPACING: f32 = 15.0;
    pub const PLACEMENT_ATTEMPTS: u32 = 50;
    pub const CENTER_SAFE_RADIUS: f32 = 100.0;
    pub const CORNER_SAFE_INSET: f32 = 100.0;
    pub const CORNER_SAFE_RADIUS: f32 = 80.0;
    pub const RIVER_POINTS: usize = 11;
    pub const RIVER_AMPLITUDE: f32 = 100.0;
    pub const RIVER_WIDTH: f32 = 60.0;

    /// Enemy AI
    pub const LINE_OF_SIGHT_STEPS: u32 = 20;
    pub const SEARCH_DURATION_MS: f32 = 3_000.0;
    pub const STUCK_TIMEOUT_MS: f32 = 1_000.0;
    pub const PATROL_ARRIVE_DISTANCE: f32 = 20.0;
    pub const PATROL_ATTEMPTS: u32 = 20;

    /// Level director
    pub const SPAWN_ATTEMPTS: u32 = 50;
    pub const SPAWN_TEST_RADIUS: f32 = 32.0;
    pub const COMPLETION_DEBOUNCE_MS: f32 = 100.0;
    pub const LEVEL_TRANSITION_MS: f32 = 3_000.0;
    pub const EMERGENCY_AMMO_COOLDOWN_MS: f32 = 10_000.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle` (screen space, y down)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(1.5 * PI) + PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_heading_points_down_for_half_pi() {
        let h = heading(PI / 2.0);
        assert!(h.x.abs() < 1e-6);
        assert!((h.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_between() {
        let a = angle_between(Vec2::ZERO, Vec2::new(0.0, -10.0));
        assert!((a + PI / 2.0).abs() < 1e-6);
    }
}
