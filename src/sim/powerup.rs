//! Pickups: ammo, health and extra lives

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    Ammo,
    Health,
    Life,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [PowerupKind::Ammo, PowerupKind::Health, PowerupKind::Life];

    /// Score awarded on pickup
    pub fn score(self) -> u64 {
        match self {
            PowerupKind::Ammo => 50,
            PowerupKind::Health => 100,
            PowerupKind::Life => 500,
        }
    }
}

/// A pickup lying on the ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub kind: PowerupKind,
    pub pos: Vec2,
    pub size: f32,
    /// Milliseconds since spawn
    pub age: f32,
    pub lifetime: f32,
    pub active: bool,
}

impl Powerup {
    pub fn new(id: u32, kind: PowerupKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            size: POWERUP_SIZE,
            age: 0.0,
            lifetime: POWERUP_LIFETIME_MS,
            active: true,
        }
    }

    /// Age the pickup; it expires once past its lifetime
    pub fn update(&mut self, dt_ms: f32) {
        if !self.active {
            return;
        }
        self.age += dt_ms;
        if self.age > self.lifetime {
            self.active = false;
        }
    }

    /// In the final seconds before expiry
    pub fn is_blinking(&self) -> bool {
        self.age > self.lifetime - POWERUP_BLINK_MS
    }

    /// Draw alpha (pulses while blinking)
    pub fn alpha(&self) -> f32 {
        if self.is_blinking() {
            0.5 + (self.age * 0.01).sin() * 0.5
        } else {
            1.0
        }
    }

    /// Vertical bob offset for drawing
    pub fn bob_offset(&self) -> f32 {
        (self.age * 0.003).sin() * 3.0
    }
}
