//! Keyboard state and one-shot actions
//!
//! Held keys live in a `KeyState` that the player controller reads once per
//! frame. Presses that trigger a single action are queued and cleared after
//! the tick that consumes them.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angle_between;
use crate::normalize_angle;
use crate::sim::{GamePhase, TickInput, World};

/// Logical keys that act while held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    TurretLeft,
    TurretRight,
    /// Stealth
    Hide,
}

impl Key {
    /// Map a browser `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Key::Up),
            "KeyS" | "ArrowDown" => Some(Key::Down),
            "KeyA" | "ArrowLeft" => Some(Key::Left),
            "KeyD" | "ArrowRight" => Some(Key::Right),
            "KeyQ" => Some(Key::TurretLeft),
            "KeyE" => Some(Key::TurretRight),
            "KeyC" => Some(Key::Hide),
            _ => None,
        }
    }
}

/// Single-press actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shoot,
    PlaceTnt,
    DetonateAll,
    Pause,
    CallForHelp,
    /// Render preference, never reaches the simulation
    ToggleMinimap,
}

impl Action {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(Action::Shoot),
            "KeyB" => Some(Action::PlaceTnt),
            "KeyN" => Some(Action::DetonateAll),
            "KeyP" => Some(Action::Pause),
            "KeyX" => Some(Action::CallForHelp),
            "KeyM" => Some(Action::ToggleMinimap),
            _ => None,
        }
    }
}

/// What Escape means in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeIntent {
    TogglePause,
    ReturnToMenu,
    Ignore,
}

impl EscapeIntent {
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Playing | GamePhase::Paused => EscapeIntent::TogglePause,
            GamePhase::GameOver { .. } => EscapeIntent::ReturnToMenu,
            GamePhase::Menu | GamePhase::LevelTransition => EscapeIntent::Ignore,
        }
    }
}

/// Set of currently pressed logical keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyState {
    down: HashSet<Key>,
}

impl KeyState {
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            down: keys.into_iter().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.down.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    pub fn clear(&mut self) {
        self.down.clear();
    }
}

/// Accumulates raw key events between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    input: TickInput,
}

impl InputState {
    /// Handle a key press. Returns the action it triggered, if any.
    pub fn key_down(&mut self, code: &str) -> Option<Action> {
        if let Some(key) = Key::from_code(code) {
            self.input.keys.press(key);
            return None;
        }
        let action = Action::from_code(code)?;
        match action {
            Action::Shoot => self.input.shoot = true,
            Action::PlaceTnt => self.input.place_tnt = true,
            Action::DetonateAll => self.input.detonate = true,
            Action::Pause => self.input.pause = true,
            Action::CallForHelp => self.input.call_for_help = true,
            Action::ToggleMinimap => {}
        }
        Some(action)
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.input.keys.release(key);
        }
    }

    /// Input for the next tick. One-shot actions are cleared, held keys kept.
    pub fn take(&mut self) -> TickInput {
        let input = self.input.clone();
        self.input.shoot = false;
        self.input.place_tnt = false;
        self.input.detonate = false;
        self.input.pause = false;
        self.input.call_for_help = false;
        input
    }

    /// Queue a pause toggle that did not come from a key
    pub fn request_pause(&mut self) {
        self.input.pause = true;
    }

    /// Drop everything, e.g. when the window loses focus
    pub fn reset(&mut self) {
        self.input = TickInput::default();
    }
}

/// Simple bot that plays the game for the headless runner
#[derive(Debug, Clone, Default)]
pub struct Autopilot;

impl Autopilot {
    /// Keep this far from the target while fighting
    const STANDOFF: f32 = 140.0;
    const AIM_TOLERANCE: f32 = 0.12;

    pub fn input(&self, world: &World) -> TickInput {
        let mut input = TickInput::default();
        if world.phase != GamePhase::Playing {
            return input;
        }
        let Some(player) = world.player.as_ref() else {
            return input;
        };

        let target = world
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                a.pos
                    .distance(player.pos)
                    .partial_cmp(&b.pos.distance(player.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        // Low on ammo: go shopping first
        let pickup = world
            .powerups
            .iter()
            .filter(|p| p.active)
            .min_by(|a, b| {
                a.pos
                    .distance(player.pos)
                    .partial_cmp(&b.pos.distance(player.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|p| p.pos);

        let destination = match (target, pickup) {
            (_, Some(pos)) if player.ammo < 10 || player.health <= 3 => Some(pos),
            (Some(enemy), _) if enemy.pos.distance(player.pos) > Self::STANDOFF => {
                Some(enemy.pos)
            }
            _ => None,
        };
        if let Some(dest) = destination {
            steer_toward(&mut input, player.pos, dest);
        }

        if let Some(enemy) = target {
            let aim = angle_between(player.pos, enemy.pos);
            let error = normalize_angle(aim - player.turret_angle);
            if error > Self::AIM_TOLERANCE {
                input.keys.press(Key::TurretRight);
            } else if error < -Self::AIM_TOLERANCE {
                input.keys.press(Key::TurretLeft);
            }

            let distance = enemy.pos.distance(player.pos);
            input.shoot = error.abs() <= Self::AIM_TOLERANCE * 2.0 && distance < 380.0;
            input.place_tnt = distance < 60.0 && player.tnt > 1;
        }

        // Set off charges once clear of the blast
        let clear_of_blast = world
            .explosives
            .iter()
            .all(|x| x.pos.distance(player.pos) > x.radius + 20.0);
        let enemy_near_charge = world.explosives.iter().any(|x| {
            world
                .enemies
                .iter()
                .any(|e| e.is_alive() && e.pos.distance(x.pos) < x.radius * 0.6)
        });
        input.detonate = clear_of_blast && enemy_near_charge;

        input
    }
}

fn steer_toward(input: &mut TickInput, from: Vec2, to: Vec2) {
    let delta = to - from;
    let dead_zone = 6.0;
    if delta.x > dead_zone {
        input.keys.press(Key::Right);
    } else if delta.x < -dead_zone {
        input.keys.press(Key::Left);
    }
    if delta.y > dead_zone {
        input.keys.press(Key::Down);
    } else if delta.y < -dead_zone {
        input.keys.press(Key::Up);
    }
}
