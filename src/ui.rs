//! HUD snapshot and the UI sink interface
//!
//! The UI never feeds back into the simulation: it receives a `Hud` after
//! every stat change and transient notifications as they are raised.

use serde::{Deserialize, Serialize};

use crate::sim::{Terrain, World};

/// Notification styling hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTone {
    Info,
    Success,
    Warning,
}

/// Stats shown on the heads-up display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub health: u32,
    pub max_health: u32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub tnt: u32,
    pub lives: u32,
    pub score: u64,
    pub level: u32,
    pub terrain: Terrain,
    pub enemies_left: usize,
    pub hidden: bool,
}

impl Hud {
    /// Snapshot the world. Player fields read as zero when there is no player.
    pub fn from_world(world: &World) -> Self {
        let player = world.player.as_ref();
        Self {
            health: player.map_or(0, |p| p.health),
            max_health: player.map_or(0, |p| p.max_health),
            ammo: player.map_or(0, |p| p.ammo),
            max_ammo: player.map_or(0, |p| p.max_ammo),
            tnt: player.map_or(0, |p| p.tnt),
            lives: player.map_or(0, |p| p.lives),
            score: world.score,
            level: world.level,
            terrain: world.terrain,
            enemies_left: world.live_enemy_count(),
            hidden: player.is_some_and(|p| p.hidden),
        }
    }

    /// One-line text form for logs and the headless runner
    pub fn summary(&self) -> String {
        format!(
            "L{} {} | HP {}/{} | Ammo {}/{} | TNT {} | Lives {} | Score {} | Enemies {}",
            self.level,
            self.terrain.name(),
            self.health,
            self.max_health,
            self.ammo,
            self.max_ammo,
            self.tnt,
            self.lives,
            self.score,
            self.enemies_left
        )
    }
}

/// Receives HUD refreshes and transient messages
pub trait UiSink {
    /// Called after any stat change; must be idempotent
    fn update(&mut self, hud: &Hud);

    fn notify(&mut self, message: &str, duration_ms: f32, tone: NotificationTone);
}

/// Ignores everything
#[derive(Debug, Default)]
pub struct NullUi;

impl UiSink for NullUi {
    fn update(&mut self, _hud: &Hud) {}

    fn notify(&mut self, _message: &str, _duration_ms: f32, _tone: NotificationTone) {}
}

/// Logs notifications and keeps the latest HUD
#[derive(Debug, Default)]
pub struct LogUi {
    pub last: Option<Hud>,
}

impl UiSink for LogUi {
    fn update(&mut self, hud: &Hud) {
        if self.last.as_ref() != Some(hud) {
            log::debug!("{}", hud.summary());
            self.last = Some(hud.clone());
        }
    }

    fn notify(&mut self, message: &str, _duration_ms: f32, tone: NotificationTone) {
        log::info!("[{:?}] {}", tone, message.replace('\n', " - "));
    }
}

/// Writes the HUD into DOM elements by id
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct DomUi;

#[cfg(target_arch = "wasm32")]
impl DomUi {
    fn set_text(id: &str, text: &str) {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id));
        if let Some(el) = element {
            el.set_text_content(Some(text));
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl UiSink for DomUi {
    fn update(&mut self, hud: &Hud) {
        Self::set_text("hud-health", &format!("{}/{}", hud.health, hud.max_health));
        Self::set_text("hud-ammo", &format!("{}/{}", hud.ammo, hud.max_ammo));
        Self::set_text("hud-tnt", &hud.tnt.to_string());
        Self::set_text("hud-lives", &hud.lives.to_string());
        Self::set_text("hud-score", &hud.score.to_string());
        Self::set_text("hud-level", &hud.level.to_string());
        Self::set_text("hud-terrain", hud.terrain.name());
        Self::set_text("hud-enemies", &hud.enemies_left.to_string());
    }

    fn notify(&mut self, message: &str, _duration_ms: f32, tone: NotificationTone) {
        let class = match tone {
            NotificationTone::Info => "notification",
            NotificationTone::Success => "notification success",
            NotificationTone::Warning => "notification warning",
        };
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("notification"));
        if let Some(el) = element {
            el.set_text_content(Some(message));
            let _ = el.set_attribute("class", class);
        }
    }
}
