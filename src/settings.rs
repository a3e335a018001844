//! Game settings and preferences
//!
//! Persisted separately from the leaderboard: LocalStorage in the browser,
//! a JSON file natively.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::persistence::{self, PersistenceError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name recorded on the leaderboard
    pub player_name: String,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Fixed RNG seed; None picks one from the clock
    pub seed: Option<u64>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === HUD ===
    pub show_minimap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            seed: None,
            master_volume: 0.7,
            sfx_volume: 0.8,
            muted: false,
            show_minimap: true,
        }
    }
}

impl Settings {
    /// Smallest playable world
    pub const MIN_WORLD: f32 = 400.0;

    /// Clamp out-of-range values loaded from storage
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.world_width.is_finite() || self.world_width < Self::MIN_WORLD {
            self.world_width = defaults.world_width;
        }
        if !self.world_height.is_finite() || self.world_height < Self::MIN_WORLD {
            self.world_height = defaults.world_height;
        }
        self.master_volume = clamp_volume(self.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
        self.player_name = self.player_name.trim().to_string();
        self
    }

    pub fn toggle_minimap(&mut self) -> bool {
        self.show_minimap = !self.show_minimap;
        self.show_minimap
    }

    /// Read settings from a JSON file. Missing file gives defaults.
    pub fn load_from(path: &Path) -> Result<Self, PersistenceError> {
        Ok(persistence::read_json::<Self>(path)?
            .unwrap_or_default()
            .sanitized())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::write_json(path, self)
    }

    /// Load from a file, falling back to defaults on any error
    pub fn load_file_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "tank_run_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        match persistence::local::read::<Self>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings.sanitized()
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Using default settings: {}", err);
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        match persistence::local::write(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::warn!("Failed to save settings: {}", err),
        }
    }
}

fn clamp_volume(vol: f32) -> f32 {
    if vol.is_finite() {
        vol.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
