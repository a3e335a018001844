//! Play session: owns the world between "start game" and "quit to menu"
//!
//! The simulation only pushes `GameEvent`s. The session drains them after
//! every frame and forwards each one to the matching collaborator.

use crate::audio::AudioManager;
use crate::consts::MAX_FRAME_MS;
use crate::leaderboard::{Leaderboard, LeaderboardStore};
use crate::platform;
use crate::render::{RenderOptions, Surface, render_world};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, TickInput, World};
use crate::ui::{Hud, UiSink};

/// Top-level game object handed to the platform loop
pub struct Session {
    world: Option<World>,
    settings: Settings,
    audio: AudioManager,
    ui: Box<dyn UiSink>,
    store: Box<dyn LeaderboardStore>,
    leaderboard: Leaderboard,
    /// Set once the current run's result is on the leaderboard
    result_recorded: bool,
}

impl Session {
    /// Boot: apply audio settings and load the leaderboard
    pub fn new(
        settings: Settings,
        mut audio: AudioManager,
        ui: Box<dyn UiSink>,
        store: Box<dyn LeaderboardStore>,
    ) -> Self {
        let settings = settings.sanitized();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);

        let leaderboard = Leaderboard::load(store.as_ref());

        Self {
            world: None,
            settings,
            audio,
            ui,
            store,
            leaderboard,
            result_recorded: false,
        }
    }

    /// Throw away any current run and begin a new one. Returns the seed used.
    pub fn start_game(&mut self) -> u64 {
        let seed = self.settings.seed.unwrap_or_else(platform::seed_from_clock);
        let mut world = World::new(self.settings.world_width, self.settings.world_height, seed);
        sim::start_game(&mut world);
        self.world = Some(world);
        self.result_recorded = false;
        self.dispatch_events();
        seed
    }

    /// Advance one frame. Long frames (tab switches, debugger stops) are clamped.
    pub fn frame(&mut self, input: &TickInput, dt_ms: f32) {
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        let Some(world) = self.world.as_mut() else {
            return;
        };
        sim::tick(world, input, dt);
        self.dispatch_events();
    }

    fn dispatch_events(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let events = world.drain_events();
        for event in events {
            match event {
                GameEvent::Sound(effect) => {
                    self.audio.play(effect);
                }
                GameEvent::StatsChanged => {
                    if let Some(world) = self.world.as_ref() {
                        self.ui.update(&Hud::from_world(world));
                    }
                }
                GameEvent::Notify {
                    message,
                    duration_ms,
                    tone,
                } => self.ui.notify(&message, duration_ms, tone),
                GameEvent::LevelLoaded { level, terrain } => {
                    log::debug!("Level {} ready ({})", level, terrain.name());
                }
                GameEvent::GameEnded { won, score, level } => {
                    self.record_result(won, score, level);
                }
            }
        }
    }

    fn record_result(&mut self, won: bool, score: u64, level: u32) {
        if self.result_recorded {
            log::warn!("Run result already recorded, ignoring duplicate");
            return;
        }
        self.result_recorded = true;

        // Another session may have saved since boot
        match self.store.load() {
            Ok(board) => self.leaderboard = board,
            Err(err) => log::warn!("Leaderboard reload failed ({}), appending to cached copy", err),
        }
        let entry = self.leaderboard.record(
            &self.settings.player_name,
            score,
            level,
            platform::today(),
        );
        log::info!(
            "{} {} - score {} at level {}",
            entry.name,
            if won { "won" } else { "fell" },
            entry.score,
            entry.level
        );
        self.leaderboard.save(self.store.as_mut());
    }

    /// Draw the current world, if any
    pub fn render(&self, surface: &mut dyn Surface) {
        if let Some(world) = self.world.as_ref() {
            let options = RenderOptions {
                show_minimap: self.settings.show_minimap,
            };
            render_world(world, surface, options);
        }
    }

    pub fn toggle_minimap(&mut self) -> bool {
        self.settings.toggle_minimap()
    }

    /// Drop the world; the session is back at the menu
    pub fn quit_to_menu(&mut self) {
        if self.world.take().is_some() {
            log::info!("Returned to menu");
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.world.as_ref().map_or(GamePhase::Menu, |w| w.phase)
    }

    pub fn hud(&self) -> Option<Hud> {
        self.world.as_ref().map(Hud::from_world)
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.settings.player_name = name.trim().to_string();
    }
}
