//! Tank Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{FocusEvent, KeyboardEvent};

    use tank_run::audio::AudioManager;
    use tank_run::input::{Action, EscapeIntent, InputState};
    use tank_run::leaderboard::LocalStorageStore;
    use tank_run::render::AsciiSurface;
    use tank_run::sim::GamePhase;
    use tank_run::ui::DomUi;
    use tank_run::{Session, Settings, platform};

    /// Text grid the browser build draws into `#screen`
    const SCREEN_COLS: usize = 120;
    const SCREEN_ROWS: usize = 40;
    const FALLBACK_FRAME_MS: f32 = 1000.0 / 60.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        input: InputState,
        last_time: f64,
    }

    impl Game {
        fn update(&mut self, dt_ms: f32) {
            let input = self.input.take();
            self.session.frame(&input, dt_ms);
        }

        fn render(&self) {
            let mut surface = AsciiSurface::new(SCREEN_COLS, SCREEN_ROWS);
            self.session.render(&mut surface);
            let screen = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("screen"));
            if let Some(el) = screen {
                el.set_text_content(Some(&surface.to_text()));
            }
        }

        fn start(&mut self) {
            self.input.reset();
            let seed = self.session.start_game();
            log::info!("Started new game with seed: {}", seed);
        }
    }

    pub fn run() {
        platform::init_logging();
        log::info!("Tank Run starting...");

        let settings = Settings::load();
        let session = Session::new(
            settings,
            AudioManager::for_platform(),
            Box::new(DomUi),
            Box::new(LocalStorageStore),
        );
        let game = Rc::new(RefCell::new(Game {
            session,
            input: InputState::default(),
            last_time: 0.0,
        }));

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());
        request_animation_frame(game);

        log::info!("Tank Run running! Press Enter to start");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if code == "Space" || code.starts_with("Arrow") {
                    event.prevent_default();
                }

                let mut g = game.borrow_mut();
                match (code.as_str(), g.session.phase()) {
                    ("Enter", GamePhase::Menu | GamePhase::GameOver { .. }) => g.start(),
                    ("Escape", phase) => match EscapeIntent::for_phase(phase) {
                        EscapeIntent::TogglePause => g.input.request_pause(),
                        EscapeIntent::ReturnToMenu => g.session.quit_to_menu(),
                        EscapeIntent::Ignore => {}
                    },
                    _ => {
                        if g.input.key_down(&code) == Some(Action::ToggleMinimap) {
                            let shown = g.session.toggle_minimap();
                            g.session.settings().save();
                            log::info!("Minimap {}", if shown { "on" } else { "off" });
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Window blur (click outside, tab switch)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: FocusEvent| {
            let mut g = game.borrow_mut();
            g.input.reset();
            if g.session.phase() == GamePhase::Playing {
                g.input.request_pause();
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                FALLBACK_FRAME_MS
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;

    use tank_run::audio::AudioManager;
    use tank_run::input::Autopilot;
    use tank_run::leaderboard::{DISPLAY_ENTRIES, JsonFileStore};
    use tank_run::render::AsciiSurface;
    use tank_run::sim::{GamePhase, TickInput};
    use tank_run::ui::LogUi;
    use tank_run::{Session, Settings};

    const FRAME_MS: f32 = 1000.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(name = "tank-run")]
    #[command(about = "Play Tank Run headless with the autopilot")]
    pub struct Args {
        /// Settings JSON file (created with defaults if missing)
        #[arg(long, default_value = "tank-run-settings.json")]
        settings: PathBuf,

        /// Leaderboard JSON file
        #[arg(long, default_value = "tank-run-leaderboard.json")]
        leaderboard: PathBuf,

        /// RNG seed, overrides the settings file
        #[arg(long)]
        seed: Option<u64>,

        /// Frames to simulate at 60 fps
        #[arg(long, default_value = "3600")]
        frames: u32,

        /// Name recorded on the leaderboard
        #[arg(long)]
        name: Option<String>,

        /// Width of the printed map in characters
        #[arg(long, default_value = "96")]
        cols: usize,
    }

    pub fn run(args: Args) {
        let mut settings = Settings::load_file_or_default(&args.settings);
        if !args.settings.exists() {
            if let Err(err) = settings.save_to(&args.settings) {
                log::warn!("Could not write {}: {}", args.settings.display(), err);
            }
        }
        if args.seed.is_some() {
            settings.seed = args.seed;
        }
        if let Some(name) = args.name.as_deref() {
            settings.player_name = name.to_string();
        }

        let rows = ((args.cols as f32) * settings.world_height / settings.world_width / 2.0)
            .round()
            .max(1.0) as usize;

        let mut session = Session::new(
            settings,
            AudioManager::for_platform(),
            Box::new(LogUi::default()),
            Box::new(JsonFileStore::new(&args.leaderboard)),
        );
        let seed = session.start_game();
        log::info!("Autopilot run: seed {}, {} frames", seed, args.frames);

        let autopilot = Autopilot;
        let mut frames_run = 0;
        for _ in 0..args.frames {
            if matches!(session.phase(), GamePhase::GameOver { .. }) {
                break;
            }
            let input = session
                .world()
                .map(|world| autopilot.input(world))
                .unwrap_or_else(TickInput::default);
            session.frame(&input, FRAME_MS);
            frames_run += 1;
        }

        let mut surface = AsciiSurface::new(args.cols, rows);
        session.render(&mut surface);
        println!("{}", surface.to_text());

        if let Some(hud) = session.hud() {
            println!("{}", hud.summary());
        }
        println!(
            "{:?} after {} frames ({:.1}s simulated)",
            session.phase(),
            frames_run,
            frames_run as f32 * FRAME_MS / 1000.0
        );

        let top = session.leaderboard().top(DISPLAY_ENTRIES);
        if !top.is_empty() {
            println!("\nLeaderboard");
            for (rank, entry) in top.iter().enumerate() {
                println!(
                    "{:>2}. {:<16} {:>8}  L{:<2} {}",
                    rank + 1,
                    entry.name,
                    entry.score,
                    entry.level,
                    entry.date
                );
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    tank_run::platform::init_logging();
    log::info!("Tank Run (native) starting...");
    headless::run(headless::Args::parse());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
