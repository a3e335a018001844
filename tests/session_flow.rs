//! Session lifecycle against real stores

use std::path::PathBuf;

use tank_run::audio::AudioManager;
use tank_run::leaderboard::{JsonFileStore, LeaderboardStore, MemoryStore};
use tank_run::sim::{GamePhase, TickInput};
use tank_run::ui::NullUi;
use tank_run::{Session, Settings};

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("tank-run-it-{}", std::process::id()))
        .join(name)
}

fn settings(name: &str, seed: u64) -> Settings {
    Settings {
        player_name: name.to_string(),
        seed: Some(seed),
        ..Default::default()
    }
}

fn lose_run(session: &mut Session) {
    session.start_game();
    lose_current_run(session);
}

fn lose_current_run(session: &mut Session) {
    if let Some(player) = session.world_mut().and_then(|w| w.player.as_mut()) {
        player.lives = 0;
    }
    for _ in 0..3 {
        session.frame(&TickInput::default(), 16.0);
    }
    assert_eq!(session.phase(), GamePhase::GameOver { won: false });
}

#[test]
fn test_results_survive_across_sessions() {
    let path = scratch_file("board.json");
    let _ = std::fs::remove_file(&path);

    let mut first = Session::new(
        settings("Ada", 1),
        AudioManager::silent(),
        Box::new(NullUi),
        Box::new(JsonFileStore::new(&path)),
    );
    lose_run(&mut first);

    let mut second = Session::new(
        settings("Bex", 2),
        AudioManager::silent(),
        Box::new(NullUi),
        Box::new(JsonFileStore::new(&path)),
    );
    assert_eq!(second.leaderboard().len(), 1);
    lose_run(&mut second);

    let stored = JsonFileStore::new(&path).load().unwrap();
    let names: Vec<&str> = stored.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Ada", "Bex"]);
}

#[test]
fn test_each_run_saves_exactly_once() {
    let store = MemoryStore::new();
    let mut session = Session::new(
        settings("", 3),
        AudioManager::silent(),
        Box::new(NullUi),
        Box::new(store.clone()),
    );
    lose_run(&mut session);
    assert_eq!(store.save_count(), 1);

    // A new run after game over records its own result
    lose_run(&mut session);
    assert_eq!(store.save_count(), 2);
    assert!(session.leaderboard().entries().iter().all(|e| e.name == "Anonymous"));
}

#[test]
fn test_concurrent_sessions_keep_each_others_results() {
    let store = MemoryStore::new();
    let mut first = Session::new(
        settings("A", 4),
        AudioManager::silent(),
        Box::new(NullUi),
        Box::new(store.clone()),
    );
    let mut second = Session::new(
        settings("B", 5),
        AudioManager::silent(),
        Box::new(NullUi),
        Box::new(store.clone()),
    );
    first.start_game();
    second.start_game();

    lose_current_run(&mut first);
    lose_current_run(&mut second);

    let stored = store.load().unwrap();
    let names: Vec<&str> = stored.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    assert_eq!(second.leaderboard().len(), 2);
}
