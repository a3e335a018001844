//! Leaderboard of finished runs
//!
//! Stored as a plain ordered list of `{name, score, level, date}` records.
//! New results are appended; display order is computed on read.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};

/// Rows shown by default
pub const DISPLAY_ENTRIES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Local date the run ended
    pub date: String,
}

/// All recorded runs, in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run. Blank names are recorded as "Anonymous".
    pub fn record(&mut self, name: &str, score: u64, level: u32, date: String) -> &LeaderboardEntry {
        let name = name.trim();
        let entry = LeaderboardEntry {
            name: if name.is_empty() {
                "Anonymous".to_string()
            } else {
                name.to_string()
            },
            score,
            level: level.max(1),
            date,
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Raw records, oldest first
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best `n` runs by score, highest first. Ties keep recording order.
    pub fn top(&self, n: usize) -> Vec<&LeaderboardEntry> {
        let mut ranked: Vec<&LeaderboardEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(n);
        ranked
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.score).max()
    }

    /// Load through `store`, starting fresh on any failure
    pub fn load(store: &dyn LeaderboardStore) -> Self {
        match store.load() {
            Ok(board) => {
                log::info!("Loaded {} leaderboard entries", board.len());
                board
            }
            Err(err) => {
                log::warn!("Leaderboard unavailable ({}), starting fresh", err);
                Self::new()
            }
        }
    }

    /// Save through `store`, logging failures
    pub fn save(&self, store: &mut dyn LeaderboardStore) -> bool {
        match store.save(self) {
            Ok(()) => {
                log::info!("Leaderboard saved ({} entries)", self.len());
                true
            }
            Err(err) => {
                log::warn!("Failed to save leaderboard: {}", err);
                false
            }
        }
    }
}

/// Where the leaderboard lives between sessions
pub trait LeaderboardStore {
    /// Absent data is an empty board, not an error
    fn load(&self) -> Result<Leaderboard, PersistenceError>;
    fn save(&mut self, board: &Leaderboard) -> Result<(), PersistenceError>;
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Leaderboard>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(board: Leaderboard) -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.slot.lock() {
            *slot = Some(board);
        }
        store
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl LeaderboardStore for MemoryStore {
    fn load(&self) -> Result<Leaderboard, PersistenceError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory store poisoned".to_string()))?;
        Ok(slot.clone().unwrap_or_default())
    }

    fn save(&mut self, board: &Leaderboard) -> Result<(), PersistenceError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory store poisoned".to_string()))?;
        *slot = Some(board.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl LeaderboardStore for JsonFileStore {
    fn load(&self) -> Result<Leaderboard, PersistenceError> {
        Ok(persistence::read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&mut self, board: &Leaderboard) -> Result<(), PersistenceError> {
        persistence::write_json(&self.path, board)
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "tankRunLeaderboard";
}

#[cfg(target_arch = "wasm32")]
impl LeaderboardStore for LocalStorageStore {
    fn load(&self) -> Result<Leaderboard, PersistenceError> {
        Ok(persistence::local::read(Self::STORAGE_KEY)?.unwrap_or_default())
    }

    fn save(&mut self, board: &Leaderboard) -> Result<(), PersistenceError> {
        persistence::local::write(Self::STORAGE_KEY, board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_support::scratch_path;

    fn board() -> Leaderboard {
        let mut board = Leaderboard::new();
        board.record("ana", 300, 2, "1/2/2026".into());
        board.record("bo", 900, 4, "1/3/2026".into());
        board.record("cy", 300, 3, "1/4/2026".into());
        board
    }

    #[test]
    fn test_record_appends_in_order() {
        let board = board();
        let names: Vec<&str> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ana", "bo", "cy"]);
    }

    #[test]
    fn test_blank_name_is_anonymous() {
        let mut board = Leaderboard::new();
        assert_eq!(board.record("   ", 10, 1, String::new()).name, "Anonymous");
    }

    #[test]
    fn test_top_is_stable_for_ties() {
        let board = board();
        let top: Vec<&str> = board.top(3).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(top, ["bo", "ana", "cy"]);
        assert_eq!(board.top(1).len(), 1);
        assert_eq!(board.top_score(), Some(900));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let json = serde_json::to_string(&board()).unwrap();
        assert!(json.starts_with('['));
        let back: Leaderboard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board());
    }

    #[test]
    fn test_file_store_round_trip_preserves_order() {
        let mut store = JsonFileStore::new(scratch_path("leaderboard.json"));
        assert!(Leaderboard::load(&store).is_empty());

        let mut saved = board();
        assert!(saved.save(&mut store));

        let mut loaded = Leaderboard::load(&store);
        loaded.record("dee", 50, 1, "1/5/2026".into());
        assert!(loaded.save(&mut store));

        let again = Leaderboard::load(&store);
        saved.record("dee", 50, 1, "1/5/2026".into());
        assert_eq!(again, saved);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let path = scratch_path("leaderboard.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(PersistenceError::Json(_))));
        assert!(Leaderboard::load(&store).is_empty());
    }

    #[test]
    fn test_memory_store_shares_slot() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        assert!(board().save(&mut handle));
        assert_eq!(store.load().unwrap(), board());
        assert_eq!(store.save_count(), 1);
    }
}
