//! JSON persistence for the leaderboard and settings
//!
//! Native builds write files; the browser build uses LocalStorage. Callers get
//! a `Result` here and decide whether a failure is worth more than a warning.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while loading or saving persisted data.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Read a JSON file. A missing file is `Ok(None)`, not an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Write pretty JSON through a temp file so a crash never leaves a torn file
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub mod local {
    //! LocalStorage access

    use serde::Serialize;
    use serde::de::DeserializeOwned;

    use super::PersistenceError;

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("LocalStorage".to_string()))
    }

    /// Read a JSON value stored under `key`. Absent key is `Ok(None)`.
    pub fn read<T: DeserializeOwned>(key: &str) -> Result<Option<T>, PersistenceError> {
        let item = storage()?
            .get_item(key)
            .map_err(|_| PersistenceError::Unavailable(format!("read of {}", key)))?;
        match item {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn write<T: Serialize>(key: &str, value: &T) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(value)?;
        storage()?
            .set_item(key, &json)
            .map_err(|_| PersistenceError::Unavailable(format!("write of {}", key)))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    /// Unique scratch path under the system temp dir
    pub fn scratch_path(name: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("tank-run-{}-{}", std::process::id(), n))
            .join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::scratch_path;
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let path = scratch_path("absent.json");
        let value: Option<Vec<u32>> = read_json(&path).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let path = scratch_path("numbers.json");
        write_json(&path, &vec![3u32, 1, 2]).unwrap();
        let value: Option<Vec<u32>> = read_json(&path).unwrap();
        assert_eq!(value, Some(vec![3, 1, 2]));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let path = scratch_path("corrupt.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let result: Result<Option<Vec<u32>>, _> = read_json(&path);
        assert!(matches!(result, Err(PersistenceError::Json(_))));
    }
}
