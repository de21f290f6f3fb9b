//! High-score persistence
//!
//! The simulation never touches storage itself; callers hand the final
//! score to [`record_high_score`] once the game is over.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

pub trait HighScoreStore {
    /// Best score so far; 0 when nothing has been saved
    fn load(&self) -> Result<u64>;
    fn save(&mut self, score: u64) -> Result<()>;
}

/// In-process store, mostly for tests and throwaway runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u64> {
        Ok(self.best)
    }

    fn save(&mut self, score: u64) -> Result<()> {
        self.best = score;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u64,
}

/// `{ "high_score": n }` on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path)?;
        let file: HighScoreFile = serde_json::from_str(&content)?;
        Ok(file.high_score)
    }

    fn save(&mut self, score: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&HighScoreFile { high_score: score })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Save `score` if it beats the stored best; returns whether it did
pub fn record_high_score<S: HighScoreStore + ?Sized>(store: &mut S, score: u64) -> Result<bool> {
    let best = store.load()?;
    if score > best {
        store.save(score)?;
        tracing::info!("New high score {} (previous {})", score, best);
        Ok(true)
    } else {
        tracing::debug!("Score {} did not beat high score {}", score, best);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_improvements() {
        let mut store = MemoryStore::new();
        assert!(record_high_score(&mut store, 4).unwrap());
        assert!(!record_high_score(&mut store, 3).unwrap());
        assert!(!record_high_score(&mut store, 4).unwrap());
        assert_eq!(store.load().unwrap(), 4);
    }

    #[test]
    fn test_missing_file_loads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.json"));
        assert_eq!(store.load().unwrap(), 0);
    }
}
