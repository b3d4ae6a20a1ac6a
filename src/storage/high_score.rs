//! Best-effort storage of the single high score value.
//!
//! Failures never reach the player: a store that cannot be read reports 0 and
//! a failed write is logged, leaving the session's in-memory value in charge.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the high score lives between runs
pub trait HighScoreStore {
    /// Stored high score, 0 when nothing usable is stored
    fn load(&mut self) -> u32;

    /// Record a new high score
    fn save(&mut self, score: u32);
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load(&mut self) -> u32 {
        (**self).load()
    }

    fn save(&mut self, score: u32) {
        (**self).save(score)
    }
}

/// Keeps the score for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    score: Option<u32>,
    saves: usize,
}

impl MemoryHighScoreStore {
    pub fn with_score(score: u32) -> Self {
        Self {
            score: Some(score),
            saves: 0,
        }
    }

    /// Last value written or seeded
    pub fn saved(&self) -> Option<u32> {
        self.score
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&mut self) -> u32 {
        self.score.unwrap_or(0)
    }

    fn save(&mut self, score: u32) {
        self.score = Some(score);
        self.saves += 1;
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
}

/// JSON file holding `{"high_score": n}`
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory, e.g. `~/.local/share/enhanced_snake`
    pub fn in_data_dir() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "enhanced_snake")
            .context("could not resolve a data directory")?;
        Ok(Self::new(dirs.data_local_dir().join("high_score.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<u32>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score from {:?}", self.path))?;
        let record: HighScoreRecord =
            serde_json::from_str(&json).context("Failed to parse high score")?;
        Ok(Some(record.high_score))
    }

    fn write(&self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score: score })
            .context("Failed to serialize high score")?;

        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write high score to {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move high score into {:?}", self.path))?;
        Ok(())
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&mut self) -> u32 {
        match self.read() {
            Ok(score) => score.unwrap_or(0),
            Err(e) => {
                warn!("Error loading high score: {:#}", e);
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        if let Err(e) = self.write(score) {
            warn!("Error saving high score: {:#}", e);
        }
    }
}
