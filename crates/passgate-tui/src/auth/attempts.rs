//! Wrong-entry history that survives restarts
//!
//! The failure count and the wall-clock end of the current lockout are
//! written to the data directory after every submitted entry, so quitting
//! and relaunching resumes the lockout instead of starting over.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default file name inside the data directory
pub const ATTEMPTS_FILE_NAME: &str = "lockout.json";

/// Failure count and lockout deadline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    #[serde(default)]
    pub failed_attempts: u32,
    #[serde(default)]
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    /// Record `failed_attempts` with a lockout ending `lockout_remaining` from now
    pub fn capture(failed_attempts: u32, lockout_remaining: Option<Duration>) -> Self {
        let locked_until = lockout_remaining
            .and_then(|remaining| chrono::Duration::from_std(remaining).ok())
            .map(|remaining| Utc::now() + remaining);
        Self {
            failed_attempts,
            locked_until,
        }
    }

    /// Time left in the recorded lockout
    pub fn lockout_remaining(&self) -> Option<Duration> {
        self.locked_until
            .and_then(|until| (until - Utc::now()).to_std().ok())
            .filter(|remaining| !remaining.is_zero())
    }
}

/// Errors writing the attempt record
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Attempt record persisted as JSON
#[derive(Debug, Clone)]
pub struct AttemptFile {
    path: PathBuf,
}

impl AttemptFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File in `dir` using the default file name
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ATTEMPTS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing file means no failures.
    pub fn load(&self) -> AttemptRecord {
        if !self.path.exists() {
            return AttemptRecord::default();
        }

        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse attempt record: {}", e);
                AttemptRecord::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read attempt record: {}", e);
                AttemptRecord::default()
            }
        }
    }

    pub fn save(&self, record: &AttemptRecord) -> Result<(), AttemptError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, contents)?;
        tracing::debug!("Saved attempt record to {:?}", self.path);
        Ok(())
    }
}
