//! Persisted lock preferences
//!
//! The session never owns these flags. It reads them through a
//! [`SettingsSource`] each time it needs them, so toggles made by the host
//! take effect immediately.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Lock preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSettings {
    /// Require the passcode to use the app
    #[serde(default)]
    pub passcode_lock_enabled: bool,

    /// Allow fingerprint unlock
    #[serde(default)]
    pub touch_biometric_enabled: bool,

    /// Allow face unlock
    #[serde(default)]
    pub face_biometric_enabled: bool,
}

impl LockSettings {
    /// Is the passcode lock enabled
    pub fn passcode_lock_enabled(&self) -> bool {
        self.passcode_lock_enabled
    }

    /// Is fingerprint unlock enabled
    pub fn touch_biometric_enabled(&self) -> bool {
        self.touch_biometric_enabled
    }

    /// Is face unlock enabled
    pub fn face_biometric_enabled(&self) -> bool {
        self.face_biometric_enabled
    }

    /// Is any kind of biometric unlock enabled
    pub fn biometrics_enabled(&self) -> bool {
        self.touch_biometric_enabled || self.face_biometric_enabled
    }
}

/// Read access to the current lock preferences
pub trait SettingsSource: Send + Sync {
    /// Current settings snapshot
    fn lock_settings(&self) -> LockSettings;
}

impl SettingsSource for LockSettings {
    fn lock_settings(&self) -> LockSettings {
        *self
    }
}

impl SettingsSource for RwLock<LockSettings> {
    fn lock_settings(&self) -> LockSettings {
        match self.read() {
            Ok(settings) => *settings,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// TOML file holding [`LockSettings`]
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Settings stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings stored in `dir` under the default file name
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE_NAME))
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from disk
    ///
    /// Returns default settings if the file doesn't exist or can't be parsed.
    pub fn load(&self) -> LockSettings {
        if !self.path.exists() {
            return LockSettings::default();
        }

        match fs::read_to_string(&self.path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings file: {}", e);
                LockSettings::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read settings file: {}", e);
                LockSettings::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self, settings: &LockSettings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(settings)?;
        fs::write(&self.path, contents)?;

        tracing::debug!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
