//! TUI configuration persistence
//!
//! Where the passcode and lock settings live, how fast the UI ticks, and
//! which verifier runs for biometric unlock.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use passgate_core::biometric::CommandPrompt;
use passgate_core::session::DEFAULT_BIOMETRIC_REASON;
use passgate_core::{BiometricPrompt, NoBiometrics, SessionConfig};
use serde::{Deserialize, Serialize};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "passgate";

/// TUI configuration that persists across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Directory for credentials, settings and logs (defaults to the config dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// UI refresh interval in milliseconds
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Biometric verifier
    #[serde(default)]
    pub biometric: BiometricConfig,

    /// Justification passed to the verifier
    #[serde(default = "default_biometric_reason")]
    pub biometric_reason: String,

    /// Give up on an unanswered biometric prompt after this many seconds
    #[serde(default = "default_prompt_timeout_secs")]
    pub prompt_timeout_secs: Option<u64>,
}

/// Biometric verifier selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BiometricConfig {
    /// No biometric unlock
    Disabled,
    /// Run an external program; exit status 0 unlocks
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Default for BiometricConfig {
    fn default() -> Self {
        let prompt = CommandPrompt::default();
        BiometricConfig::Command {
            program: prompt.program().to_string(),
            args: Vec::new(),
        }
    }
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_biometric_reason() -> String {
    DEFAULT_BIOMETRIC_REASON.to_string()
}

fn default_prompt_timeout_secs() -> Option<u64> {
    Some(60)
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            tick_rate_ms: default_tick_rate_ms(),
            biometric: BiometricConfig::default(),
            biometric_reason: default_biometric_reason(),
            prompt_timeout_secs: default_prompt_timeout_secs(),
        }
    }
}

impl TuiConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        // Try XDG_CONFIG_HOME first, then fall back to ~/.config
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default configuration if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Directory holding credentials, settings and logs
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::config_dir().ok_or(ConfigError::NoConfigDir),
        }
    }

    /// UI refresh interval
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }

    /// Unlock session settings
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            biometric_reason: self.biometric_reason.clone(),
            prompt_timeout: self.prompt_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Build the configured biometric prompt
    pub fn biometric_prompt(&self) -> Arc<dyn BiometricPrompt> {
        match &self.biometric {
            BiometricConfig::Disabled => Arc::new(NoBiometrics),
            BiometricConfig::Command { program, args } => {
                Arc::new(CommandPrompt::new(program.clone(), args.clone()))
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}
