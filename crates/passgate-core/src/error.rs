//! Error types for unlock sessions and their collaborators

use thiserror::Error;

/// Errors raised by a [`CredentialStore`](crate::CredentialStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A thread panicked while holding the store lock
    #[error("Credential store lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Errors returned when starting an unlock flow
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Another unlock flow is still waiting for the user
    #[error("An unlock flow is already pending")]
    UnlockPending,

    /// No passcode has been stored yet
    #[error("No passcode has been set")]
    PasscodeNotSet,
}

/// Errors raised by a [`Presenter`](crate::Presenter)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresentError {
    /// There is no surface to present the lock screen on
    #[error("No surface available to present the lock screen")]
    NoSurface,
}

/// Settings persistence errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<toml::ser::Error> for SettingsError {
    fn from(e: toml::ser::Error) -> Self {
        SettingsError::Serialize(e.to_string())
    }
}
