//! Passgate Core - passcode-gated unlock sessions
//!
//! This crate decides when an application shows its lock screen, when it
//! attempts biometric unlock, and when it hands control back to the host once
//! the user is authenticated.
//!
//! # Collaborators
//!
//! The session itself owns very little state. Everything platform-specific is
//! reached through a capability trait:
//!
//! - [`CredentialStore`] holds the passcode (wrapped by [`PasscodeKeychain`])
//! - [`BiometricPrompt`] runs a fingerprint/face challenge
//! - [`Presenter`] shows and dismisses the lock screen
//! - [`SettingsSource`] exposes the persisted lock preferences
//! - [`LifecycleBus`] delivers "became active" / "resigned active" events

pub mod biometric;
pub mod credential;
pub mod error;
pub mod lifecycle;
pub mod presenter;
pub mod session;
pub mod settings;

pub use biometric::{BiometricOutcome, BiometricPrompt, CommandPrompt, NoBiometrics};
pub use credential::{
    CredentialStore, FileStore, MemoryStore, PasscodeKeychain, PASSCODE_SERVICE,
};
pub use error::{PresentError, SessionError, SettingsError, StoreError};
pub use lifecycle::{LifecycleBus, LifecycleEvent, Subscription};
pub use presenter::{ModalKind, Presenter, Transition};
pub use session::{Completion, PromptReply, PromptState, SessionConfig, UnlockSession};
pub use settings::{LockSettings, SettingsFile, SettingsSource};
