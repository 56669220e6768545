//! Credential storage for the unlock passcode
//!
//! Secrets are addressed by a `(service, account)` pair, the same shape a
//! platform keychain uses. The passcode always lives under
//! [`PASSCODE_SERVICE`] for both parts of the key.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::error::StoreError;

/// Service and account name of the passcode credential
pub const PASSCODE_SERVICE: &str = "dev.passgate.passcode";

/// Secure key-value storage for secrets
pub trait CredentialStore: Send + Sync {
    /// Read a secret, `None` if nothing is stored under the key
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<String>>, StoreError>;

    /// Create or overwrite a secret
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), StoreError>;

    /// Remove a secret. Removing a missing secret is not an error.
    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError>;
}

/// Best-effort access to the single stored passcode
#[derive(Clone)]
pub struct PasscodeKeychain {
    store: Arc<dyn CredentialStore>,
}

impl PasscodeKeychain {
    /// Wrap a credential store
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Store a new passcode, or delete it when `passcode` is `None`
    ///
    /// Store failures are logged and otherwise ignored.
    pub fn set_passcode(&self, passcode: Option<&str>) {
        let result = match passcode {
            Some(value) => self.store.set(PASSCODE_SERVICE, PASSCODE_SERVICE, value),
            None => self.store.delete(PASSCODE_SERVICE, PASSCODE_SERVICE),
        };

        match result {
            Ok(()) if passcode.is_some() => tracing::info!("Passcode updated"),
            Ok(()) => tracing::info!("Passcode removed"),
            Err(e) => tracing::warn!("Failed to update passcode: {}", e),
        }
    }

    /// The stored passcode, or an empty string if none can be read
    pub fn passcode(&self) -> Zeroizing<String> {
        match self.store.get(PASSCODE_SERVICE, PASSCODE_SERVICE) {
            Ok(Some(secret)) => secret,
            Ok(None) => Zeroizing::new(String::new()),
            Err(e) => {
                tracing::warn!("Failed to read passcode: {}", e);
                Zeroizing::new(String::new())
            }
        }
    }

    /// Check if a passcode has been set
    pub fn is_set(&self) -> bool {
        !self.passcode().is_empty()
    }
}

impl std::fmt::Debug for PasscodeKeychain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeKeychain").finish_non_exhaustive()
    }
}
