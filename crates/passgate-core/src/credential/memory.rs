//! In-memory credential store

use std::collections::HashMap;
use std::sync::Mutex;

use zeroize::Zeroizing;

use super::CredentialStore;
use crate::error::StoreError;

type Key = (String, String);

/// Credential store that lives only as long as the process
///
/// Useful for tests and for hosts that inject the passcode from elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<Key, Zeroizing<String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.secrets.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if the store holds no secrets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        let secrets = self.secrets.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(secrets
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), StoreError> {
        let mut secrets = self.secrets.lock().map_err(|_| StoreError::Poisoned)?;
        secrets.insert(
            (service.to_string(), account.to_string()),
            Zeroizing::new(secret.to_string()),
        );
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        let mut secrets = self.secrets.lock().map_err(|_| StoreError::Poisoned)?;
        secrets.remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_independent() {
        let store = MemoryStore::new();
        store.set("svc", "alice", "one").unwrap();
        store.set("svc", "bob", "two").unwrap();

        assert_eq!(store.get("svc", "alice").unwrap().unwrap().as_str(), "one");
        assert_eq!(store.get("svc", "bob").unwrap().unwrap().as_str(), "two");
        assert!(store.get("other", "alice").unwrap().is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.delete("svc", "acct").unwrap();
        store.set("svc", "acct", "secret").unwrap();
        store.delete("svc", "acct").unwrap();
        store.delete("svc", "acct").unwrap();
        assert!(store.is_empty());
    }
}
