//! API key storage for Backlog spaces.
//!
//! Keys are stored per space in the operating system's credential store
//! (macOS Keychain, Windows Credential Manager, Linux Secret Service).
//! [`MemoryStore`] keeps keys in process memory for tests.
//!
//! # Example
//!
//! ```ignore
//! use backlog_storage::{ApiKeyStore, KeychainStore};
//!
//! let store = KeychainStore::new();
//! store.save("acme", "api-key")?;
//! assert_eq!(store.get("acme")?, Some("api-key".to_string()));
//! store.delete("acme")?;
//! ```

use backlog_core::{Error, Result};
use keyring::Entry;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Service name used in the OS keychain.
const SERVICE_NAME: &str = "backlog-tools";

/// Keychain account name holding the API key of a space.
pub fn api_key_entry(space: &str) -> String {
    format!("{}/api_key", space)
}

/// Storage for Backlog API keys, one per space.
pub trait ApiKeyStore: Send + Sync {
    /// Store the API key of a space, replacing any previous key.
    fn save(&self, space: &str, api_key: &str) -> Result<()>;

    /// The stored API key of a space, `Ok(None)` when there is none.
    fn get(&self, space: &str) -> Result<Option<String>>;

    /// Remove the API key of a space. Removing a missing key succeeds.
    fn delete(&self, space: &str) -> Result<()>;

    fn exists(&self, space: &str) -> bool {
        matches!(self.get(space), Ok(Some(_)))
    }
}

// =============================================================================
// KeychainStore
// =============================================================================

/// API key store backed by the OS keychain.
#[derive(Debug)]
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    pub fn new() -> Self {
        Self::with_service_name(SERVICE_NAME)
    }

    /// Use a different keychain service, e.g. to keep test keys apart.
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, space: &str) -> Result<Entry> {
        let account = api_key_entry(space);
        Entry::new(&self.service_name, &account).map_err(|e| {
            Error::Storage(format!("Failed to open keychain entry '{}': {}", account, e))
        })
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyStore for KeychainStore {
    fn save(&self, space: &str, api_key: &str) -> Result<()> {
        debug!(space = space, "Saving API key to keychain");
        self.entry(space)?
            .set_password(api_key)
            .map_err(|e| Error::Storage(format!("Failed to save API key for '{}': {}", space, e)))
    }

    fn get(&self, space: &str) -> Result<Option<String>> {
        match self.entry(space)?.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => {
                debug!(space = space, "No API key in keychain");
                Ok(None)
            }
            Err(e) => {
                warn!(space = space, error = %e, "Failed to read API key");
                Err(Error::Storage(format!(
                    "Failed to read API key for '{}': {}",
                    space, e
                )))
            }
        }
    }

    fn delete(&self, space: &str) -> Result<()> {
        debug!(space = space, "Deleting API key from keychain");
        match self.entry(space)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to delete API key for '{}': {}",
                space, e
            ))),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory API key store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiKeyStore for MemoryStore {
    fn save(&self, space: &str, api_key: &str) -> Result<()> {
        self.keys
            .write()
            .map_err(|e| Error::Storage(format!("Lock poisoned: {}", e)))?
            .insert(api_key_entry(space), api_key.to_string());
        Ok(())
    }

    fn get(&self, space: &str) -> Result<Option<String>> {
        let keys = self
            .keys
            .read()
            .map_err(|e| Error::Storage(format!("Lock poisoned: {}", e)))?;
        Ok(keys.get(&api_key_entry(space)).cloned())
    }

    fn delete(&self, space: &str) -> Result<()> {
        self.keys
            .write()
            .map_err(|e| Error::Storage(format!("Lock poisoned: {}", e)))?
            .remove(&api_key_entry(space));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_entry() {
        assert_eq!(api_key_entry("acme"), "acme/api_key");
    }

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryStore::new();
        assert!(!store.exists("acme"));

        store.save("acme", "key-1").unwrap();
        assert_eq!(store.get("acme").unwrap(), Some("key-1".to_string()));
        assert_eq!(store.get("other").unwrap(), None);

        store.save("acme", "key-2").unwrap();
        assert_eq!(store.get("acme").unwrap(), Some("key-2".to_string()));

        store.delete("acme").unwrap();
        assert!(!store.exists("acme"));

        // Deleting again is fine
        store.delete("acme").unwrap();
    }

    #[test]
    fn test_keychain_store_service_name() {
        assert_eq!(KeychainStore::new().service_name, "backlog-tools");
        assert_eq!(KeychainStore::default().service_name, "backlog-tools");
        assert_eq!(
            KeychainStore::with_service_name("test-service").service_name,
            "test-service"
        );
    }
}
