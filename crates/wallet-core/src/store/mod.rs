// ============================================================================
// Session Store - string-keyed persistence for wallet and billing state
// ============================================================================
// Backends implement `KeyValueStore`; `SessionStore` gives typed access to
// the fixed keys the client persists across reloads.
// ============================================================================

mod redb_store;
mod session;

pub use redb_store::RedbStore;
pub use session::{SessionStore, UserProfile};

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

pub const KEY_WALLET_ADDRESS: &str = "walletAddress";
pub const KEY_WALLET_TYPE: &str = "walletType";
pub const KEY_SUBSCRIPTION: &str = "subscription";
pub const KEY_USER: &str = "user";
pub const KEY_TOKEN: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Small string-keyed, string-valued store. Last writer wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key, returning whether it was present
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// In-process store; contents are lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        debug!("Stored key: {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))?;
        Ok(entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(KEY_TOKEN).unwrap(), None);

        store.set(KEY_TOKEN, "abc").unwrap();
        assert_eq!(store.get(KEY_TOKEN).unwrap().as_deref(), Some("abc"));

        store.set(KEY_TOKEN, "def").unwrap();
        assert_eq!(store.get(KEY_TOKEN).unwrap().as_deref(), Some("def"));

        assert!(store.remove(KEY_TOKEN).unwrap());
        assert!(!store.remove(KEY_TOKEN).unwrap());
        assert_eq!(store.get(KEY_TOKEN).unwrap(), None);
    }
}
