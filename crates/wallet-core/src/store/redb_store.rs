// ============================================================================
// RedbStore - Embedded on-disk KeyValueStore (redb)
// ============================================================================
// Default path: ~/.wallet-gate/session.redb (override via WALLET_GATE_DB_PATH)
// ============================================================================

use anyhow::{anyhow, Result};
use redb::{Database, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{KeyValueStore, StoreError};
use crate::config::ENV_DB_PATH;

const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// Persistent session store backed by a single redb table
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open (or create) the store at the given path.
    /// If `path` is None, uses WALLET_GATE_DB_PATH or ~/.wallet-gate/session.redb
    pub fn open(path: Option<&str>) -> Result<Self> {
        let db_path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var(ENV_DB_PATH) {
            PathBuf::from(env_path)
        } else {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
            let dir = home.join(".wallet-gate");
            std::fs::create_dir_all(&dir)
                .map_err(|e| anyhow!("Failed to create .wallet-gate directory: {}", e))?;
            dir.join("session.redb")
        };

        info!("Opening session store at: {}", db_path.display());

        let db = Database::create(&db_path).map_err(|e| anyhow!("Failed to open database: {}", e))?;

        // Ensure the table exists so reads on a fresh file succeed
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(ENTRIES)
                .map_err(|e| anyhow!("Failed to create entries table: {}", e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        Ok(Self { db, path: db_path })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored key/value pairs in key order
    pub fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| backend("begin read", e))?;
        let table = read_txn.open_table(ENTRIES).map_err(|e| backend("open entries table", e))?;

        let mut results = Vec::new();
        for entry in table.range::<&str>(..).map_err(|e| backend("iterate entries", e))? {
            let (key, value) = entry.map_err(|e| backend("read entry", e))?;
            results.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(results)
    }
}

fn backend(action: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("Failed to {}: {}", action, e))
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| backend("begin read", e))?;
        let table = read_txn.open_table(ENTRIES).map_err(|e| backend("open entries table", e))?;

        let value = table
            .get(key)
            .map_err(|e| backend("get entry", e))?
            .map(|v| v.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(|e| backend("begin write", e))?;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(|e| backend("open entries table", e))?;
            table.insert(key, value).map_err(|e| backend("insert entry", e))?;
        }
        write_txn.commit().map_err(|e| backend("commit", e))?;

        debug!("Stored key: {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write().map_err(|e| backend("begin write", e))?;
        let removed;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(|e| backend("open entries table", e))?;
            removed = table.remove(key).map_err(|e| backend("remove entry", e))?.is_some();
        }
        write_txn.commit().map_err(|e| backend("commit delete", e))?;

        if removed {
            debug!("Removed key: {}", key);
        }
        Ok(removed)
    }
}
