//! In-memory storage, for tests and throwaway sessions.

use std::collections::HashMap;

use super::trait_::validate_key;
use super::{Result, Storage};

/// Keeps blobs in a map; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one blob.
    pub fn with_blob(key: impl Into<String>, blob: impl Into<Vec<u8>>) -> Self {
        let mut blobs = HashMap::new();
        blobs.insert(key.into(), blob.into());
        Self { blobs }
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn save(&mut self, key: &str, blob: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.blobs.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.blobs.get(key).cloned())
    }
}
