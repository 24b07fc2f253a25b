//! JSON file storage implementation.
//!
//! Stores each blob as `<key>.json` in a data directory and keeps a small
//! meta marker per key (version + updated_at). Writes go to a temporary file
//! first and are renamed into place, so a crash mid-save never leaves a
//! truncated snapshot behind.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::trait_::validate_key;
use super::{Result, Storage};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the directory and its
    /// `meta/` subdirectory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("meta")).await?;
        debug!(root = %root.display(), "Opened JSON storage");
        Ok(Self { root })
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join("meta").join(format!("{}.meta.json", key))
    }

    /// Current version of a key, zero if it was never saved.
    pub async fn version(&self, key: &str) -> Result<u64> {
        validate_key(key)?;
        match fs::read_to_string(self.meta_path(key)).await {
            Ok(s) => Ok(serde_json::from_str::<serde_json::Value>(&s)
                .ok()
                .and_then(|json| json.get("version").and_then(|v| v.as_u64()))
                .unwrap_or(0)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and increment the per-key version, return new version.
    async fn bump_version(&self, key: &str) -> Result<u64> {
        let version = self.version(key).await? + 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(self.meta_path(key), serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save(&mut self, key: &str, blob: &[u8]) -> Result<()> {
        validate_key(key)?;
        let path = self.blob_path(key);
        let tmp = self.root.join(format!("{}.json.tmp", key));

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(blob).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, &path).await?;

        let version = self.bump_version(key).await?;
        info!(key, version, bytes = blob.len(), "Saved snapshot");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "Loaded snapshot");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
