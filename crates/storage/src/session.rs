//! Session - the owned model bound to its persistence store.
//!
//! The session is the only holder of the model. Engine operations run
//! against [`Session::model_mut`] one at a time; persistence happens only
//! through [`Session::save`] and [`Session::shutdown`].

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use progresso_core::{day, Model};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::snapshot;
use crate::{Result, Storage};

/// Proof that the model was saved before shutdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ShutdownAck {
    /// Key the final snapshot was written under
    pub key: String,
    /// Size of the final snapshot
    pub bytes: usize,
    /// When the save completed
    pub saved_at: DateTime<Utc>,
}

/// A session shared between concurrent callers.
///
/// The mutex keeps one operation in flight at a time.
pub type SharedSession<S> = Arc<Mutex<Session<S>>>;

/// The model plus the store it is loaded from and saved to.
pub struct Session<S: Storage> {
    storage: S,
    key: String,
    model: Model,
    dirty: bool,
    /// Unreadable snapshot found at open, with the key it is copied to
    /// before the first save overwrites it.
    backup: Option<(String, Vec<u8>)>,
}

impl<S: Storage> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("dirty", &self.dirty)
            .field("backup", &self.backup.as_ref().map(|(key, _)| key))
            .field("roots", &self.model.skills.len())
            .finish()
    }
}

impl<S: Storage> Session<S> {
    /// Load the model stored under `key`.
    ///
    /// A missing snapshot starts an empty model; a corrupt one is logged and
    /// replaced by an empty model, and the corrupt blob is copied to
    /// `<key>-corrupt-<timestamp>` on the first save. Store I/O failures are
    /// returned.
    pub async fn open(storage: S, key: impl Into<String>) -> Result<Self> {
        Self::open_at(storage, key, day::today()).await
    }

    /// [`Session::open`] with an explicit "today".
    pub async fn open_at(storage: S, key: impl Into<String>, today: NaiveDate) -> Result<Self> {
        let key = key.into();
        let mut backup = None;
        let model = match storage.load(&key).await? {
            Some(blob) => match snapshot::decode(&blob, today) {
                Ok(model) => model,
                Err(err) => {
                    let backup_key = format!("{}-corrupt-{}", key, Utc::now().format("%Y%m%dT%H%M%S"));
                    warn!(key = %key, backup = %backup_key, error = %err, "Unreadable snapshot, starting empty");
                    backup = Some((backup_key, blob));
                    Model::new(today)
                }
            },
            None => {
                info!(key = %key, "No snapshot yet, starting empty");
                Model::new(today)
            }
        };
        Ok(Self {
            storage,
            key,
            model,
            dirty: false,
            backup,
        })
    }

    /// Wrap the session for shared, serialized access.
    pub fn into_shared(self) -> SharedSession<S> {
        Arc::new(Mutex::new(self))
    }

    /// The model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mutable access to the model. Marks the session dirty.
    pub fn model_mut(&mut self) -> &mut Model {
        self.dirty = true;
        &mut self.model
    }

    /// Whether the model changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key an unreadable snapshot will be copied to on the next save.
    pub fn pending_backup(&self) -> Option<&str> {
        self.backup.as_ref().map(|(key, _)| key.as_str())
    }

    /// Write the current model to the store.
    ///
    /// Returns the snapshot size once the store acknowledged it. An
    /// unreadable snapshot found at open is copied aside first; if that copy
    /// fails nothing is overwritten.
    pub async fn save(&mut self) -> Result<usize> {
        let blob = snapshot::encode(&self.model)?;
        if let Some((backup_key, old)) = self.backup.take() {
            if let Err(err) = self.storage.save(&backup_key, &old).await {
                self.backup = Some((backup_key, old));
                return Err(err);
            }
            info!(key = %backup_key, bytes = old.len(), "Kept a copy of the unreadable snapshot");
        }
        self.storage.save(&self.key, &blob).await?;
        self.dirty = false;
        Ok(blob.len())
    }

    /// Save, then acknowledge shutdown.
    ///
    /// The acknowledgement only exists if the save succeeded; on failure the
    /// session is handed back with the error so nothing in memory is lost.
    pub async fn shutdown(mut self) -> std::result::Result<ShutdownAck, (Self, crate::StorageError)> {
        match self.save().await {
            Ok(bytes) => {
                info!(key = %self.key, bytes, "Saved before shutdown");
                Ok(ShutdownAck {
                    key: self.key,
                    bytes,
                    saved_at: Utc::now(),
                })
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "Save before shutdown failed");
                Err((self, err))
            }
        }
    }

    /// Give back the store, dropping the model.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
