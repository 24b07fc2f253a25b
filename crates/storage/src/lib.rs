//! Persistence for Progresso.
//!
//! This crate provides the snapshot codec, a trait-based storage interface
//! with a JSON file implementation, and the session that ties a model to its
//! store.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory_storage;
pub mod snapshot;
pub mod session;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory_storage::MemoryStorage;
pub use session::{Session, SharedSession, ShutdownAck};
