//! Progresso core data model.
//!
//! This crate defines the skill forest, the hour ledgers, and the tree
//! operations every other Progresso crate builds on. It performs no I/O.

#![warn(missing_docs)]

// Core identities
mod id;
pub mod day;
pub mod lenient;

// Entities
mod skill;
mod ledger;
mod view;
mod model;

// Operations
mod tree;
mod error;

// Re-exports
pub use id::{SkillId, TaskId};
pub use skill::{Skill, Task};
pub use ledger::HourLedger;
pub use view::{Theme, ViewState};
pub use model::Model;
pub use tree::{Container, Sequence};
pub use error::{EngineError, Missing, Result};
