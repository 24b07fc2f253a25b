//! Engine error taxonomy.
//!
//! None of these are fatal. A failed operation leaves the model untouched,
//! and a corrupt snapshot falls back to an empty model.

use crate::id::{SkillId, TaskId};
use crate::tree::Sequence;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// A skill id
    Skill(SkillId),
    /// A task id, within the named skill
    Task {
        /// Owning skill
        skill: SkillId,
        /// Task that was not found there
        task: TaskId,
    },
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Skill(id) => write!(f, "skill {id}"),
            Missing::Task { skill, task } => write!(f, "task {task} in skill {skill}"),
        }
    }
}

/// Errors raised by engine operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Referenced id is absent from the forest
    #[error("Not found: {0}")]
    NotFound(Missing),

    /// Reorder ids do not match the container's current members
    #[error("Invalid permutation for {sequence}: {reason}")]
    InvalidPermutation {
        /// Sequence the reorder targeted
        sequence: Sequence,
        /// What was wrong with the id list
        reason: String,
    },

    /// Snapshot blob could not be decoded
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl EngineError {
    pub(crate) fn skill(id: SkillId) -> Self {
        Self::NotFound(Missing::Skill(id))
    }

    pub(crate) fn task(skill: SkillId, task: TaskId) -> Self {
        Self::NotFound(Missing::Task { skill, task })
    }
}
