//! Unique identifiers for Progresso entities.
//!
//! Ids are ULIDs. Snapshots written by older builds used numeric
//! millisecond timestamps as ids; those still load and are mapped onto a
//! ULID carrying the same timestamp.

use serde::{de, Deserialize, Deserializer, Serialize};
use ulid::Ulid;

/// Unique identifier for a Skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SkillId(Ulid);

impl SkillId {
    /// Generate a new SkillId
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Map a legacy numeric id onto a SkillId.
    pub fn from_legacy(millis: u64) -> Self {
        Self(legacy_ulid(millis))
    }
}

impl Default for SkillId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SkillId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl<'de> Deserialize<'de> for SkillId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_id(deserializer).map(Self)
    }
}

/// Unique identifier for a Task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(Ulid);

impl TaskId {
    /// Generate a new TaskId
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Map a legacy numeric id onto a TaskId.
    pub fn from_legacy(millis: u64) -> Self {
        Self(legacy_ulid(millis))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for TaskId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_id(deserializer).map(Self)
    }
}

/// Legacy ids keep their timestamp; the random part stays zero so the
/// mapping is stable across loads.
fn legacy_ulid(millis: u64) -> Ulid {
    Ulid::from_parts(millis, 0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Legacy(u64),
}

fn decode_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Ulid, D::Error> {
    match RawId::deserialize(deserializer)? {
        RawId::Legacy(millis) => Ok(legacy_ulid(millis)),
        RawId::Text(text) => {
            if let Ok(ulid) = text.parse::<Ulid>() {
                return Ok(ulid);
            }
            text.parse::<u64>()
                .map(legacy_ulid)
                .map_err(|_| de::Error::custom(format!("invalid id `{text}`")))
        }
    }
}
