//! Turn user-typed references into ids.
//!
//! A reference is a full id, an id suffix of at least four characters, or an
//! exact (case-insensitive) name. Suffixes are used because ids created close
//! together share their leading timestamp characters.

use anyhow::{bail, Result};
use progresso_core::{Model, SkillId, TaskId};

const MIN_SUFFIX: usize = 4;
const SHORT_LEN: usize = 6;

/// Short display form of an id, accepted back by the resolvers.
pub fn short(id: impl ToString) -> String {
    let id = id.to_string();
    id[id.len().saturating_sub(SHORT_LEN)..].to_string()
}

pub fn skill(model: &Model, needle: &str) -> Result<SkillId> {
    let candidates = model
        .skills_depth_first()
        .into_iter()
        .map(|s| (s.id.to_string(), s.name.as_str(), s.id))
        .collect();
    pick("skill", needle, candidates)
}

pub fn task(model: &Model, needle: &str) -> Result<(SkillId, TaskId)> {
    let candidates = model
        .skills_depth_first()
        .into_iter()
        .flat_map(|s| s.tasks.iter().map(move |t| (t.id.to_string(), t.name.as_str(), (s.id, t.id))))
        .collect();
    pick("task", needle, candidates)
}

/// Resolve a task among the direct tasks of `skill` only.
pub fn task_in(model: &Model, skill: SkillId, needle: &str) -> Result<TaskId> {
    let candidates = model
        .find_skill(skill)?
        .tasks
        .iter()
        .map(|t| (t.id.to_string(), t.name.as_str(), t.id))
        .collect();
    pick("task", needle, candidates)
}

/// Resolve every reference in `needles`, in order.
pub fn skills(model: &Model, needles: &[String]) -> Result<Vec<SkillId>> {
    needles.iter().map(|n| skill(model, n)).collect()
}

fn pick<T: Copy>(kind: &str, needle: &str, candidates: Vec<(String, &str, T)>) -> Result<T> {
    let needle = needle.trim();
    if let Some((_, _, value)) = candidates.iter().find(|(id, _, _)| id.eq_ignore_ascii_case(needle)) {
        return Ok(*value);
    }

    if needle.len() >= MIN_SUFFIX {
        let upper = needle.to_ascii_uppercase();
        let by_suffix: Vec<T> = candidates
            .iter()
            .filter(|(id, _, _)| id.ends_with(&upper))
            .map(|(_, _, value)| *value)
            .collect();
        match by_suffix.as_slice() {
            [one] => return Ok(*one),
            [] => {}
            many => bail!("{} id `{}` is ambiguous ({} matches)", kind, needle, many.len()),
        }
    }

    let by_name: Vec<T> = candidates
        .iter()
        .filter(|(_, name, _)| name.eq_ignore_ascii_case(needle))
        .map(|(_, _, value)| *value)
        .collect();
    match by_name.as_slice() {
        [one] => Ok(*one),
        [] => bail!("No {} matches `{}`", kind, needle),
        many => bail!("{} name `{}` is ambiguous ({} matches), use its id", kind, needle, many.len()),
    }
}
