//! Tree operations over the skill forest.
//!
//! Lookups are plain depth-first walks. Parents are found by walking the
//! forest again, so no node ever holds a reference to its owner. Every
//! mutating operation validates first and only then touches the model, so a
//! failure leaves the model exactly as it was.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::id::{SkillId, TaskId};
use crate::model::Model;
use crate::skill::{Skill, Task};

/// A sibling sequence of skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// The forest root sequence
    Root,
    /// Children of the given skill
    Skill(SkillId),
}

impl From<Option<SkillId>> for Container {
    fn from(parent: Option<SkillId>) -> Self {
        parent.map_or(Container::Root, Container::Skill)
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Root => write!(f, "root skills"),
            Container::Skill(id) => write!(f, "children of skill {id}"),
        }
    }
}

/// Any reorderable sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// A sibling sequence of skills
    Skills(Container),
    /// The task list of a skill
    Tasks(SkillId),
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sequence::Skills(container) => container.fmt(f),
            Sequence::Tasks(id) => write!(f, "tasks of skill {id}"),
        }
    }
}

impl Model {
    /// Find a skill anywhere in the forest. The first match wins.
    pub fn find_skill(&self, id: SkillId) -> Result<&Skill> {
        find_in(&self.skills, id).ok_or(EngineError::skill(id))
    }

    /// Mutable variant of [`Model::find_skill`].
    pub fn find_skill_mut(&mut self, id: SkillId) -> Result<&mut Skill> {
        find_in_mut(&mut self.skills, id).ok_or(EngineError::skill(id))
    }

    /// Direct parent of a skill, or `None` for a root skill.
    ///
    /// Refers to the same occurrence [`Model::find_skill`] returns.
    pub fn find_parent(&self, id: SkillId) -> Result<Option<&Skill>> {
        locate(&self.skills, None, id).ok_or(EngineError::skill(id))
    }

    /// The sibling sequence holding a skill.
    pub fn container_of(&self, id: SkillId) -> Result<Container> {
        Ok(self.find_parent(id)?.map_or(Container::Root, |p| Container::Skill(p.id)))
    }

    /// Ancestors of a skill, nearest first.
    pub fn ancestors(&self, id: SkillId) -> Result<Vec<SkillId>> {
        let mut chain = Vec::new();
        let mut current = self.find_parent(id)?;
        while let Some(parent) = current {
            chain.push(parent.id);
            current = locate(&self.skills, None, parent.id).flatten();
        }
        Ok(chain)
    }

    /// Skills of a sibling sequence, in order.
    pub fn siblings(&self, container: Container) -> Result<&[Skill]> {
        match container {
            Container::Root => Ok(&self.skills),
            Container::Skill(id) => Ok(&self.find_skill(id)?.children),
        }
    }

    fn siblings_mut(&mut self, container: Container) -> Result<&mut Vec<Skill>> {
        match container {
            Container::Root => Ok(&mut self.skills),
            Container::Skill(id) => Ok(&mut self.find_skill_mut(id)?.children),
        }
    }

    /// Every skill in depth-first, sibling order.
    pub fn skills_depth_first(&self) -> Vec<&Skill> {
        let mut out = Vec::new();
        walk(&self.skills, &mut out);
        out
    }

    /// Append a skill to `parent`'s children, or to the root sequence.
    pub fn insert_skill(&mut self, parent: Option<SkillId>, skill: Skill) -> Result<SkillId> {
        let id = skill.id;
        self.siblings_mut(parent.into())?.push(skill);
        info!(skill = %id, parent = ?parent, "Inserted skill");
        Ok(id)
    }

    /// Remove a skill and its whole subtree. Returns the removed subtree.
    pub fn delete_skill(&mut self, id: SkillId) -> Result<Skill> {
        let container = self.container_of(id)?;
        let siblings = self.siblings_mut(container)?;
        let index = siblings
            .iter()
            .position(|s| s.id == id)
            .ok_or(EngineError::skill(id))?;
        let removed = siblings.remove(index);
        info!(skill = %id, tasks = removed.total_tasks(), "Deleted skill subtree");
        Ok(removed)
    }

    /// Rename a skill. The name is trimmed; empty names are allowed.
    pub fn rename_skill(&mut self, id: SkillId, name: &str) -> Result<()> {
        self.find_skill_mut(id)?.name = name.trim().to_string();
        Ok(())
    }

    /// Replace the order of a sibling sequence.
    ///
    /// `order` must be exactly a permutation of the current sibling ids.
    pub fn reorder(&mut self, container: Container, order: &[SkillId]) -> Result<()> {
        let siblings = self.siblings_mut(container)?;
        match permute(siblings, order, |s| s.id) {
            Ok(changed) => {
                debug!(%container, changed, "Reordered skills");
                Ok(())
            }
            Err(reason) => {
                warn!(%container, %reason, "Rejected skill reorder");
                Err(EngineError::InvalidPermutation {
                    sequence: Sequence::Skills(container),
                    reason,
                })
            }
        }
    }

    /// Move a skill to the end of its sibling sequence.
    ///
    /// Returns `false` if it was already last.
    pub fn move_to_end(&mut self, id: SkillId) -> Result<bool> {
        let container = self.container_of(id)?;
        let siblings = self.siblings_mut(container)?;
        let index = siblings
            .iter()
            .position(|s| s.id == id)
            .ok_or(EngineError::skill(id))?;
        if index + 1 == siblings.len() {
            return Ok(false);
        }
        let skill = siblings.remove(index);
        siblings.push(skill);
        Ok(true)
    }

    /// Find a task within a skill's own task list.
    pub fn find_task(&self, skill: SkillId, task: TaskId) -> Result<&Task> {
        self.find_skill(skill)?
            .tasks
            .iter()
            .find(|t| t.id == task)
            .ok_or(EngineError::task(skill, task))
    }

    /// Mutable variant of [`Model::find_task`].
    pub fn find_task_mut(&mut self, skill: SkillId, task: TaskId) -> Result<&mut Task> {
        self.find_skill_mut(skill)?
            .tasks
            .iter_mut()
            .find(|t| t.id == task)
            .ok_or(EngineError::task(skill, task))
    }

    /// The skill that directly owns `task`, if any.
    pub fn owner_of_task(&self, task: TaskId) -> Option<SkillId> {
        self.skills_depth_first()
            .into_iter()
            .find(|s| s.tasks.iter().any(|t| t.id == task))
            .map(|s| s.id)
    }

    /// Append a task to a skill.
    pub fn add_task(&mut self, skill: SkillId, task: Task) -> Result<TaskId> {
        let id = task.id;
        self.find_skill_mut(skill)?.tasks.push(task);
        info!(skill = %skill, task = %id, "Added task");
        Ok(id)
    }

    /// Remove a task from a skill. Returns the removed task.
    pub fn delete_task(&mut self, skill: SkillId, task: TaskId) -> Result<Task> {
        let tasks = &mut self.find_skill_mut(skill)?.tasks;
        let index = tasks
            .iter()
            .position(|t| t.id == task)
            .ok_or(EngineError::task(skill, task))?;
        info!(skill = %skill, task = %task, "Deleted task");
        Ok(tasks.remove(index))
    }

    /// Rename a task. The name is trimmed.
    pub fn rename_task(&mut self, skill: SkillId, task: TaskId, name: &str) -> Result<()> {
        self.find_task_mut(skill, task)?.name = name.trim().to_string();
        Ok(())
    }

    /// Replace the order of a skill's tasks.
    pub fn reorder_tasks(&mut self, skill: SkillId, order: &[TaskId]) -> Result<()> {
        let tasks = &mut self.find_skill_mut(skill)?.tasks;
        permute(tasks, order, |t| t.id).map(|_| ()).map_err(|reason| {
            warn!(skill = %skill, %reason, "Rejected task reorder");
            EngineError::InvalidPermutation {
                sequence: Sequence::Tasks(skill),
                reason,
            }
        })
    }
}

fn find_in(skills: &[Skill], id: SkillId) -> Option<&Skill> {
    for skill in skills {
        if skill.id == id {
            return Some(skill);
        }
        if let Some(found) = find_in(&skill.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut(skills: &mut [Skill], id: SkillId) -> Option<&mut Skill> {
    for skill in skills.iter_mut() {
        if skill.id == id {
            return Some(skill);
        }
        if let Some(found) = find_in_mut(&mut skill.children, id) {
            return Some(found);
        }
    }
    None
}

/// Parent of the first depth-first occurrence of `id`, `Some(None)` for a
/// root. Same visiting order as `find_in`.
fn locate<'a>(skills: &'a [Skill], parent: Option<&'a Skill>, id: SkillId) -> Option<Option<&'a Skill>> {
    for skill in skills {
        if skill.id == id {
            return Some(parent);
        }
        if let Some(found) = locate(&skill.children, Some(skill), id) {
            return Some(found);
        }
    }
    None
}

fn walk<'a>(skills: &'a [Skill], out: &mut Vec<&'a Skill>) {
    for skill in skills {
        out.push(skill);
        walk(&skill.children, out);
    }
}

/// Rearrange `items` to follow `order`. Validates before moving anything.
///
/// Returns whether the order actually changed.
fn permute<T, K>(
    items: &mut Vec<T>,
    order: &[K],
    key: impl Fn(&T) -> K,
) -> std::result::Result<bool, String>
where
    K: Copy + Eq + Hash + Display,
{
    if order.len() != items.len() {
        return Err(format!("expected {} ids, got {}", items.len(), order.len()));
    }

    let positions: HashMap<K, usize> = items
        .iter()
        .enumerate()
        .map(|(index, item)| (key(item), index))
        .collect();
    let mut seen = HashSet::with_capacity(order.len());
    for id in order {
        if !positions.contains_key(id) {
            return Err(format!("unknown id {id}"));
        }
        if !seen.insert(*id) {
            return Err(format!("duplicate id {id}"));
        }
    }

    if order.iter().zip(items.iter()).all(|(id, item)| *id == key(item)) {
        return Ok(false);
    }

    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    for id in order {
        if let Some(item) = slots[positions[id]].take() {
            items.push(item);
        }
    }
    Ok(true)
}
