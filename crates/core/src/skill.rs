//! Skill and Task models - the nodes and leaves of the progress tree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::day::opt_day;
use crate::id::{SkillId, TaskId};
use crate::lenient::vec_skip_nulls;

/// A named node in the progress tree.
///
/// A skill exclusively owns its sub-skills and tasks. Parent links are never
/// stored; the parent of a skill is found by walking the forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier
    pub id: SkillId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Hours logged against this skill so far
    #[serde(default)]
    pub hours: f64,

    /// Sub-skills, in display order
    #[serde(
        rename = "skills",
        alias = "subskills",
        default,
        deserialize_with = "vec_skip_nulls"
    )]
    pub children: Vec<Skill>,

    /// Tasks, in display order
    #[serde(default, deserialize_with = "vec_skip_nulls")]
    pub tasks: Vec<Task>,
}

impl Skill {
    /// Create an empty skill with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SkillId::new(),
            name: name.into().trim().to_string(),
            hours: 0.0,
            children: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Builder-style helper to attach a child skill.
    pub fn with_child(mut self, child: Skill) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style helper to attach a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Every task in this subtree: own tasks first, then each child's
    /// subtree in sibling order.
    pub fn all_tasks(&self) -> Vec<&Task> {
        let mut out = Vec::new();
        self.collect_tasks(&mut out);
        out
    }

    fn collect_tasks<'a>(&'a self, out: &mut Vec<&'a Task>) {
        out.extend(self.tasks.iter());
        for child in &self.children {
            child.collect_tasks(out);
        }
    }

    /// Total number of tasks anywhere in this subtree.
    pub fn total_tasks(&self) -> usize {
        self.tasks.len() + self.children.iter().map(Skill::total_tasks).sum::<usize>()
    }

    /// Number of completed tasks anywhere in this subtree.
    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
            + self.children.iter().map(Skill::completed_tasks).sum::<usize>()
    }

    /// Whether `id` names this skill or any descendant.
    pub fn contains(&self, id: SkillId) -> bool {
        self.id == id || self.children.iter().any(|c| c.contains(id))
    }
}

/// A leaf unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task name
    #[serde(default)]
    pub name: String,

    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,

    /// Day the task was last completed. Only meaningful while `completed`.
    #[serde(
        rename = "date",
        default,
        with = "opt_day",
        skip_serializing_if = "Option::is_none"
    )]
    pub completion_date: Option<NaiveDate>,
}

impl Task {
    /// Create an open task with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into().trim().to_string(),
            completed: false,
            completion_date: None,
        }
    }

    /// Completion day, hidden while the task is open.
    pub fn completed_on(&self) -> Option<NaiveDate> {
        if self.completed {
            self.completion_date
        } else {
            None
        }
    }

    /// Set the completion flag. The date is stamped only on the
    /// open-to-completed transition.
    ///
    /// Returns `true` if the flag changed.
    pub fn set_completed(&mut self, completed: bool, day: NaiveDate) -> bool {
        if self.completed == completed {
            return false;
        }
        self.completed = completed;
        if completed {
            self.completion_date = Some(day);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_names_are_trimmed() {
        assert_eq!(Skill::new("  Guitar ").name, "Guitar");
        assert_eq!(Task::new("Scales\n").name, "Scales");
    }

    #[test]
    fn test_task_counts_cover_subtree() {
        let mut done = Task::new("done");
        done.set_completed(true, day(1));
        let skill = Skill::new("root")
            .with_task(Task::new("a"))
            .with_child(Skill::new("child").with_task(done).with_task(Task::new("b")));

        assert_eq!(skill.total_tasks(), 3);
        assert_eq!(skill.completed_tasks(), 1);
        let names: Vec<_> = skill.all_tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "done", "b"]);
    }

    #[test]
    fn test_stale_completion_date_is_hidden() {
        let mut task = Task::new("Scales");
        assert!(task.set_completed(true, day(1)));
        assert_eq!(task.completed_on(), Some(day(1)));

        assert!(task.set_completed(false, day(2)));
        assert_eq!(task.completion_date, Some(day(1)));
        assert_eq!(task.completed_on(), None);

        // re-completing restamps
        assert!(task.set_completed(true, day(3)));
        assert_eq!(task.completed_on(), Some(day(3)));
        assert!(!task.set_completed(true, day(4)));
        assert_eq!(task.completed_on(), Some(day(3)));
    }

    #[test]
    fn test_legacy_skill_shape() {
        let json = r#"{
            "id": 1709280000000,
            "name": "Guitar",
            "hours": 2.5,
            "isEditing": false,
            "subskills": [{ "id": 1709280000001, "name": "Theory" }],
            "tasks": [{ "id": 1709280000002, "name": "Scales", "completed": true, "date": "2024-03-01T10:00:00.000" }]
        }"#;
        let skill: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(skill.children.len(), 1);
        assert_eq!(skill.children[0].hours, 0.0);
        assert_eq!(skill.tasks[0].completed_on(), Some(day(1)));
    }

    #[test]
    fn test_null_entries_are_dropped() {
        let json = r#"{
            "id": 1709280000000,
            "name": "Guitar",
            "skills": [null, { "id": 1709280000001, "name": "Theory", "tasks": null }],
            "tasks": [{ "id": 1709280000002, "name": "Scales" }, null]
        }"#;
        let skill: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(skill.children.len(), 1);
        assert!(skill.children[0].tasks.is_empty());
        assert_eq!(skill.tasks.len(), 1);
        assert_eq!(skill.tasks[0].name, "Scales");
    }
}
