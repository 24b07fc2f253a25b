//! Progress engine.
//!
//! Ratios are derived from the tree on demand, never cached, so every
//! operation observes fully recomputed values. A skill's ratio counts every
//! task in its subtree; child ratios are never averaged.

use chrono::NaiveDate;
use progresso_core::{Model, Result, Skill, SkillId, Task, TaskId};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Configuration for the progress engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Move a skill to the end of its siblings once all of its tasks are done
    pub sink_completed: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sink_completed: true,
        }
    }
}

/// Completion ratio of a skill, in `[0, 1]`.
///
/// `completed / total` over every task in the subtree; zero when the
/// subtree holds no tasks.
pub fn completion_ratio(skill: &Skill) -> f64 {
    ratio(skill.completed_tasks(), skill.total_tasks())
}

fn ratio(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

/// Progress of one skill at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillProgress {
    /// Skill id
    pub id: SkillId,
    /// Completed tasks in the subtree
    pub completed: usize,
    /// All tasks in the subtree
    pub total: usize,
    /// `completed / total`, zero when empty
    pub ratio: f64,
}

impl SkillProgress {
    /// Measure a skill.
    pub fn of(skill: &Skill) -> Self {
        let completed = skill.completed_tasks();
        let total = skill.total_tasks();
        Self {
            id: skill.id,
            completed,
            total,
            ratio: ratio(completed, total),
        }
    }

    /// Whether every task in the subtree is done.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Result of a mutation: recomputed progress from the touched skill up to
/// its root, plus any skills that were moved to the end of their siblings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Touched skill first, then each ancestor up to the root
    pub path: Vec<SkillProgress>,
    /// Skills relocated by the sink policy
    pub sunk: Vec<SkillId>,
}

impl ProgressUpdate {
    /// Progress of the touched skill.
    pub fn skill(&self) -> Option<&SkillProgress> {
        self.path.first()
    }
}

/// The progress engine.
#[derive(Debug, Clone, Default)]
pub struct ProgressEngine {
    config: EngineConfig,
}

impl ProgressEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Completion ratio of the skill with `id`.
    pub fn ratio_of(&self, model: &Model, id: SkillId) -> Result<f64> {
        Ok(completion_ratio(model.find_skill(id)?))
    }

    /// Forest-wide ratio across every root skill.
    pub fn overall_ratio(&self, model: &Model) -> f64 {
        let (completed, total) = model.task_totals();
        ratio(completed, total)
    }

    /// Mark a task completed or open.
    ///
    /// Completing stamps the task with `day`. Progress is recomputed for the
    /// owning skill and every ancestor.
    pub fn set_task_completion(
        &self,
        model: &mut Model,
        skill: SkillId,
        task: TaskId,
        completed: bool,
        day: NaiveDate,
    ) -> Result<ProgressUpdate> {
        let changed = model.find_task_mut(skill, task)?.set_completed(completed, day);
        debug!(skill = %skill, task = %task, completed, changed, "Task completion set");
        self.settle(model, skill)
    }

    /// Add a task to a skill and recompute progress along its path.
    pub fn add_task(&self, model: &mut Model, skill: SkillId, task: Task) -> Result<ProgressUpdate> {
        model.add_task(skill, task)?;
        self.settle(model, skill)
    }

    /// Delete a task and recompute progress along its path.
    ///
    /// Removing the last open task can complete a skill, so this may sink.
    pub fn delete_task(&self, model: &mut Model, skill: SkillId, task: TaskId) -> Result<ProgressUpdate> {
        model.delete_task(skill, task)?;
        self.settle(model, skill)
    }

    /// Delete a skill subtree and recompute progress for its former parent.
    ///
    /// Ledger history contributed by the subtree is left untouched.
    pub fn delete_skill(&self, model: &mut Model, id: SkillId) -> Result<ProgressUpdate> {
        let parent = model.find_parent(id)?.map(|p| p.id);
        model.delete_skill(id)?;
        match parent {
            Some(parent) => self.settle(model, parent),
            None => Ok(ProgressUpdate::default()),
        }
    }

    /// Recompute progress from `skill` up to its root, applying the sink
    /// policy to every skill on that path that is now fully complete.
    pub fn settle(&self, model: &mut Model, skill: SkillId) -> Result<ProgressUpdate> {
        let mut chain = vec![skill];
        chain.extend(model.ancestors(skill)?);

        let mut update = ProgressUpdate::default();
        for id in chain {
            let progress = SkillProgress::of(model.find_skill(id)?);
            if self.config.sink_completed && progress.is_complete() && model.move_to_end(id)? {
                info!(skill = %id, "Completed skill moved to end of siblings");
                update.sunk.push(id);
            }
            update.path.push(progress);
        }
        Ok(update)
    }

    /// Set a skill's hours, recording the difference in the worked-hours
    /// ledger under `day`.
    ///
    /// Negative or non-finite input is treated as zero. Returns the delta
    /// that was recorded.
    pub fn set_skill_hours(
        &self,
        model: &mut Model,
        skill: SkillId,
        hours: f64,
        day: NaiveDate,
    ) -> Result<f64> {
        let hours = sanitize_hours(hours);
        let target = model.find_skill_mut(skill)?;
        let delta = hours - target.hours;
        target.hours = hours;
        if delta != 0.0 {
            model.worked_hours.record_delta(day, delta);
        }
        debug!(skill = %skill, hours, delta, %day, "Skill hours set");
        Ok(delta)
    }

    /// Set the exercise hours for `day`.
    pub fn set_exercise_hours(&self, model: &mut Model, day: NaiveDate, hours: f64) {
        let hours = sanitize_hours(hours);
        model.exercise_hours.set(day, hours);
        debug!(%day, hours, "Exercise hours set");
    }
}

fn sanitize_hours(hours: f64) -> f64 {
    if hours.is_finite() && hours >= 0.0 {
        hours
    } else {
        warn!(hours, "Rejected hours value, using 0");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tasks_completed_on;
    use progresso_core::{Container, EngineError, Missing};

    fn march(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn completed_task(name: &str) -> Task {
        let mut task = Task::new(name);
        task.set_completed(true, march(1));
        task
    }

    fn no_sink() -> ProgressEngine {
        ProgressEngine::new().with_config(EngineConfig {
            sink_completed: false,
        })
    }

    /// Guitar with Scales and Chords, both open.
    fn guitar_model() -> (Model, SkillId, TaskId, TaskId) {
        let scales = Task::new("Scales");
        let chords = Task::new("Chords");
        let (s, c) = (scales.id, chords.id);
        let guitar = Skill::new("Guitar").with_task(scales).with_task(chords);
        let g = guitar.id;
        let mut model = Model::new(march(1));
        model.skills.push(guitar);
        (model, g, s, c)
    }

    #[test]
    fn test_empty_subtree_ratio_is_zero() {
        let skill = Skill::new("Empty").with_child(Skill::new("Also empty"));
        assert_eq!(completion_ratio(&skill), 0.0);
        assert_eq!(ProgressEngine::new().overall_ratio(&Model::new(march(1))), 0.0);
    }

    #[test]
    fn test_ratio_counts_leaf_tasks_not_child_averages() {
        // child A: 1/1 done, child B: 0/3 done, own: 1/1 done.
        // averaging children would give 0.5; the subtree ratio is 2/5.
        let a = Skill::new("A").with_task(completed_task("a1"));
        let b = Skill::new("B")
            .with_task(Task::new("b1"))
            .with_task(Task::new("b2"))
            .with_task(Task::new("b3"));
        let root = Skill::new("Root")
            .with_task(completed_task("own"))
            .with_child(a)
            .with_child(b);

        assert_eq!(root.total_tasks(), 5);
        assert_eq!(root.completed_tasks(), 2);
        assert!((completion_ratio(&root) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guitar_scenario() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, scales, _) = guitar_model();
        assert_eq!(engine.ratio_of(&model, guitar).unwrap(), 0.0);

        let update = engine
            .set_task_completion(&mut model, guitar, scales, true, march(1))
            .unwrap();
        assert_eq!(update.skill().unwrap().ratio, 0.5);
        assert_eq!(engine.ratio_of(&model, guitar).unwrap(), 0.5);

        let names: Vec<_> = tasks_completed_on(&model, march(1))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Scales"]);
    }

    #[test]
    fn test_hours_scenario() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, ..) = guitar_model();

        assert_eq!(engine.set_skill_hours(&mut model, guitar, 2.0, march(1)).unwrap(), 2.0);
        assert_eq!(engine.set_skill_hours(&mut model, guitar, 5.0, march(1)).unwrap(), 3.0);
        assert_eq!(model.worked_hours.hours_on(march(1)), 5.0);
        assert_eq!(model.find_skill(guitar).unwrap().hours, 5.0);

        // editing down on another day records a negative delta there
        engine.set_skill_hours(&mut model, guitar, 4.0, march(2)).unwrap();
        assert_eq!(model.worked_hours.hours_on(march(2)), -1.0);
        assert_eq!(model.worked_hours.hours_on(march(1)), 5.0);
    }

    #[test]
    fn test_deleting_skill_keeps_ledger_history() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, ..) = guitar_model();
        engine.set_skill_hours(&mut model, guitar, 3.0, march(1)).unwrap();

        engine.delete_skill(&mut model, guitar).unwrap();
        assert!(model.skills.is_empty());
        assert_eq!(model.worked_hours.hours_on(march(1)), 3.0);
    }

    #[test]
    fn test_invalid_hours_clamp_to_zero() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, ..) = guitar_model();
        engine.set_skill_hours(&mut model, guitar, 2.0, march(1)).unwrap();
        engine.set_skill_hours(&mut model, guitar, f64::NAN, march(1)).unwrap();
        assert_eq!(model.find_skill(guitar).unwrap().hours, 0.0);
        assert_eq!(model.worked_hours.hours_on(march(1)), 0.0);
    }

    #[test]
    fn test_missing_ids_leave_model_untouched() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, ..) = guitar_model();
        let before = model.clone();

        let ghost_task = TaskId::new();
        let err = engine
            .set_task_completion(&mut model, guitar, ghost_task, true, march(1))
            .unwrap_err();
        assert_eq!(err, EngineError::NotFound(Missing::Task { skill: guitar, task: ghost_task }));

        let ghost = SkillId::new();
        assert!(matches!(
            engine.set_skill_hours(&mut model, ghost, 1.0, march(1)),
            Err(EngineError::NotFound(Missing::Skill(_)))
        ));
        assert!(engine.delete_skill(&mut model, ghost).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn test_propagates_to_every_ancestor() {
        let engine = no_sink();
        let leaf_task = Task::new("leaf");
        let lt = leaf_task.id;
        let leaf = Skill::new("Leaf").with_task(leaf_task);
        let mid = Skill::new("Mid").with_child(leaf.clone()).with_task(Task::new("mid"));
        let root = Skill::new("Root").with_child(mid.clone());
        let (leaf_id, mid_id, root_id) = (leaf.id, mid.id, root.id);
        let mut model = Model::new(march(1));
        model.skills.push(root);

        let update = engine
            .set_task_completion(&mut model, leaf_id, lt, true, march(2))
            .unwrap();
        let path: Vec<_> = update.path.iter().map(|p| (p.id, p.ratio)).collect();
        assert_eq!(path, vec![(leaf_id, 1.0), (mid_id, 0.5), (root_id, 0.5)]);
        assert!(update.sunk.is_empty());
    }

    #[test]
    fn test_completed_skill_sinks_once() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, scales, chords) = guitar_model();
        let piano = model.insert_skill(None, Skill::new("Piano")).unwrap();

        engine.set_task_completion(&mut model, guitar, scales, true, march(1)).unwrap();
        assert_eq!(model.skills[0].id, guitar);

        let update = engine
            .set_task_completion(&mut model, guitar, chords, true, march(1))
            .unwrap();
        assert_eq!(update.sunk, vec![guitar]);
        assert_eq!(model.skills.iter().map(|s| s.id).collect::<Vec<_>>(), vec![piano, guitar]);

        // already last: re-settling is a no-op
        let again = engine.settle(&mut model, guitar).unwrap();
        assert!(again.sunk.is_empty());
        assert_eq!(model.siblings(Container::Root).unwrap()[1].id, guitar);
    }

    #[test]
    fn test_sink_policy_can_be_disabled() {
        let engine = no_sink();
        let (mut model, guitar, scales, chords) = guitar_model();
        model.insert_skill(None, Skill::new("Piano")).unwrap();

        engine.set_task_completion(&mut model, guitar, scales, true, march(1)).unwrap();
        engine.set_task_completion(&mut model, guitar, chords, true, march(1)).unwrap();
        assert_eq!(model.skills[0].id, guitar);
    }

    #[test]
    fn test_deleting_last_open_task_completes_skill() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, scales, chords) = guitar_model();
        model.insert_skill(None, Skill::new("Piano")).unwrap();
        engine.set_task_completion(&mut model, guitar, scales, true, march(1)).unwrap();

        let update = engine.delete_task(&mut model, guitar, chords).unwrap();
        assert_eq!(update.skill().unwrap().ratio, 1.0);
        assert_eq!(update.sunk, vec![guitar]);
    }

    #[test]
    fn test_reopening_keeps_stale_date_hidden() {
        let engine = ProgressEngine::new();
        let (mut model, guitar, scales, _) = guitar_model();
        engine.set_task_completion(&mut model, guitar, scales, true, march(1)).unwrap();
        engine.set_task_completion(&mut model, guitar, scales, false, march(2)).unwrap();

        assert!(tasks_completed_on(&model, march(1)).is_empty());
        assert_eq!(engine.ratio_of(&model, guitar).unwrap(), 0.0);
    }

    #[test]
    fn test_exercise_hours_are_flat() {
        let engine = ProgressEngine::new();
        let mut model = Model::new(march(1));
        engine.set_exercise_hours(&mut model, march(3), 1.0);
        engine.set_exercise_hours(&mut model, march(3), 0.5);
        assert_eq!(model.exercise_hours.hours_on(march(3)), 0.5);
        assert!(model.worked_hours.is_empty());
    }
}
