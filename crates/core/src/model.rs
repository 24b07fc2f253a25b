//! The model aggregate - the single owned state every operation works on.

use chrono::NaiveDate;

use crate::day;
use crate::ledger::HourLedger;
use crate::skill::Skill;
use crate::view::ViewState;

/// Skill forest, hour ledgers, and view preferences.
///
/// The presentation layer holds the one instance and passes it to engine
/// operations; nothing in the engine keeps global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Root skills, in display order
    pub skills: Vec<Skill>,

    /// Hours worked per day, fed by skill hour edits
    pub worked_hours: HourLedger,

    /// Exercise hours per day, independent of the tree
    pub exercise_hours: HourLedger,

    /// View preferences
    pub view: ViewState,
}

impl Model {
    /// Empty model anchored on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            skills: Vec::new(),
            worked_hours: HourLedger::new(),
            exercise_hours: HourLedger::new(),
            view: ViewState::new(today),
        }
    }

    /// Completed and total task counts across the whole forest.
    pub fn task_totals(&self) -> (usize, usize) {
        self.skills.iter().fold((0, 0), |(done, total), skill| {
            (done + skill.completed_tasks(), total + skill.total_tasks())
        })
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(day::today())
    }
}
