//! Date-indexed queries over the ledgers and the forest.

use chrono::{Datelike, NaiveDate};
use progresso_core::{day, HourLedger, Model, Task};
use serde::Serialize;

use crate::window::WeekStart;

/// Hours logged on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyHours {
    /// The day
    pub date: NaiveDate,
    /// Hours on that day, zero when nothing was logged
    pub hours: f64,
}

/// `days` consecutive daily buckets starting at `start`.
///
/// Labels and bucket boundaries are the caller's concern; this only reads
/// the ledger.
pub fn range_aggregate(ledger: &HourLedger, start: NaiveDate, days: u32) -> Vec<DailyHours> {
    start
        .iter_days()
        .take(days as usize)
        .map(|date| DailyHours {
            date,
            hours: ledger.hours_on(date),
        })
        .collect()
}

/// Every completed task whose completion day is `date`, in depth-first
/// sibling order (not completion order).
pub fn tasks_completed_on(model: &Model, date: NaiveDate) -> Vec<&Task> {
    model
        .skills
        .iter()
        .flat_map(|skill| skill.all_tasks())
        .filter(|task| task.completed_on() == Some(date))
        .collect()
}

/// Hours for every day of one calendar month, laid out for a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    /// First day of the month
    pub first: NaiveDate,
    /// Empty cells before the first day in a week row
    pub leading_blanks: u32,
    /// One bucket per day of the month
    pub days: Vec<DailyHours>,
}

impl CalendarMonth {
    /// Sum of all buckets.
    pub fn total_hours(&self) -> f64 {
        self.days.iter().map(|d| d.hours).sum()
    }
}

/// Calendar grid for the month containing `anchor`.
pub fn calendar_month(ledger: &HourLedger, anchor: NaiveDate, week_start: WeekStart) -> CalendarMonth {
    let first = anchor.with_day(1).unwrap_or(anchor);
    CalendarMonth {
        first,
        leading_blanks: week_start.offset(first),
        days: range_aggregate(ledger, first, day::days_in_month(first)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progresso_core::Skill;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_fills_missing_days_with_zero() {
        let mut ledger = HourLedger::new();
        ledger.record_delta(date(2024, 3, 2), 1.5);

        let buckets = range_aggregate(&ledger, date(2024, 2, 28), 4);
        let hours: Vec<_> = buckets.iter().map(|b| (b.date, b.hours)).collect();
        assert_eq!(
            hours,
            vec![
                (date(2024, 2, 28), 0.0),
                (date(2024, 2, 29), 0.0),
                (date(2024, 3, 1), 0.0),
                (date(2024, 3, 2), 1.5),
            ]
        );
        assert!(range_aggregate(&ledger, date(2024, 3, 1), 0).is_empty());
    }

    #[test]
    fn test_tasks_completed_on_uses_traversal_order() {
        let mut late = Task::new("late");
        late.set_completed(true, date(2024, 3, 1));
        let mut early = Task::new("early");
        early.set_completed(true, date(2024, 3, 1));
        let mut other_day = Task::new("other");
        other_day.set_completed(true, date(2024, 3, 2));

        let mut model = Model::new(date(2024, 3, 1));
        model.skills.push(
            Skill::new("A")
                .with_child(Skill::new("A1").with_task(late))
                .with_task(other_day),
        );
        model.skills.push(Skill::new("B").with_task(early).with_task(Task::new("open")));

        let names: Vec<_> = tasks_completed_on(&model, date(2024, 3, 1))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["late", "early"]);
    }

    #[test]
    fn test_calendar_month_layout() {
        let mut ledger = HourLedger::new();
        ledger.record_delta(date(2024, 2, 10), 2.0);
        ledger.record_delta(date(2024, 2, 29), 1.0);
        ledger.record_delta(date(2024, 3, 1), 9.0);

        // 2024-02-01 is a Thursday
        let month = calendar_month(&ledger, date(2024, 2, 17), WeekStart::Sunday);
        assert_eq!(month.first, date(2024, 2, 1));
        assert_eq!(month.leading_blanks, 4);
        assert_eq!(month.days.len(), 29);
        assert_eq!(month.total_hours(), 3.0);

        let monday = calendar_month(&ledger, date(2024, 2, 17), WeekStart::Monday);
        assert_eq!(monday.leading_blanks, 3);
    }
}
