//! Week, month, and year chart windows.

use chrono::{Datelike, Days, Months, NaiveDate};
use progresso_core::{day, HourLedger};
use serde::{Deserialize, Serialize};

use crate::aggregate::{range_aggregate, DailyHours};

/// First day of the week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Weeks start on Sunday
    #[default]
    Sunday,
    /// Weeks start on Monday
    Monday,
}

impl WeekStart {
    /// Days between the start of the week and `date`.
    pub fn offset(self, date: NaiveDate) -> u32 {
        match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        }
    }
}

/// Span shown by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    /// Seven days
    Week,
    /// One calendar month
    Month,
    /// One calendar year
    Year,
}

/// A run of consecutive days aligned to a week, month, or year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartWindow {
    /// Span kind
    pub view: ChartView,
    /// First day in the window
    pub start: NaiveDate,
    /// Number of days in the window
    pub days: u32,
    #[serde(skip)]
    week_start: WeekStart,
}

impl ChartWindow {
    /// The window of kind `view` that contains `anchor`.
    pub fn containing(view: ChartView, anchor: NaiveDate, week_start: WeekStart) -> Self {
        let (start, days) = match view {
            ChartView::Week => {
                let back = Days::new(u64::from(week_start.offset(anchor)));
                (anchor.checked_sub_days(back).unwrap_or(anchor), 7)
            }
            ChartView::Month => {
                let first = anchor.with_day(1).unwrap_or(anchor);
                (first, day::days_in_month(first))
            }
            ChartView::Year => {
                let first = NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor);
                let next = NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1);
                let days = next.map(|n| (n - first).num_days() as u32).unwrap_or(365);
                (first, days)
            }
        };
        Self {
            view,
            start,
            days,
            week_start,
        }
    }

    /// Last day in the window.
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days.saturating_sub(1))))
            .unwrap_or(self.start)
    }

    /// The window immediately before this one.
    pub fn previous(&self) -> Self {
        let anchor = self.start.pred_opt().unwrap_or(self.start);
        Self::containing(self.view, anchor, self.week_start)
    }

    /// The window immediately after this one.
    pub fn next(&self) -> Self {
        let anchor = self.end().succ_opt().unwrap_or(self.start);
        Self::containing(self.view, anchor, self.week_start)
    }

    /// The window `steps` units away: negative steps go back in time.
    ///
    /// Computed in one jump, so large offsets cost the same as small ones.
    /// `None` if the target falls outside the representable date range.
    pub fn shifted(&self, steps: i32) -> Option<Self> {
        let n = steps.unsigned_abs();
        let forward = steps >= 0;
        let anchor = match self.view {
            ChartView::Week => {
                let days = Days::new(u64::from(n) * 7);
                if forward {
                    self.start.checked_add_days(days)
                } else {
                    self.start.checked_sub_days(days)
                }
            }
            ChartView::Month | ChartView::Year => {
                let months = match self.view {
                    ChartView::Year => n.checked_mul(12)?,
                    _ => n,
                };
                if forward {
                    self.start.checked_add_months(Months::new(months))
                } else {
                    self.start.checked_sub_months(Months::new(months))
                }
            }
        }?;
        Some(Self::containing(self.view, anchor, self.week_start))
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end()
    }

    /// Daily buckets from `ledger` for this window.
    pub fn buckets(&self, ledger: &HourLedger) -> Vec<DailyHours> {
        range_aggregate(ledger, self.start, self.days)
    }

    /// Heading for the window.
    pub fn title(&self) -> String {
        match self.view {
            ChartView::Week => format!("Week of {} - {}", self.start, self.end()),
            ChartView::Month => self.start.format("%B %Y").to_string(),
            ChartView::Year => self.start.year().to_string(),
        }
    }
}
