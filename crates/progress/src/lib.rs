//! Progress tracking and temporal aggregation.
//!
//! Completion ratios, hours edits, completed-task lookups, and the
//! week/month/year bucket queries the calendar and chart views read.

#![warn(missing_docs)]

pub mod engine;
pub mod aggregate;
pub mod window;

pub use engine::{completion_ratio, EngineConfig, ProgressEngine, ProgressUpdate, SkillProgress};
pub use aggregate::{calendar_month, range_aggregate, tasks_completed_on, CalendarMonth, DailyHours};
pub use window::{ChartView, ChartWindow, WeekStart};
