//! Plain-text rendering for terminal output.

use std::fmt::Write;

use chrono::{Datelike, NaiveDate};
use progresso_core::{Model, Skill};
use progresso_progress::{completion_ratio, CalendarMonth, ChartView, ChartWindow, DailyHours, WeekStart};

use crate::resolve::short;

const BAR_WIDTH: usize = 30;
/// Bars never scale below this many hours, so a light week doesn't look full.
const BAR_FLOOR: f64 = 8.0;

pub fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

pub fn tree(model: &Model) -> String {
    if model.skills.is_empty() {
        return "No skills yet. Add one with `skill add <name>`.".to_string();
    }
    let mut out = String::new();
    for skill in &model.skills {
        skill_lines(&mut out, skill, 0);
    }
    out.pop();
    out
}

fn skill_lines(out: &mut String, skill: &Skill, depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = writeln!(
        out,
        "{pad}{} [{}] {}h ({}/{}) #{}",
        skill.name,
        percent(completion_ratio(skill)),
        skill.hours,
        skill.completed_tasks(),
        skill.total_tasks(),
        short(skill.id),
    );
    for task in &skill.tasks {
        let mark = if task.completed { "x" } else { " " };
        let done = task
            .completed_on()
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        let _ = writeln!(out, "{pad}  [{mark}] {}{done} #{}", task.name, short(task.id));
    }
    for child in &skill.children {
        skill_lines(out, child, depth + 1);
    }
}

pub fn day_report(model: &Model, date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", date.format("%A, %B %-d, %Y"));
    let _ = writeln!(out, "Hours worked: {}", model.worked_hours.hours_on(date));
    let _ = writeln!(out, "Exercise: {}", model.exercise_hours.hours_on(date));

    let done = progresso_progress::tasks_completed_on(model, date);
    if done.is_empty() {
        out.push_str("No tasks completed");
    } else {
        let _ = write!(out, "Completed ({}):", done.len());
        for task in done {
            let _ = write!(out, "\n  - {}", task.name);
        }
    }
    out
}

pub fn chart(window: &ChartWindow, buckets: &[DailyHours]) -> String {
    let mut out = String::new();
    let total: f64 = buckets.iter().map(|b| b.hours).sum();
    let _ = writeln!(out, "{}", window.title());

    match window.view {
        ChartView::Year => {
            // One row per month; per-day rows would be unreadable.
            let mut months = [0.0_f64; 12];
            for bucket in buckets {
                months[bucket.date.month0() as usize] += bucket.hours;
            }
            let scale = months.iter().copied().fold(BAR_FLOOR, f64::max);
            for (idx, hours) in months.iter().enumerate() {
                let label = NaiveDate::from_ymd_opt(window.start.year(), idx as u32 + 1, 1)
                    .map(|d| d.format("%b").to_string())
                    .unwrap_or_default();
                let _ = writeln!(out, "{label:<10} {} {hours}", bar(*hours, scale));
            }
        }
        ChartView::Week | ChartView::Month => {
            let scale = buckets.iter().map(|b| b.hours).fold(BAR_FLOOR, f64::max);
            for bucket in buckets {
                let label = bucket.date.format("%a %m-%d").to_string();
                let _ = writeln!(out, "{label:<10} {} {}", bar(bucket.hours, scale), bucket.hours);
            }
        }
    }
    let _ = write!(out, "Total: {total}h");
    out
}

fn bar(hours: f64, scale: f64) -> String {
    let filled = ((hours / scale) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Month grid. Each cell is the day number followed by an intensity mark:
/// `.` under two hours, `+` under five, `#` from five up.
pub fn calendar(month: &CalendarMonth, week_start: WeekStart, selected: Option<NaiveDate>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", month.first.format("%B %Y"));
    let header = match week_start {
        WeekStart::Sunday => " Su  Mo  Tu  We  Th  Fr  Sa",
        WeekStart::Monday => " Mo  Tu  We  Th  Fr  Sa  Su",
    };
    let _ = writeln!(out, "{header}");

    let mut column = month.leading_blanks as usize;
    out.push_str(&"    ".repeat(column));
    for bucket in &month.days {
        let mark = match bucket.hours {
            h if h <= 0.0 => ' ',
            h if h < 2.0 => '.',
            h if h < 5.0 => '+',
            _ => '#',
        };
        let open = if Some(bucket.date) == selected { '>' } else { ' ' };
        let _ = write!(out, "{open}{:>2}{mark}", bucket.date.day());
        column += 1;
        if column == 7 {
            out.push('\n');
            column = 0;
        }
    }
    if column != 0 {
        out.push('\n');
    }
    let _ = write!(out, "Total: {}h", month.total_hours());
    out
}
