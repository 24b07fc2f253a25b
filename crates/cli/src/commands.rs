//! Command definitions and dispatch against a session.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use progresso_core::{day, Container, Skill, Task, Theme};
use progresso_progress::{calendar_month, ChartView, ChartWindow, ProgressEngine, ProgressUpdate};
use progresso_storage::{Session, Storage};
use serde_json::json;

use crate::config::AppConfig;
use crate::render;
use crate::resolve;

fn parse_date(input: &str) -> std::result::Result<NaiveDate, String> {
    day::parse_day(input).ok_or_else(|| format!("invalid date `{input}`, expected YYYY-MM-DD"))
}

#[derive(Debug, Subcommand)]
pub enum Op {
    /// Manage skills
    #[command(subcommand)]
    Skill(SkillOp),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskOp),

    /// Show the skill tree with completion ratios
    Tree,

    /// Show progress for one skill, or overall
    Progress {
        /// Skill id, id suffix, or name
        skill: Option<String>,
    },

    /// Show hours and completed tasks for a day
    Day {
        /// Day to show (default: selected day, else today)
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Set exercise hours for a day
    Exercise {
        hours: f64,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Daily hours for a week, month, or year
    Chart {
        #[arg(value_enum, default_value_t = ViewArg::Week)]
        view: ViewArg,
        /// Any day inside the window (default: today)
        #[arg(long, value_parser = parse_date)]
        anchor: Option<NaiveDate>,
        /// Step back (negative) or forward from the anchor window
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
        /// Chart exercise hours instead of hours worked
        #[arg(long)]
        exercise: bool,
        /// Print buckets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Month calendar of hours worked
    Calendar {
        /// Any day in the month (default: selected day, else today)
        #[arg(long, value_parser = parse_date)]
        month: Option<NaiveDate>,
        #[arg(long)]
        exercise: bool,
    },

    /// Switch between light and dark theme
    Theme,

    /// Select a calendar day, or clear the selection
    Select {
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SkillOp {
    /// Add a skill at the root or under a parent
    Add {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Rename a skill
    Rename { skill: String, name: String },
    /// Delete a skill and everything under it
    Delete { skill: String },
    /// Set a skill's total hours; the change is logged for the day
    Hours {
        skill: String,
        hours: f64,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Reorder the skills of one container; every sibling must be listed
    Reorder {
        #[arg(long)]
        parent: Option<String>,
        #[arg(required = true)]
        order: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskOp {
    /// Add a task to a skill
    Add { skill: String, name: String },
    /// Mark a task completed
    Done {
        task: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Mark a task open again
    Undo { task: String },
    /// Rename a task
    Rename { task: String, name: String },
    /// Delete a task
    Delete { task: String },
    /// Reorder a skill's tasks; every task must be listed
    Reorder {
        skill: String,
        #[arg(required = true)]
        order: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewArg {
    Week,
    Month,
    Year,
}

impl From<ViewArg> for ChartView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Week => ChartView::Week,
            ViewArg::Month => ChartView::Month,
            ViewArg::Year => ChartView::Year,
        }
    }
}

/// Run one command. Returns the text to print.
pub fn apply<S: Storage>(
    op: Op,
    session: &mut Session<S>,
    engine: &ProgressEngine,
    config: &AppConfig,
) -> Result<String> {
    match op {
        Op::Skill(op) => skill(op, session, engine),
        Op::Task(op) => task(op, session, engine),
        Op::Tree => Ok(render::tree(session.model())),
        Op::Progress { skill } => {
            let model = session.model();
            match skill {
                Some(needle) => {
                    let id = resolve::skill(model, &needle)?;
                    let ratio = engine.ratio_of(model, id)?;
                    Ok(format!("{}: {}", model.find_skill(id)?.name, render::percent(ratio)))
                }
                None => {
                    let (done, total) = model.task_totals();
                    let ratio = engine.overall_ratio(model);
                    Ok(format!("Overall: {} ({done}/{total} tasks)", render::percent(ratio)))
                }
            }
        }
        Op::Day { date } => {
            let model = session.model();
            let date = date.unwrap_or_else(|| model.view.focus_date());
            Ok(render::day_report(model, date))
        }
        Op::Exercise { hours, date } => {
            let model = session.model_mut();
            let date = date.unwrap_or(model.view.current_date);
            engine.set_exercise_hours(model, date, hours);
            Ok(format!("Exercise on {date}: {}h", model.exercise_hours.hours_on(date)))
        }
        Op::Chart {
            view,
            anchor,
            offset,
            exercise,
            json,
        } => {
            let model = session.model();
            let anchor = anchor.unwrap_or(model.view.current_date);
            let window = ChartWindow::containing(view.into(), anchor, config.week_starts_on)
                .shifted(offset)
                .ok_or_else(|| anyhow!("Offset {offset} is outside the supported date range"))?;
            let ledger = if exercise { &model.exercise_hours } else { &model.worked_hours };
            let buckets = window.buckets(ledger);
            if json {
                let doc = json!({ "window": window, "title": window.title(), "buckets": buckets });
                serde_json::to_string_pretty(&doc).context("Failed to encode chart")
            } else {
                Ok(render::chart(&window, &buckets))
            }
        }
        Op::Calendar { month, exercise } => {
            let model = session.model();
            let anchor = month.unwrap_or_else(|| model.view.focus_date());
            let ledger = if exercise { &model.exercise_hours } else { &model.worked_hours };
            let grid = calendar_month(ledger, anchor, config.week_starts_on);
            Ok(render::calendar(&grid, config.week_starts_on, model.view.selected_date))
        }
        Op::Theme => {
            let theme = session.model_mut().view.toggle_theme();
            Ok(match theme {
                Theme::Light => "Theme: light".to_string(),
                Theme::Dark => "Theme: dark".to_string(),
            })
        }
        Op::Select { date } => {
            session.model_mut().view.selected_date = date;
            Ok(match date {
                Some(date) => format!("Selected {date}"),
                None => "Selection cleared".to_string(),
            })
        }
    }
}

fn skill<S: Storage>(op: SkillOp, session: &mut Session<S>, engine: &ProgressEngine) -> Result<String> {
    match op {
        SkillOp::Add { name, parent } => {
            let parent = parent
                .map(|needle| resolve::skill(session.model(), &needle))
                .transpose()?;
            let id = session.model_mut().insert_skill(parent, Skill::new(name))?;
            Ok(format!("Added skill #{}", resolve::short(id)))
        }
        SkillOp::Rename { skill, name } => {
            let id = resolve::skill(session.model(), &skill)?;
            session.model_mut().rename_skill(id, &name)?;
            Ok(format!("Renamed #{}", resolve::short(id)))
        }
        SkillOp::Delete { skill } => {
            let id = resolve::skill(session.model(), &skill)?;
            let name = session.model().find_skill(id)?.name.clone();
            let update = engine.delete_skill(session.model_mut(), id)?;
            Ok(with_sunk(format!("Deleted {name}"), &update))
        }
        SkillOp::Hours { skill, hours, date } => {
            let id = resolve::skill(session.model(), &skill)?;
            let model = session.model_mut();
            let date = date.unwrap_or(model.view.current_date);
            let delta = engine.set_skill_hours(model, id, hours, date)?;
            Ok(format!(
                "{}: {}h ({delta:+} on {date})",
                model.find_skill(id)?.name,
                model.find_skill(id)?.hours
            ))
        }
        SkillOp::Reorder { parent, order } => {
            let model = session.model();
            let container = match parent {
                Some(needle) => Container::Skill(resolve::skill(model, &needle)?),
                None => Container::Root,
            };
            let order = resolve::skills(model, &order)?;
            session.model_mut().reorder(container, &order)?;
            Ok(format!("Reordered {container}"))
        }
    }
}

fn task<S: Storage>(op: TaskOp, session: &mut Session<S>, engine: &ProgressEngine) -> Result<String> {
    match op {
        TaskOp::Add { skill, name } => {
            let id = resolve::skill(session.model(), &skill)?;
            let task = Task::new(name);
            let task_id = task.id;
            let update = engine.add_task(session.model_mut(), id, task)?;
            Ok(progress_line(format!("Added task #{}", resolve::short(task_id)), &update))
        }
        TaskOp::Done { task, date } => {
            let (skill, task) = resolve::task(session.model(), &task)?;
            let model = session.model_mut();
            let date = date.unwrap_or(model.view.current_date);
            let update = engine.set_task_completion(model, skill, task, true, date)?;
            Ok(progress_line("Completed".to_string(), &update))
        }
        TaskOp::Undo { task } => {
            let (skill, task) = resolve::task(session.model(), &task)?;
            let model = session.model_mut();
            let date = model.view.current_date;
            let update = engine.set_task_completion(model, skill, task, false, date)?;
            Ok(progress_line("Reopened".to_string(), &update))
        }
        TaskOp::Rename { task, name } => {
            let (skill, task) = resolve::task(session.model(), &task)?;
            session.model_mut().rename_task(skill, task, &name)?;
            Ok(format!("Renamed #{}", resolve::short(task)))
        }
        TaskOp::Delete { task } => {
            let (skill, task) = resolve::task(session.model(), &task)?;
            let update = engine.delete_task(session.model_mut(), skill, task)?;
            Ok(progress_line("Deleted".to_string(), &update))
        }
        TaskOp::Reorder { skill, order } => {
            let model = session.model();
            let skill = resolve::skill(model, &skill)?;
            let order = order
                .iter()
                .map(|needle| resolve::task_in(model, skill, needle))
                .collect::<Result<Vec<_>>>()?;
            session.model_mut().reorder_tasks(skill, &order)?;
            Ok(format!("Reordered tasks of #{}", resolve::short(skill)))
        }
    }
}

fn progress_line(head: String, update: &ProgressUpdate) -> String {
    let head = match update.skill() {
        Some(progress) => format!(
            "{head}; skill at {} ({}/{})",
            render::percent(progress.ratio),
            progress.completed,
            progress.total
        ),
        None => head,
    };
    with_sunk(head, update)
}

fn with_sunk(head: String, update: &ProgressUpdate) -> String {
    if update.sunk.is_empty() {
        head
    } else {
        format!("{head}; {} completed skill(s) moved to the end", update.sunk.len())
    }
}
