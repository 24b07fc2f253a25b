//! Snapshot codec - the whole model as one JSON document.
//!
//! ```text
//! {
//!   "currentTheme": "light" | "dark",
//!   "skills": [ { id, name, hours, skills: [...], tasks: [...] } ],
//!   "hoursWorkedDict": { "YYYY-MM-DD": hours },
//!   "exerciseHoursDict": { "YYYY-MM-DD": hours },
//!   "selectedDate": "YYYY-MM-DD" | null
//! }
//! ```
//!
//! Every field is optional on the way in; older documents missing a field
//! (or holding `null`) load with that field's default, and `null` entries
//! inside skill and task lists are dropped. The current date is
//! never written and is supplied by the caller at load time.

use chrono::NaiveDate;
use progresso_core::day::opt_day;
use progresso_core::lenient::{null_as_default, vec_skip_nulls};
use progresso_core::{EngineError, HourLedger, Model, Skill, Theme, ViewState};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Storage key the model is saved under unless configured otherwise.
pub const DEFAULT_KEY: &str = "ProgressoData";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a> {
    current_theme: Theme,
    skills: &'a [Skill],
    hours_worked_dict: &'a HourLedger,
    exercise_hours_dict: &'a HourLedger,
    #[serde(with = "opt_day")]
    selected_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotIn {
    #[serde(default, deserialize_with = "null_as_default")]
    current_theme: Theme,
    #[serde(default, alias = "subskills", deserialize_with = "vec_skip_nulls")]
    skills: Vec<Skill>,
    #[serde(default, deserialize_with = "null_as_default")]
    hours_worked_dict: HourLedger,
    #[serde(default, deserialize_with = "null_as_default")]
    exercise_hours_dict: HourLedger,
    #[serde(default, with = "opt_day")]
    selected_date: Option<NaiveDate>,
}

/// Serialize the model into an opaque blob.
pub fn encode(model: &Model) -> Result<Vec<u8>> {
    let doc = SnapshotOut {
        current_theme: model.view.theme,
        skills: &model.skills,
        hours_worked_dict: &model.worked_hours,
        exercise_hours_dict: &model.exercise_hours,
        selected_date: model.view.selected_date,
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Deserialize a blob, anchoring the view state on `today`.
pub fn decode(blob: &[u8], today: NaiveDate) -> std::result::Result<Model, EngineError> {
    let doc: SnapshotIn =
        serde_json::from_slice(blob).map_err(|e| EngineError::CorruptSnapshot(e.to_string()))?;
    Ok(Model {
        skills: doc.skills,
        worked_hours: doc.hours_worked_dict,
        exercise_hours: doc.exercise_hours_dict,
        view: ViewState {
            theme: doc.current_theme,
            selected_date: doc.selected_date,
            current_date: today,
        },
    })
}
