//! View preferences persisted next to the model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Presentation-adjacent state. Carries no tree invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Current theme
    pub theme: Theme,
    /// Day picked in the calendar, if any
    pub selected_date: Option<NaiveDate>,
    /// "Today" as of load time; never persisted
    pub current_date: NaiveDate,
}

impl ViewState {
    /// Fresh view state anchored on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            theme: Theme::Light,
            selected_date: None,
            current_date: today,
        }
    }

    /// Switch between light and dark. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// The selected day, falling back to the current day.
    pub fn focus_date(&self) -> NaiveDate {
        self.selected_date.unwrap_or(self.current_date)
    }
}
