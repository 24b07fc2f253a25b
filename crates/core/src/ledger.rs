//! Hour ledger - date-indexed accumulator of hours.
//!
//! Entries are created lazily; a missing day reads as zero. Ledger entries
//! are history: they are never revised when the skill tree changes shape.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourLedger(BTreeMap<NaiveDate, f64>);

impl HourLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the entry for `day`. Negative deltas are allowed.
    pub fn record_delta(&mut self, day: NaiveDate, delta: f64) {
        *self.0.entry(day).or_insert(0.0) += delta;
    }

    /// Overwrite the entry for `day`.
    pub fn set(&mut self, day: NaiveDate, hours: f64) {
        self.0.insert(day, hours);
    }

    /// Hours recorded on `day`, zero if absent.
    pub fn hours_on(&self, day: NaiveDate) -> f64 {
        self.0.get(&day).copied().unwrap_or(0.0)
    }

    /// Iterate entries in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.0.iter().map(|(day, hours)| (*day, *hours))
    }

    /// Number of days with an entry.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no day has an entry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, f64)> for HourLedger {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_deltas_are_additive() {
        let mut ledger = HourLedger::new();
        assert_eq!(ledger.hours_on(day(1)), 0.0);

        ledger.record_delta(day(1), 3.0);
        ledger.record_delta(day(1), -1.0);
        assert_eq!(ledger.hours_on(day(1)), 2.0);

        ledger.record_delta(day(2), -0.5);
        assert_eq!(ledger.hours_on(day(2)), -0.5);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_set_overwrites() {
        let mut ledger = HourLedger::new();
        ledger.record_delta(day(4), 1.5);
        ledger.set(day(4), 0.75);
        assert_eq!(ledger.hours_on(day(4)), 0.75);
    }

    #[test]
    fn test_json_keys_are_days() {
        let ledger: HourLedger = [(day(1), 2.0), (day(9), 1.5)].into_iter().collect();
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"2024-03-01":2.0,"2024-03-09":1.5}"#);
        let back: HourLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
