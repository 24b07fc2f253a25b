//! Calendar-day helpers.
//!
//! Every date the engine stores is a local calendar day. Older snapshots
//! wrote full timestamps (`2024-03-01T09:30:00.000Z`); those are reduced
//! to the local day they fall on.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

/// Key format used for ledger entries and persisted dates.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Today's local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a day from `YYYY-MM-DD`, a naive ISO date-time, or RFC 3339.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, DAY_FORMAT) {
        return Some(day);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(input) {
        return Some(stamp.with_timezone(&Local).date_naive());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

/// Number of days in the month containing `day`.
pub fn days_in_month(day: NaiveDate) -> u32 {
    let first = day.with_day(1).unwrap_or(day);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|next| (next - first).num_days() as u32).unwrap_or(31)
}

/// Serde adapter for optional days.
///
/// Writes `YYYY-MM-DD` (or `null`) and reads anything [`parse_day`] accepts.
pub mod opt_day {
    use super::{parse_day, DAY_FORMAT};
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize an optional day.
    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(day) => serializer.collect_str(&day.format(DAY_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional day.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| {
            parse_day(&text).ok_or_else(|| de::Error::custom(format!("unrecognized date `{text}`")))
        })
        .transpose()
    }
}
