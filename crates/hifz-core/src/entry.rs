use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};

/// Attendance status recorded for a memorization day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    #[default]
    Present,
    Absent,
    Partial,
}

impl Attendance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Present => "present",
            Attendance::Absent => "absent",
            Attendance::Partial => "partial",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attendance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Attendance::Present),
            "absent" => Ok(Attendance::Absent),
            "partial" => Ok(Attendance::Partial),
            other => Err(ValidationError::InvalidAttendance(other.to_string())),
        }
    }
}

/// One memorization record for a (user, date) pair.
///
/// `date` is kept as the text the store handed back; use [`MemorizationEntry::day`]
/// to get the normalized calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorizationEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: String,
    pub pages: f64,
    pub time_minutes: u32,
    pub attendance: Attendance,
    pub notes: Option<String>,
}

impl MemorizationEntry {
    /// Calendar day of this entry, with any time-of-day discarded.
    pub fn day(&self) -> Result<NaiveDate, CoreError> {
        parse_entry_date(&self.date)
    }
}

/// Write-side payload for an upsert keyed on (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: String,
    pub pages: f64,
    pub time_minutes: u32,
    #[serde(default)]
    pub attendance: Attendance,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntryDraft {
    pub fn new(date: impl Into<String>, pages: f64, time_minutes: u32) -> Self {
        Self {
            date: date.into(),
            pages,
            time_minutes,
            attendance: Attendance::Present,
            notes: None,
        }
    }

    pub fn with_attendance(mut self, attendance: Attendance) -> Self {
        self.attendance = attendance;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Build the stored entry, rewriting `date` to its canonical `YYYY-MM-DD` form.
    pub fn into_entry(self, id: Uuid, user_id: Uuid) -> Result<MemorizationEntry, CoreError> {
        let day = parse_entry_date(&self.date)?;
        Ok(MemorizationEntry {
            id,
            user_id,
            date: format_day(day),
            pages: self.pages,
            time_minutes: self.time_minutes,
            attendance: self.attendance,
            notes: self.notes,
        })
    }
}

/// Parse the date forms stores hand back into a calendar day.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.f]` datetime and RFC 3339
/// timestamps. For timestamps the date in the timestamp's own offset is used.
pub fn parse_entry_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let s = raw.trim();

    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(CoreError::InvalidDate(raw.to_string()))
}

/// Canonical text form of a calendar day.
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
