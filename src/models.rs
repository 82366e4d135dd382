use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hifz_core::{
    CoreError, EntryDraft, GeoPoint, HeatmapCell, MemorizationEntry, StatsReport, Validator,
};

/// Request to record (or overwrite) the entry for one day.
#[derive(Debug, Deserialize)]
pub struct UpsertEntryRequest {
    pub date: String,
    pub pages: f64,
    pub time_minutes: i64,
    pub attendance: Option<String>,
    pub notes: Option<String>,
}

impl UpsertEntryRequest {
    /// Validate wire values and build the core draft.
    pub fn into_draft(self) -> Result<EntryDraft, CoreError> {
        let time_minutes = Validator::validate_time_minutes(self.time_minutes)?;
        let attendance = match self.attendance.as_deref() {
            Some(raw) => Validator::validate_attendance(raw)?,
            None => Default::default(),
        };
        let notes = self.notes.filter(|n| !n.trim().is_empty());

        let draft = EntryDraft {
            date: self.date,
            pages: self.pages,
            time_minutes,
            attendance,
            notes,
        };
        Validator::validate_draft(&draft)?;
        Ok(draft)
    }
}

/// Response for upserting an entry.
#[derive(Debug, Serialize)]
pub struct UpsertEntryResponse {
    pub status: &'static str, // "created" or "updated"
    pub entry: MemorizationEntry,
}

#[derive(Debug, Serialize)]
pub struct ListEntriesResponse {
    pub user_id: String,
    pub entries: Vec<MemorizationEntry>,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub id: String,
    pub deleted: bool,
}

/// Query parameters for the stats endpoint.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub as_of: Option<String>,
    /// Fail on malformed records instead of skipping them.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub user_id: String,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub report: StatsReport,
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub as_of: Option<String>,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub user_id: String,
    pub as_of: NaiveDate,
    pub days: usize,
    pub cells: Vec<HeatmapCell>,
}

/// Query parameters for the Qibla endpoint.
/// `heading` is clockwise from north; `alpha` is a raw counter-clockwise sensor reading.
#[derive(Debug, Deserialize)]
pub struct QiblaQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub heading: Option<f64>,
    pub alpha: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct QiblaResponse {
    pub observer: GeoPoint,
    pub target: GeoPoint,
    pub bearing: f64,
    pub device_heading: Option<f64>,
    pub relative_heading: Option<f64>,
}

/// A student on the roster.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub full_name: String,
}

/// Roster line with progress totals.
#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub id: String,
    pub full_name: String,
    pub total_pages: f64,
    pub total_hours: f64,
    pub total_days: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub as_of: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetStudentsResponse {
    pub as_of: NaiveDate,
    pub total_students: usize,
    /// Pages memorized across the whole roster.
    pub total_pages: f64,
    /// Students with at least one recorded day.
    pub active_students: usize,
    pub students: Vec<StudentSummary>,
}
