use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use hifz_core::{compute_streak_stats_lenient, CoreError, Validator};

use crate::db;
use crate::error::ApiError;
use crate::models::{
    CreateStudentRequest, GetStudentsResponse, RosterQuery, Student, StudentSummary,
};
use crate::routes::{parse_id, resolve_as_of};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/{id}/export", get(export_student))
}

/// Totals for one student, from a fresh snapshot of their entries.
/// A student's id is also the user id their entries are stored under.
async fn summarize(
    state: &AppState,
    student: Student,
    as_of: NaiveDate,
) -> Result<StudentSummary, ApiError> {
    let user_id = Uuid::parse_str(&student.id).map_err(|_| {
        CoreError::Storage(format!("corrupt id in student row: {}", student.id))
    })?;
    let entries = state.entries.list(user_id).await?;
    let stats = compute_streak_stats_lenient(&entries, as_of).stats;

    Ok(StudentSummary {
        id: student.id,
        full_name: student.full_name,
        total_pages: stats.total_pages,
        total_hours: stats.total_hours,
        total_days: stats.total_days,
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
    })
}

/// GET /api/students?as_of= - Roster with progress totals.
async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<GetStudentsResponse>, ApiError> {
    let as_of = resolve_as_of(query.as_of.as_deref())?;

    let mut students = Vec::new();
    for student in db::list_students(&state.pool).await? {
        students.push(summarize(&state, student, as_of).await?);
    }

    Ok(Json(GetStudentsResponse {
        as_of,
        total_students: students.len(),
        total_pages: students.iter().map(|s| s.total_pages).sum(),
        active_students: students.iter().filter(|s| s.total_days > 0).count(),
        students,
    }))
}

/// POST /api/students - Add a student to the roster.
async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Validator::validate_full_name(&req.full_name).map_err(CoreError::from)?;

    let student = db::insert_student(&state.pool, &req.full_name).await?;
    tracing::info!(student_id = %student.id, "Added student");

    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /api/students/{id}/export?as_of= - CSV summary for one student.
async fn export_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RosterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "student")?;
    let as_of = resolve_as_of(query.as_of.as_deref())?;

    let student = db::get_student(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    let summary = summarize(&state, student, as_of).await?;

    let disposition = format!(
        "attachment; filename=\"{}_memorization_stats.csv\"",
        export_file_stem(&summary.full_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_csv(&summary, as_of)?,
    ))
}

/// One CSV row; field names double as the header.
#[derive(Serialize)]
struct ExportRow<'a> {
    student: &'a str,
    as_of: NaiveDate,
    total_pages: f64,
    total_hours: f64,
    total_days: u32,
    current_streak: u32,
    longest_streak: u32,
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn render_csv(summary: &StudentSummary, as_of: NaiveDate) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.serialize(ExportRow {
        student: &summary.full_name,
        as_of,
        total_pages: one_decimal(summary.total_pages),
        total_hours: one_decimal(summary.total_hours),
        total_days: summary.total_days,
        current_streak: summary.current_streak,
        longest_streak: summary.longest_streak,
    })?;
    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// Whitespace runs become underscores; anything outside [A-Za-z0-9_-] is dropped.
fn export_file_stem(full_name: &str) -> String {
    let stem = full_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect::<String>();
    if stem.is_empty() {
        "student".to_string()
    } else {
        stem
    }
}
