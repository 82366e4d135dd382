use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use hifz_core::{
    compute_heatmap, compute_stats_report, CoreError, MalformedRecords, DEFAULT_HEATMAP_DAYS,
};

use crate::error::ApiError;
use crate::models::{HeatmapQuery, HeatmapResponse, StatsQuery, StatsResponse};
use crate::routes::{parse_id, resolve_as_of};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/{user_id}/stats", get(get_stats))
        .route("/api/users/{user_id}/heatmap", get(get_heatmap))
}

/// GET /api/users/{user_id}/stats?as_of=YYYY-MM-DD&strict=bool - Totals and streaks.
///
/// Always recomputed from a fresh snapshot of the store.
async fn get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let as_of = resolve_as_of(query.as_of.as_deref())?;
    let entries = state.entries.list(user_id).await?;

    let policy = if query.strict {
        MalformedRecords::Reject
    } else {
        MalformedRecords::SkipAndWarn
    };
    let report = compute_stats_report(&entries, as_of, policy).map_err(|e| match e {
        CoreError::InvalidDate(_) => ApiError::Unprocessable(e.to_string()),
        other => other.into(),
    })?;

    if !report.skipped.is_empty() {
        tracing::warn!(
            user_id = %user_id,
            skipped = report.skipped.len(),
            "Stats computed without malformed entries"
        );
    }

    Ok(Json(StatsResponse {
        user_id: user_id.to_string(),
        as_of,
        report,
    }))
}

/// GET /api/users/{user_id}/heatmap?as_of=&days= - Pages per day over a trailing window.
async fn get_heatmap(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let as_of = resolve_as_of(query.as_of.as_deref())?;
    let entries = state.entries.list(user_id).await?;

    let cells = compute_heatmap(&entries, as_of, query.days.unwrap_or(DEFAULT_HEATMAP_DAYS));
    Ok(Json(HeatmapResponse {
        user_id: user_id.to_string(),
        as_of,
        days: cells.len(),
        cells,
    }))
}
