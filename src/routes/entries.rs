use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use crate::error::ApiError;
use crate::models::{
    DeleteEntryResponse, ListEntriesResponse, UpsertEntryRequest, UpsertEntryResponse,
};
use crate::routes::parse_id;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/{user_id}/entries",
            get(list_entries).put(upsert_entry),
        )
        .route("/api/entries/{id}", delete(delete_entry))
}

/// GET /api/users/{user_id}/entries - All entries of a user, most recent first.
async fn list_entries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ListEntriesResponse>, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let mut entries = state.entries.list(user_id).await?;
    // Stores promise no order; canonical dates sort lexically.
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Json(ListEntriesResponse {
        user_id: user_id.to_string(),
        entries,
    }))
}

/// PUT /api/users/{user_id}/entries - Record the entry for a day, overwriting any previous one.
async fn upsert_entry(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<UpsertEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let draft = req.into_draft()?;

    let outcome = state.entries.upsert(user_id, draft).await?;
    tracing::info!(
        user_id = %user_id,
        date = %outcome.entry.date,
        created = outcome.created,
        "Saved memorization entry"
    );

    let (status, label) = if outcome.created {
        (StatusCode::CREATED, "created")
    } else {
        (StatusCode::OK, "updated")
    };
    Ok((
        status,
        Json(UpsertEntryResponse {
            status: label,
            entry: outcome.entry,
        }),
    ))
}

/// DELETE /api/entries/{id} - Delete an entry.
async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteEntryResponse>, ApiError> {
    let id = parse_id(&id, "entry")?;

    if !state.entries.delete(id).await? {
        return Err(ApiError::NotFound("Entry not found".to_string()));
    }
    tracing::info!(entry_id = %id, "Deleted memorization entry");

    Ok(Json(DeleteEntryResponse {
        id: id.to_string(),
        deleted: true,
    }))
}
