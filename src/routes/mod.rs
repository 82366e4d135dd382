pub mod entries;
pub mod health;
pub mod qibla;
pub mod stats;
pub mod students;

use axum::Router;
use chrono::NaiveDate;
use uuid::Uuid;

use hifz_core::parse_entry_date;

use crate::error::ApiError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(entries::routes())
        .merge(stats::routes())
        .merge(students::routes())
        .merge(qibla::routes())
        .with_state(state)
}

/// Parse an id taken from the path.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} id", what)))
}

/// The `as_of` query parameter, falling back to the server's local calendar date.
pub(crate) fn resolve_as_of(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    match raw {
        Some(s) => Ok(parse_entry_date(s)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
