use axum::{extract::Query, routing::get, Json, Router};

use hifz_core::{
    compass_heading_from_alpha, compute_qibla_bearing, compute_relative_heading,
    normalize_degrees, GeoPoint, KAABA,
};

use crate::error::ApiError;
use crate::models::{QiblaQuery, QiblaResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/qibla", get(get_qibla))
}

/// GET /api/qibla?lat=&lon=&heading=&alpha= - Bearing to the Kaaba, plus the
/// indicator rotation when a device heading is supplied.
async fn get_qibla(Query(query): Query<QiblaQuery>) -> Result<Json<QiblaResponse>, ApiError> {
    // Without a location there is no direction to report; never guess one.
    let (Some(lat), Some(lon)) = (query.lat, query.lon) else {
        return Err(ApiError::Unprocessable(
            "Qibla direction unavailable: location is required".to_string(),
        ));
    };

    let observer = GeoPoint::new(lat, lon)?;
    let bearing = compute_qibla_bearing(observer)?.degrees();

    let device_heading = match (query.heading, query.alpha) {
        (Some(h), _) if !h.is_finite() => {
            return Err(ApiError::BadRequest("Invalid heading".to_string()))
        }
        (Some(h), _) => Some(normalize_degrees(h)),
        (None, Some(a)) if !a.is_finite() => {
            return Err(ApiError::BadRequest("Invalid alpha".to_string()))
        }
        (None, Some(a)) => Some(compass_heading_from_alpha(a)),
        (None, None) => None,
    };
    let relative_heading = device_heading.map(|h| compute_relative_heading(bearing, h));

    Ok(Json(QiblaResponse {
        observer,
        target: KAABA,
        bearing,
        device_heading,
        relative_heading,
    }))
}
