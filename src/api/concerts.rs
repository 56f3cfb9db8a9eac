use std::collections::HashMap;

use axum::{extract::Query, response::Json};
use serde_json::Value;

use crate::seatgeek;

use super::ApiError;

/// GET /search-concerts?artist=
///
/// Rejects a missing or empty artist name with 400 before any upstream call;
/// otherwise relays the SeatGeek events body verbatim.
pub async fn search_concerts(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let artist = params.get("artist").map(|a| a.trim()).unwrap_or_default();
    if artist.is_empty() {
        return Err(ApiError::Validation("Artist name is required".to_string()));
    }

    let body = seatgeek::search_events(artist)
        .await
        .map_err(|_| ApiError::Upstream("Error searching for concerts".to_string()))?;
    Ok(Json(body))
}
