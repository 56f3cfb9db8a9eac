use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{spotify, types::PlayerCommand};

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SeekBody {
    pub token: String,
    pub position_ms: u64,
}

/// PUT /play
pub async fn play(Json(body): Json<TokenBody>) -> Result<&'static str, ApiError> {
    spotify::player::player_command(&body.token, PlayerCommand::Play).await?;
    Ok("Playback started")
}

/// PUT /pause
pub async fn pause(Json(body): Json<TokenBody>) -> Result<&'static str, ApiError> {
    spotify::player::player_command(&body.token, PlayerCommand::Pause).await?;
    Ok("Playback paused")
}

/// PUT /seek
///
/// The position is relayed unvalidated; out-of-range values are the
/// upstream's problem.
pub async fn seek(Json(body): Json<SeekBody>) -> Result<&'static str, ApiError> {
    spotify::player::player_command(&body.token, PlayerCommand::Seek(body.position_ms)).await?;
    Ok("Seek successful")
}

/// POST /next
pub async fn next(Json(body): Json<TokenBody>) -> Result<&'static str, ApiError> {
    spotify::player::player_command(&body.token, PlayerCommand::Next).await?;
    Ok("Skipped to next track")
}

/// POST /previous
pub async fn previous(Json(body): Json<TokenBody>) -> Result<&'static str, ApiError> {
    spotify::player::player_command(&body.token, PlayerCommand::Previous).await?;
    Ok("Skipped to previous track")
}

/// GET /current_playing?token=
///
/// 200 with the upstream snapshot while something is playing, 204 when the
/// player is idle or paused (the frontend keeps its last snapshot on 204),
/// 500 on upstream failure.
pub async fn current_playing(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let Some(token) = params.get("token") else {
        return Err(ApiError::Validation("token is required".to_string()));
    };

    match spotify::player::currently_playing(token).await? {
        Some(body) if body["is_playing"].as_bool().unwrap_or(false) => {
            Ok(Json(body).into_response())
        }
        _ => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// GET /artist/{id}?token= - artist metadata passthrough for the image
/// lookup.
pub async fn artist(
    Path(artist_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let Some(token) = params.get("token") else {
        return Err(ApiError::Validation("token is required".to_string()));
    };

    let body = spotify::player::artist(token, &artist_id).await?;
    Ok(Json(body))
}
