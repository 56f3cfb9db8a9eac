use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::{
    config,
    types::{PlayerCommand, UpstreamError},
};

/// Outcome of a successful raw Web API request.
///
/// A 204 from the player endpoints is a valid result (nothing currently
/// playing, or a command acknowledged without a body) and is kept distinct
/// from transport failures.
#[derive(Debug)]
pub enum ApiResponse {
    Json(Value),
    NoContent,
}

/// Issues one bearer-authenticated request against the Spotify Web API.
///
/// Adds the bearer header, sends the optional JSON body and surfaces the
/// HTTP status and upstream error body on non-2xx responses. Does not retry,
/// rate-limit or back off; a 401 maps to [`UpstreamError::Auth`] so callers
/// can route it into the token refresh path.
pub async fn api_request(
    method: Method,
    path: &str,
    token: &str,
    body: Option<Value>,
) -> Result<ApiResponse, UpstreamError> {
    let url = format!("{}{}", config::spotify_apiurl(), path);

    let client = Client::new();
    let mut request = client.request(method, &url).bearer_auth(token);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| UpstreamError::Network(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(UpstreamError::Auth);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status(status.as_u16(), body));
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::NoContent);
    }

    let json: Value = response
        .json()
        .await
        .map_err(|e| UpstreamError::Network(e.to_string()))?;
    Ok(ApiResponse::Json(json))
}

/// Fetches the currently-playing object.
///
/// Returns `Ok(None)` on a 204 (nothing playing), the raw JSON body
/// otherwise.
pub async fn currently_playing(token: &str) -> Result<Option<Value>, UpstreamError> {
    match api_request(Method::GET, "/me/player/currently-playing", token, None).await? {
        ApiResponse::Json(json) => Ok(Some(json)),
        ApiResponse::NoContent => Ok(None),
    }
}

/// Fetches artist metadata (name, images) by artist ID.
pub async fn artist(token: &str, artist_id: &str) -> Result<Value, UpstreamError> {
    let path = format!("/artists/{}", artist_id);
    match api_request(Method::GET, &path, token, None).await? {
        ApiResponse::Json(json) => Ok(json),
        ApiResponse::NoContent => Err(UpstreamError::Network(
            "artist endpoint returned no content".to_string(),
        )),
    }
}

/// Issues one playback command against the player.
///
/// The seek position is passed through verbatim; range checking is left to
/// the upstream.
pub async fn player_command(token: &str, command: PlayerCommand) -> Result<(), UpstreamError> {
    let (method, path) = match command {
        PlayerCommand::Play => (Method::PUT, "/me/player/play".to_string()),
        PlayerCommand::Pause => (Method::PUT, "/me/player/pause".to_string()),
        PlayerCommand::Seek(position_ms) => (
            Method::PUT,
            format!("/me/player/seek?position_ms={}", position_ms),
        ),
        PlayerCommand::Next => (Method::POST, "/me/player/next".to_string()),
        PlayerCommand::Previous => (Method::POST, "/me/player/previous".to_string()),
    };

    api_request(method, &path, token, None).await.map(|_| ())
}
