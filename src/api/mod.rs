//! # API Module
//!
//! HTTP endpoints exposed by the local proxy server. Everything here relays
//! to the Spotify Web API or the SeatGeek events API; the proxy holds the
//! client credentials so the frontend never sees them.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] / [`logout`] - redirect to the provider authorize URL
//! - [`callback`] - exchanges the authorization code and redirects to the
//!   frontend with the token pair in the URL fragment
//! - [`refresh_token`] - exchanges a refresh token for a new access token
//!
//! ### Playback
//!
//! - [`play`] / [`pause`] / [`seek`] / [`next`] / [`previous`] - relay
//!   playback commands with the caller-supplied bearer token
//! - [`current_playing`] - currently-playing snapshot, 204 when nothing is
//!   playing
//! - [`artist`] - artist metadata passthrough (image lookup)
//!
//! ### Events
//!
//! - [`search_concerts`] - concert search by artist name; rejects a missing
//!   artist with 400 before any upstream call
//!
//! ### Monitoring
//!
//! - [`health`] - status and version for monitoring
//!
//! ## Error Mapping
//!
//! Handlers return [`ApiError`]: `Validation` maps to 400 with a plain-text
//! message, everything else (upstream non-2xx, transport failures, rejected
//! token exchanges) maps to 500. Upstream trouble is surfaced as a generic
//! failure; the frontend only distinguishes "my fault" from "try again".

mod auth;
mod concerts;
mod health;
mod player;

pub use auth::{LoginFlow, PendingLogin, callback, login, logout, refresh_token};
pub use concerts::search_concerts;
pub use health::health;
pub use player::{artist, current_playing, next, pause, play, previous, seek};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::types::UpstreamError;

/// Handler failure, mapped onto the proxy's two failure statuses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed caller input; rejected before any upstream call.
    Validation(String),
    /// Upstream or transport failure, surfaced as a generic 500.
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}
