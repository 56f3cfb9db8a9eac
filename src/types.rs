use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// Failure of a single upstream call through the gateway.
///
/// A 401 is split out as `Auth` because it drives the refresh-then-retry
/// path; every other non-2xx is surfaced with its status and body, and
/// transport failures are reported the same way to callers (no distinction
/// in handling, no retry at this layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    Auth,
    Status(u16, String),
    Network(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Auth => write!(f, "upstream rejected the access token (401)"),
            UpstreamError::Status(status, body) => {
                write!(f, "upstream returned status {}: {}", status, body)
            }
            UpstreamError::Network(msg) => write!(f, "network failure: {}", msg),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 => UpstreamError::Auth,
            Some(status) => UpstreamError::Status(status.as_u16(), err.to_string()),
            None => UpstreamError::Network(err.to_string()),
        }
    }
}

/// Playback command issued through the gateway.
///
/// `Seek` carries the target position verbatim; no local range validation is
/// performed before the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Seek(u64),
    Next,
    Previous,
}

/// Access/refresh token pair owned by the session token manager.
///
/// No expiry timestamp is stored; token expiry is discovered reactively when
/// an upstream call answers 401, at which point a refresh is attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Point-in-time read of what is currently playing.
///
/// Transient: reconstructed on every poll, never persisted. `progress_ms`
/// may momentarily exceed `duration_ms` as reported upstream; it is only
/// clamped at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub track_id: String,
    pub track_name: String,
    pub is_playing: bool,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub artist_id: String,
    pub artist_name: String,
    pub album_image: Option<String>,
}

impl PlaybackSnapshot {
    /// Builds a snapshot from the currently-playing response body.
    ///
    /// Returns `None` when no item is present (nothing playing, private
    /// session, podcast without track metadata).
    pub fn from_player_json(json: &Value) -> Option<Self> {
        let item = json.get("item")?;
        if item.is_null() {
            return None;
        }

        let artist = item["artists"].get(0)?;

        Some(PlaybackSnapshot {
            track_id: item["id"].as_str()?.to_string(),
            track_name: item["name"].as_str().unwrap_or_default().to_string(),
            is_playing: json["is_playing"].as_bool().unwrap_or(false),
            progress_ms: json["progress_ms"].as_u64().unwrap_or(0),
            duration_ms: item["duration_ms"].as_u64().unwrap_or(0),
            artist_id: artist["id"].as_str().unwrap_or_default().to_string(),
            artist_name: artist["name"].as_str().unwrap_or_default().to_string(),
            album_image: item["album"]["images"]
                .get(0)
                .and_then(|img| img["url"].as_str())
                .map(|s| s.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<ArtistImage>,
}

impl ArtistProfile {
    /// The largest artist image, which Spotify lists first.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<ConcertEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcertEvent {
    pub title: String,
    pub url: String,
    pub datetime_local: String,
    pub venue: Venue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Tabled)]
pub struct ConcertTableRow {
    pub date: String,
    pub title: String,
    pub venue: String,
}
