//! Configuration management for onstage.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Credentials for both upstream
//! providers (Spotify and SeatGeek), the proxy server address and the
//! frontend redirect target are all resolved here so that the rest of the
//! code never reads the environment directly.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `onstage/.env`. This allows users to store
/// credentials without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/onstage/.env`
/// - macOS: `~/Library/Application Support/onstage/.env`
/// - Windows: `%LOCALAPPDATA%/onstage/.env`
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the `.env`
/// file cannot be read or parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("onstage/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the address the local proxy server binds to.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the frontend base URL used as the redirect target after the OAuth
/// callback. Tokens are appended to this URL in the fragment.
///
/// # Panics
///
/// Panics if the `FRONTEND_URL` environment variable is not set.
pub fn frontend_url() -> String {
    env::var("FRONTEND_URL").expect("FRONTEND_URL must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// The secret is sent in the Basic authorization header during token
/// exchanges and should never appear in logs.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable is not set.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").expect("SPOTIFY_API_AUTH_CLIENT_SECRET must be set")
}

/// Returns the Spotify OAuth redirect URI.
///
/// Must match the redirect URI registered in the Spotify application
/// settings, typically `http://<server_addr>/callback`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the Spotify API scope permissions requested during login.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_SCOPE` environment variable is not set.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").expect("SPOTIFY_API_AUTH_SCOPE must be set")
}

/// Returns the Spotify OAuth authorization URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_URL` environment variable is not set.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL").expect("SPOTIFY_API_AUTH_URL must be set")
}

/// Returns the Spotify Web API base URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_URL` environment variable is not set.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").expect("SPOTIFY_API_URL must be set")
}

/// Returns the Spotify OAuth token exchange URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_TOKEN_URL` environment variable is not set.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").expect("SPOTIFY_API_TOKEN_URL must be set")
}

/// Returns the SeatGeek API base URL.
///
/// # Panics
///
/// Panics if the `SEATGEEK_API_URL` environment variable is not set.
pub fn seatgeek_apiurl() -> String {
    env::var("SEATGEEK_API_URL").expect("SEATGEEK_API_URL must be set")
}

/// Returns the SeatGeek client ID.
///
/// # Panics
///
/// Panics if the `SEATGEEK_CLIENT_ID` environment variable is not set.
pub fn seatgeek_client_id() -> String {
    env::var("SEATGEEK_CLIENT_ID").expect("SEATGEEK_CLIENT_ID must be set")
}

/// Returns the SeatGeek client secret.
///
/// # Panics
///
/// Panics if the `SEATGEEK_CLIENT_SECRET` environment variable is not set.
pub fn seatgeek_client_secret() -> String {
    env::var("SEATGEEK_CLIENT_SECRET").expect("SEATGEEK_CLIENT_SECRET must be set")
}
