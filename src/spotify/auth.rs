use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, header::AUTHORIZATION};
use serde_json::Value;

use crate::{config, types::TokenPair};

/// Failure of a token exchange against the accounts service.
///
/// `Rejected` means the upstream refused the authorization code or refresh
/// token (invalid, expired or revoked); the caller must discard any stored
/// tokens and restart the login flow. `Network` covers transport failures
/// and malformed responses.
#[derive(Debug)]
pub enum AuthError {
    Rejected(String),
    Network(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected(body) => write!(f, "token exchange rejected: {}", body),
            AuthError::Network(msg) => write!(f, "token exchange failed: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Exchanges a one-time authorization code for an access/refresh token pair.
///
/// Performs the authorization-code grant against the configured token URL
/// with the client credentials in the Basic authorization header. The code
/// is single-use and short-lived, so the exchange should happen immediately
/// after the OAuth callback delivers it.
///
/// # Errors
///
/// Returns [`AuthError::Rejected`] when the upstream refuses the code or the
/// credentials are misconfigured, and [`AuthError::Network`] on transport
/// failures.
pub async fn exchange_code(code: &str) -> Result<TokenPair, AuthError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .header(AUTHORIZATION, basic_authorization())
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config::spotify_redirect_uri()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::Network(e.to_string()))?;

    if !res.status().is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::Rejected(body));
    }

    let json: Value = res
        .json()
        .await
        .map_err(|e| AuthError::Network(e.to_string()))?;

    token_pair_from_json(&json, None)
}

/// Exchanges a refresh token for a fresh access token.
///
/// The upstream may omit the refresh token in its response; in that case the
/// previous refresh token is carried over into the returned pair.
///
/// # Errors
///
/// Returns [`AuthError::Rejected`] on an invalid or revoked refresh token,
/// in which case the caller must clear stored tokens and force a re-login.
pub async fn refresh_token(refresh_token: &str) -> Result<TokenPair, AuthError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .header(AUTHORIZATION, basic_authorization())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| AuthError::Network(e.to_string()))?;

    if !res.status().is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::Rejected(body));
    }

    let json: Value = res
        .json()
        .await
        .map_err(|e| AuthError::Network(e.to_string()))?;

    token_pair_from_json(&json, Some(refresh_token))
}

/// Builds the authorize URL users are redirected to for login.
pub fn authorize_url(scope: &str, state: &str) -> String {
    format!(
        "{auth_url}?response_type=code&client_id={client_id}&scope={scope}&redirect_uri={redirect_uri}&state={state}",
        auth_url = &config::spotify_apiauth_url(),
        client_id = &config::spotify_client_id(),
        scope = scope,
        redirect_uri = &config::spotify_redirect_uri(),
        state = state
    )
}

fn basic_authorization() -> String {
    let credentials = format!(
        "{}:{}",
        config::spotify_client_id(),
        config::spotify_client_secret()
    );
    format!("Basic {}", STANDARD.encode(credentials))
}

fn token_pair_from_json(json: &Value, previous_refresh: Option<&str>) -> Result<TokenPair, AuthError> {
    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| AuthError::Rejected("response carried no access_token".to_string()))?;

    let refresh_token = json["refresh_token"]
        .as_str()
        .or(previous_refresh)
        .unwrap_or_default();

    Ok(TokenPair {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
    })
}
