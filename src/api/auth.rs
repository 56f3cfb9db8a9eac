use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::Query,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{config, spotify, types::TokenPair, utils, warning};

use super::ApiError;

/// Login flow state shared between the login and callback handlers.
///
/// Holds the OAuth `state` value of the most recent login redirect and, once
/// the callback has exchanged the code, the resulting token pair so that a
/// local caller (the `auth` command) can pick it up.
#[derive(Debug, Default)]
pub struct LoginFlow {
    pub state: Option<String>,
    pub token: Option<TokenPair>,
}

pub type PendingLogin = Arc<Mutex<LoginFlow>>;

// axum's Redirect constructors cover 303/307/308; these endpoints answer 302
fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// GET /login - 302 to the provider authorize URL with the full scope.
pub async fn login(Extension(pending): Extension<PendingLogin>) -> Response {
    let state = utils::generate_state_param();
    let url = spotify::auth::authorize_url(&config::spotify_scope(), &state);
    pending.lock().await.state = Some(state);
    redirect_found(&url)
}

/// GET /logout - 302 straight back to the authorize URL with a reduced
/// scope; client-side storage is cleared by the frontend before calling this.
pub async fn logout(Extension(pending): Extension<PendingLogin>) -> Response {
    let state = utils::generate_state_param();
    let url = spotify::auth::authorize_url(
        "user-read-private user-read-email user-read-playback-state streaming",
        &state,
    );
    pending.lock().await.state = Some(state);
    redirect_found(&url)
}

/// GET /callback - exchanges the authorization code and 302s to the frontend
/// with the token pair in the URL fragment.
///
/// The `state` value must match the one issued by the login redirect;
/// mismatches are rejected before the code is exchanged.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(pending): Extension<PendingLogin>,
) -> Result<Response, ApiError> {
    let Some(code) = params.get("code") else {
        return Err(ApiError::Validation(
            "missing authorization code".to_string(),
        ));
    };

    let expected = pending.lock().await.state.take();
    if expected.is_none() || expected.as_deref() != params.get("state").map(|s| s.as_str()) {
        return Err(ApiError::Validation("state mismatch".to_string()));
    }

    match spotify::auth::exchange_code(code).await {
        Ok(pair) => {
            pending.lock().await.token = Some(pair.clone());
            Ok(redirect_found(&utils::build_token_fragment(
                &config::frontend_url(),
                &pair.access_token,
                &pair.refresh_token,
            )))
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Err(ApiError::Upstream("Error exchanging code".to_string()))
        }
    }
}

/// GET /refresh_token?refresh_token= - exchanges a refresh token for a new
/// access token. Responds `{"access_token": ...}`.
pub async fn refresh_token(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let Some(refresh_token) = params.get("refresh_token") else {
        return Err(ApiError::Validation(
            "refresh_token is required".to_string(),
        ));
    };

    match spotify::auth::refresh_token(refresh_token).await {
        Ok(pair) => Ok(Json(json!({ "access_token": pair.access_token }))),
        Err(_) => Err(ApiError::Upstream("Error refreshing token".to_string())),
    }
}
