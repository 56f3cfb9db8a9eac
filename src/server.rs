use axum::{
    Extension, Router,
    routing::{get, post, put},
};
use std::{net::SocketAddr, str::FromStr};

use crate::{api, config, error, info};

/// Builds the proxy router with all relayed endpoints.
pub fn build_router(pending: api::PendingLogin) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/refresh_token", get(api::refresh_token))
        .route("/logout", get(api::logout))
        .route("/play", put(api::play))
        .route("/pause", put(api::pause))
        .route("/seek", put(api::seek))
        .route("/next", post(api::next))
        .route("/previous", post(api::previous))
        .route("/current_playing", get(api::current_playing))
        .route("/artist/{id}", get(api::artist))
        .route("/search-concerts", get(api::search_concerts))
        .layer(Extension(pending))
}

/// Binds the configured address and serves the proxy until torn down.
///
/// `pending` is shared with the `auth` command so it can pick up the token
/// pair once the callback has exchanged the code.
pub async fn start_api_server(pending: api::PendingLogin) {
    let app = build_router(pending);

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server terminated: {}", e);
    }
}
