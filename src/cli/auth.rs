use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::{
    api::{LoginFlow, PendingLogin},
    config, error, server,
    session::{SessionTokens, SpotifyExchanger},
    success,
    types::TokenPair,
    warning,
};

/// Runs the login flow from the terminal.
///
/// Starts the proxy server in the background, opens the authorize URL in the
/// default browser and waits for the callback handler to exchange the code.
/// The resulting token pair is persisted to the local data directory where
/// `watch` and the one-shot commands pick it up.
pub async fn auth() {
    let pending: PendingLogin = Arc::new(Mutex::new(LoginFlow::default()));

    // start the proxy so /login and /callback are reachable
    let server_state = Arc::clone(&pending);
    tokio::spawn(async move {
        server::start_api_server(server_state).await;
    });

    let login_url = format!("http://{}/login", config::server_addr());
    if webbrowser::open(&login_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            login_url
        )
    }

    match wait_for_token(pending).await {
        Some(pair) => {
            let tokens = SessionTokens::new(SpotifyExchanger, None)
                .with_store(SessionTokens::<SpotifyExchanger>::default_store_path());
            if let Err(e) = tokens.install(pair).await {
                error!("Failed to save token: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Polls the shared login state for a completed token exchange, with a
/// 60-second timeout and a 1-second poll interval.
async fn wait_for_token(pending: PendingLogin) -> Option<TokenPair> {
    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = pending.lock().await;
            if let Some(pair) = &lock.token {
                return Some(pair.clone());
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
