use std::{fmt, path::PathBuf};

use tokio::sync::Mutex;

use crate::{
    spotify::{self, auth::AuthError},
    types::{TokenPair, UpstreamError},
};

/// Exchanges a refresh token for a fresh token pair.
///
/// Seam between the session token manager and the accounts service so the
/// refresh path can be exercised without network access.
#[allow(async_fn_in_trait)]
pub trait TokenExchanger {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}

/// Production exchanger backed by the Spotify accounts service.
pub struct SpotifyExchanger;

impl TokenExchanger for SpotifyExchanger {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        spotify::auth::refresh_token(refresh_token).await
    }
}

/// Terminal and transient failures of session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Stored tokens are gone or unusable; the login flow must be restarted.
    /// Terminal for the session, never retried.
    Reauthenticate,
    /// A gateway call failed for a non-auth reason; the operation is reported
    /// as failed and not retried.
    Upstream(UpstreamError),
    /// Token persistence failed.
    Storage(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Reauthenticate => write!(f, "session requires re-authentication"),
            SessionError::Upstream(err) => write!(f, "{}", err),
            SessionError::Storage(msg) => write!(f, "token storage failure: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<UpstreamError> for SessionError {
    fn from(err: UpstreamError) -> Self {
        SessionError::Upstream(err)
    }
}

struct TokenState {
    pair: Option<TokenPair>,
    generation: u64,
}

/// Session-scoped owner of the access/refresh token pair.
///
/// This is the explicit session context: initialized from the login callback
/// or the persisted token file, torn down on logout or irrecoverable refresh
/// failure. Expiry is never tracked proactively; callers discover it through
/// a 401 and route into [`SessionTokens::refresh`].
///
/// Refreshes are single-flight: a `tokio::sync::Mutex` gate admits one
/// in-flight exchange, and followers that were blocked on the gate re-check
/// the token generation and reuse the fresh pair instead of refreshing
/// again.
pub struct SessionTokens<X> {
    exchanger: X,
    store: Option<PathBuf>,
    state: Mutex<TokenState>,
    refresh_gate: Mutex<()>,
}

impl<X: TokenExchanger> SessionTokens<X> {
    /// Creates an in-memory token context. Nothing is persisted until a
    /// store path is attached with [`SessionTokens::with_store`].
    pub fn new(exchanger: X, pair: Option<TokenPair>) -> Self {
        SessionTokens {
            exchanger,
            store: None,
            state: Mutex::new(TokenState {
                pair,
                generation: 0,
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Attaches a file path for durable token storage.
    pub fn with_store(mut self, path: PathBuf) -> Self {
        self.store = Some(path);
        self
    }

    /// Default token file location under the platform data directory.
    pub fn default_store_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("onstage/session/token.json");
        path
    }

    /// Loads a persisted token pair from the default store path.
    ///
    /// A missing or unreadable file yields a context without tokens, which
    /// keeps the poller in its idle state until a login provides one.
    pub async fn load(exchanger: X) -> Self {
        let path = Self::default_store_path();
        let pair = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<TokenPair>(&content).ok(),
            Err(_) => None,
        };
        Self::new(exchanger, pair).with_store(path)
    }

    /// Returns the stored access token and its generation counter.
    ///
    /// No expiry check happens here; the generation is handed back to
    /// [`SessionTokens::refresh`] when a 401 is later observed so concurrent
    /// callers can share one refresh.
    pub async fn access_token(&self) -> Option<(String, u64)> {
        let state = self.state.lock().await;
        state
            .pair
            .as_ref()
            .map(|pair| (pair.access_token.clone(), state.generation))
    }

    /// Installs a token pair obtained from the login callback and persists it.
    pub async fn install(&self, pair: TokenPair) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock().await;
            state.pair = Some(pair.clone());
            state.generation += 1;
        }
        self.persist(&pair).await
    }

    /// Clears stored tokens in memory and on disk. Session teardown.
    pub async fn clear(&self) {
        {
            let mut state = self.state.lock().await;
            state.pair = None;
            state.generation += 1;
        }
        if let Some(path) = &self.store {
            // a missing file is already the desired state
            let _ = async_fs::remove_file(path).await;
        }
    }

    /// Exchanges the refresh token for a fresh access token.
    ///
    /// `observed_generation` is the generation the caller saw when its call
    /// hit the 401. If another caller already completed a refresh while this
    /// one waited on the gate, the fresh token is returned without a second
    /// exchange.
    ///
    /// On a rejected refresh token the stored pair is cleared and
    /// [`SessionError::Reauthenticate`] is returned; this is terminal for
    /// the session.
    pub async fn refresh(&self, observed_generation: u64) -> Result<String, SessionError> {
        let _gate = self.refresh_gate.lock().await;

        let refresh_token = {
            let state = self.state.lock().await;
            if state.generation > observed_generation {
                // someone refreshed (or cleared) while we waited
                return match &state.pair {
                    Some(pair) => Ok(pair.access_token.clone()),
                    None => Err(SessionError::Reauthenticate),
                };
            }
            match &state.pair {
                Some(pair) => pair.refresh_token.clone(),
                None => return Err(SessionError::Reauthenticate),
            }
        };

        match self.exchanger.refresh(&refresh_token).await {
            Ok(pair) => {
                {
                    let mut state = self.state.lock().await;
                    state.pair = Some(pair.clone());
                    state.generation += 1;
                }
                let _ = self.persist(&pair).await;
                Ok(pair.access_token)
            }
            Err(AuthError::Rejected(_)) => {
                self.clear().await;
                Err(SessionError::Reauthenticate)
            }
            Err(AuthError::Network(msg)) => {
                Err(SessionError::Upstream(UpstreamError::Network(msg)))
            }
        }
    }

    async fn persist(&self, pair: &TokenPair) -> Result<(), SessionError> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(pair).map_err(|e| SessionError::Storage(e.to_string()))?;
        async_fs::write(path, json)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }
}

/// Runs one gateway call with the reactive 401 handling contract.
///
/// `op` is invoked with the current access token. On a 401 the token is
/// refreshed (single-flight) and the call retried exactly once; a 401 on the
/// retry clears stored tokens and signals re-authentication. Any other error
/// fails the operation without retry.
pub async fn call_with_refresh<X, T, F, Fut>(
    tokens: &SessionTokens<X>,
    op: F,
) -> Result<T, SessionError>
where
    X: TokenExchanger,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let Some((token, generation)) = tokens.access_token().await else {
        return Err(SessionError::Reauthenticate);
    };

    match op(token).await {
        Ok(value) => Ok(value),
        Err(UpstreamError::Auth) => {
            let fresh = tokens.refresh(generation).await?;
            match op(fresh).await {
                Ok(value) => Ok(value),
                Err(UpstreamError::Auth) => {
                    tokens.clear().await;
                    Err(SessionError::Reauthenticate)
                }
                Err(err) => Err(SessionError::Upstream(err)),
            }
        }
        Err(err) => Err(SessionError::Upstream(err)),
    }
}
