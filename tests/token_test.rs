use std::{
    collections::VecDeque,
    ops::Deref,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use onstage::session::{SessionError, SessionTokens, TokenExchanger, call_with_refresh};
use onstage::spotify::auth::AuthError;
use onstage::types::{TokenPair, UpstreamError};

// Helper function to create a token pair
fn pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    }
}

// Scripted exchanger: pops one result per refresh, counts calls, optionally
// sleeps to widen the single-flight window.
struct FakeExchanger {
    results: Mutex<VecDeque<Result<TokenPair, AuthError>>>,
    calls: AtomicUsize,
    delay: Duration,
}

fn exchanger(results: Vec<Result<TokenPair, AuthError>>, delay_ms: u64) -> Arc<FakeExchanger> {
    Arc::new(FakeExchanger {
        results: Mutex::new(results.into()),
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(delay_ms),
    })
}

impl FakeExchanger {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

// Local newtype around the shared fake so the foreign `TokenExchanger`
// trait can be implemented without tripping the orphan rule on `Arc`.
struct SharedExchanger(Arc<FakeExchanger>);

impl Deref for SharedExchanger {
    type Target = FakeExchanger;

    fn deref(&self) -> &FakeExchanger {
        &self.0
    }
}

impl TokenExchanger for SharedExchanger {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(pair("fresh", "fresh-refresh")))
    }
}

#[tokio::test]
async fn test_401_refresh_then_exactly_one_retry() {
    let ex = exchanger(vec![Ok(pair("new", "r2"))], 0);
    let tokens = SessionTokens::new(SharedExchanger(Arc::clone(&ex)), Some(pair("old", "r1")));

    let op_calls = AtomicUsize::new(0);
    let result = call_with_refresh(&tokens, |token| {
        op_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if token == "old" {
                Err(UpstreamError::Auth)
            } else {
                Ok(token)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), "new");
    assert_eq!(op_calls.load(Ordering::SeqCst), 2);
    assert_eq!(ex.calls(), 1);

    // the refreshed pair is now the stored one
    let (access, _) = tokens.access_token().await.unwrap();
    assert_eq!(access, "new");
}

#[tokio::test]
async fn test_second_401_clears_tokens_and_signals_relogin() {
    let ex = exchanger(vec![Ok(pair("new", "r2"))], 0);
    let tokens = SessionTokens::new(SharedExchanger(Arc::clone(&ex)), Some(pair("old", "r1")));

    let op_calls = AtomicUsize::new(0);
    let result = call_with_refresh(&tokens, |_token| {
        op_calls.fetch_add(1, Ordering::SeqCst);
        async move { Err::<(), _>(UpstreamError::Auth) }
    })
    .await;

    assert!(matches!(result, Err(SessionError::Reauthenticate)));
    // exactly one retry, never more
    assert_eq!(op_calls.load(Ordering::SeqCst), 2);
    assert_eq!(ex.calls(), 1);
    assert!(tokens.access_token().await.is_none());
}

#[tokio::test]
async fn test_rejected_refresh_clears_tokens() {
    let ex = exchanger(vec![Err(AuthError::Rejected("revoked".to_string()))], 0);
    let tokens = SessionTokens::new(SharedExchanger(Arc::clone(&ex)), Some(pair("old", "r1")));

    let op_calls = AtomicUsize::new(0);
    let result = call_with_refresh(&tokens, |token| {
        op_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if token == "old" {
                Err(UpstreamError::Auth)
            } else {
                Ok(())
            }
        }
    })
    .await;

    assert!(matches!(result, Err(SessionError::Reauthenticate)));
    // no retry happens when the refresh itself is rejected
    assert_eq!(op_calls.load(Ordering::SeqCst), 1);
    assert!(tokens.access_token().await.is_none());
}

#[tokio::test]
async fn test_network_refresh_failure_keeps_tokens() {
    let ex = exchanger(vec![Err(AuthError::Network("offline".to_string()))], 0);
    let tokens = SessionTokens::new(SharedExchanger(Arc::clone(&ex)), Some(pair("old", "r1")));
    let (_, generation) = tokens.access_token().await.unwrap();

    let result = tokens.refresh(generation).await;

    assert!(matches!(result, Err(SessionError::Upstream(_))));
    // a transient failure is not an irrecoverable one; keep the pair
    let (access, _) = tokens.access_token().await.unwrap();
    assert_eq!(access, "old");
}

#[tokio::test]
async fn test_concurrent_refreshes_are_single_flight() {
    let ex = exchanger(vec![Ok(pair("new", "r2")), Ok(pair("newer", "r3"))], 50);
    let tokens = SessionTokens::new(SharedExchanger(Arc::clone(&ex)), Some(pair("old", "r1")));
    let (_, generation) = tokens.access_token().await.unwrap();

    // both observed the same stale generation, as two racing 401s would
    let (a, b) = tokio::join!(tokens.refresh(generation), tokens.refresh(generation));

    assert_eq!(a.unwrap(), "new");
    assert_eq!(b.unwrap(), "new");
    assert_eq!(ex.calls(), 1);
}

#[tokio::test]
async fn test_no_stored_tokens_signals_relogin_without_calls() {
    let ex = exchanger(vec![], 0);
    let tokens: SessionTokens<SharedExchanger> =
        SessionTokens::new(SharedExchanger(Arc::clone(&ex)), None);

    let op_calls = AtomicUsize::new(0);
    let result = call_with_refresh(&tokens, |_token| {
        op_calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(()) }
    })
    .await;

    assert!(matches!(result, Err(SessionError::Reauthenticate)));
    assert_eq!(op_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ex.calls(), 0);
}

#[tokio::test]
async fn test_install_replaces_stored_pair() {
    let ex = exchanger(vec![], 0);
    let tokens = SessionTokens::new(SharedExchanger(Arc::clone(&ex)), Some(pair("old", "r1")));

    tokens.install(pair("from-login", "r2")).await.unwrap();

    let (access, _) = tokens.access_token().await.unwrap();
    assert_eq!(access, "from-login");
}
