use std::{
    collections::VecDeque,
    ops::Deref,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use onstage::session::{
    ArtistImageCache, Clock, PollEvent, PollerState, Session, SessionError, SessionTokens,
    TokenExchanger, UpstreamGateway,
};
use onstage::spotify::auth::AuthError;
use onstage::types::{
    ArtistImage, ArtistProfile, ConcertEvent, PlaybackSnapshot, PlayerCommand, TokenPair,
    UpstreamError, Venue,
};

// Helper function to create a playback snapshot; artist identity is derived
// from the track id so tests can assert on lookups.
fn snapshot(track_id: &str, progress_ms: u64, is_playing: bool) -> PlaybackSnapshot {
    PlaybackSnapshot {
        track_id: track_id.to_string(),
        track_name: format!("Track {}", track_id),
        is_playing,
        progress_ms,
        duration_ms: 200_000,
        artist_id: format!("{}-artist", track_id),
        artist_name: format!("Artist {}", track_id),
        album_image: None,
    }
}

fn concert(title: &str) -> ConcertEvent {
    ConcertEvent {
        title: title.to_string(),
        url: "https://seatgeek.example/e/1".to_string(),
        datetime_local: "2026-09-12T19:30:00".to_string(),
        venue: Venue {
            name: "The Fillmore".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
        },
    }
}

#[derive(Default)]
struct FakeGateway {
    snapshots: Mutex<VecDeque<Result<Option<PlaybackSnapshot>, UpstreamError>>>,
    command_results: Mutex<VecDeque<Result<(), UpstreamError>>>,
    concert_results: Mutex<VecDeque<Vec<ConcertEvent>>>,
    playing_calls: AtomicUsize,
    artist_calls: Mutex<Vec<String>>,
    concert_calls: Mutex<Vec<String>>,
    commands: Mutex<Vec<PlayerCommand>>,
}

impl FakeGateway {
    fn with_snapshots(script: Vec<Result<Option<PlaybackSnapshot>, UpstreamError>>) -> Arc<Self> {
        Arc::new(FakeGateway {
            snapshots: Mutex::new(script.into()),
            ..FakeGateway::default()
        })
    }

    fn playing_calls(&self) -> usize {
        self.playing_calls.load(Ordering::SeqCst)
    }

    fn artist_calls(&self) -> Vec<String> {
        self.artist_calls.lock().unwrap().clone()
    }

    fn concert_calls(&self) -> Vec<String> {
        self.concert_calls.lock().unwrap().clone()
    }

    fn commands(&self) -> Vec<PlayerCommand> {
        self.commands.lock().unwrap().clone()
    }
}

// Local newtype around the shared fake so the foreign `UpstreamGateway`
// trait can be implemented without tripping the orphan rule on `Arc`.
struct SharedGateway(Arc<FakeGateway>);

impl Deref for SharedGateway {
    type Target = FakeGateway;

    fn deref(&self) -> &FakeGateway {
        &self.0
    }
}

impl UpstreamGateway for SharedGateway {
    async fn currently_playing(
        &self,
        _token: &str,
    ) -> Result<Option<PlaybackSnapshot>, UpstreamError> {
        self.playing_calls.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn artist(&self, _token: &str, artist_id: &str) -> Result<ArtistProfile, UpstreamError> {
        self.artist_calls.lock().unwrap().push(artist_id.to_string());
        Ok(ArtistProfile {
            id: artist_id.to_string(),
            name: artist_id.to_string(),
            images: vec![ArtistImage {
                url: format!("https://img.example/{}", artist_id),
            }],
        })
    }

    async fn player_command(
        &self,
        _token: &str,
        command: PlayerCommand,
    ) -> Result<(), UpstreamError> {
        self.commands.lock().unwrap().push(command);
        self.command_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn concerts(&self, artist_name: &str) -> Result<Vec<ConcertEvent>, UpstreamError> {
        self.concert_calls
            .lock()
            .unwrap()
            .push(artist_name.to_string());
        Ok(self
            .concert_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

// Exchanger that always hands out a fresh pair; refresh behavior itself is
// covered in token_test.rs.
#[derive(Default)]
struct FakeExchanger {
    calls: AtomicUsize,
}

// Same orphan-rule workaround for the exchanger fake.
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
        Ok(TokenPair {
            access_token: "fresh".to_string(),
            refresh_token: "fresh-refresh".to_string(),
        })
    }
}

#[derive(Clone, Default)]
struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn tokens_with(access: &str) -> SessionTokens<SharedExchanger> {
    SessionTokens::new(
        SharedExchanger(Arc::new(FakeExchanger::default())),
        Some(TokenPair {
            access_token: access.to_string(),
            refresh_token: "r1".to_string(),
        }),
    )
}

fn no_tokens() -> SessionTokens<SharedExchanger> {
    SessionTokens::new(SharedExchanger(Arc::new(FakeExchanger::default())), None)
}

#[tokio::test]
async fn test_track_change_triggers_lookups_exactly_once() {
    let gw = FakeGateway::with_snapshots(vec![
        Ok(Some(snapshot("A", 1000, true))),
        Ok(Some(snapshot("A", 2000, true))),
    ]);
    let clock = ManualClock::default();
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), clock.clone());

    let first = session.poll_once().await.unwrap().unwrap();
    assert!(matches!(first, PollEvent::TrackChanged { .. }));
    assert_eq!(gw.artist_calls(), vec!["A-artist"]);
    assert_eq!(gw.concert_calls(), vec!["Artist A"]);

    clock.advance(1000);
    let second = session.poll_once().await.unwrap().unwrap();
    assert_eq!(second, PollEvent::Unchanged);

    // lookups fire per identity change, not per poll tick
    assert_eq!(gw.artist_calls().len(), 1);
    assert_eq!(gw.concert_calls().len(), 1);

    // displayed position re-synced from the second poll
    assert_eq!(session.displayed_progress(), Some(2000));
}

#[tokio::test]
async fn test_new_track_identity_triggers_new_lookups() {
    let gw = FakeGateway::with_snapshots(vec![
        Ok(Some(snapshot("A", 1000, true))),
        Ok(Some(snapshot("B", 0, true))),
    ]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    session.poll_once().await.unwrap();

    assert_eq!(gw.artist_calls(), vec!["A-artist", "B-artist"]);
    assert_eq!(gw.concert_calls(), vec!["Artist A", "Artist B"]);
}

#[tokio::test]
async fn test_artist_image_staged_on_track_change() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 0, true)))]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();

    assert_eq!(session.images().pending(), Some("https://img.example/A-artist"));
    assert_eq!(session.images().commit(), Some("https://img.example/A-artist"));
    assert_eq!(session.images().pending(), None);
}

#[tokio::test]
async fn test_concerts_replaced_on_track_change() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 0, true)))]);
    gw.concert_results
        .lock()
        .unwrap()
        .push_back(vec![concert("Artist A Live")]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();

    assert_eq!(session.concerts().len(), 1);
    assert_eq!(session.concerts()[0].title, "Artist A Live");
}

#[tokio::test]
async fn test_empty_poll_retains_previous_snapshot() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 1000, true))), Ok(None)]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    let event = session.poll_once().await.unwrap().unwrap();

    assert_eq!(event, PollEvent::NoSnapshot);
    assert_eq!(session.poller().snapshot().unwrap().track_id, "A");
}

#[tokio::test]
async fn test_failed_poll_retains_previous_snapshot() {
    let gw = FakeGateway::with_snapshots(vec![
        Ok(Some(snapshot("A", 1000, true))),
        Err(UpstreamError::Status(502, "bad gateway".to_string())),
    ]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    let event = session.poll_once().await.unwrap().unwrap();

    assert_eq!(event, PollEvent::NoSnapshot);
    assert_eq!(session.poller().snapshot().unwrap().track_id, "A");
    assert_eq!(gw.playing_calls(), 2);
}

#[tokio::test]
async fn test_idle_without_token_makes_no_calls() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 0, true)))]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), no_tokens(), ManualClock::default());

    let outcome = session.poll_once().await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(gw.playing_calls(), 0);
    assert_eq!(session.poller().state(), PollerState::Idle);
}

#[tokio::test]
async fn test_position_interpolates_only_while_playing() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 1000, true)))]);
    let clock = ManualClock::default();
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), clock.clone());

    session.poll_once().await.unwrap();
    clock.advance(500);
    assert_eq!(session.displayed_progress(), Some(1500));

    // optimistic pause freezes the display where it stood
    session.dispatch(PlayerCommand::Pause).await.unwrap();
    clock.advance(700);
    assert_eq!(session.displayed_progress(), Some(1500));
    assert!(!session.poller().is_playing());

    // optimistic play resumes from the frozen point
    session.dispatch(PlayerCommand::Play).await.unwrap();
    clock.advance(250);
    assert_eq!(session.displayed_progress(), Some(1750));
    assert_eq!(
        gw.commands(),
        vec![PlayerCommand::Pause, PlayerCommand::Play]
    );
}

#[tokio::test]
async fn test_position_clamps_at_duration() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 199_000, true)))]);
    let clock = ManualClock::default();
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), clock.clone());

    session.poll_once().await.unwrap();
    clock.advance(60_000);

    assert_eq!(session.displayed_progress(), Some(200_000));
}

#[tokio::test]
async fn test_seek_is_sent_unvalidated() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 1000, true)))]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    // way past the 200s duration; relayed verbatim
    session
        .dispatch(PlayerCommand::Seek(999_999_999))
        .await
        .unwrap();

    assert_eq!(gw.commands(), vec![PlayerCommand::Seek(999_999_999)]);
    // local display still clamps at render time
    assert_eq!(session.displayed_progress(), Some(200_000));
}

#[tokio::test]
async fn test_failed_seek_keeps_optimistic_position() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 1000, false)))]);
    gw.command_results
        .lock()
        .unwrap()
        .push_back(Err(UpstreamError::Status(500, "nope".to_string())));
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    let result = session.dispatch(PlayerCommand::Seek(5000)).await;

    assert!(matches!(result, Err(SessionError::Upstream(_))));
    // no rollback; the next poll is the reconciliation point
    assert_eq!(session.displayed_progress(), Some(5000));
}

#[tokio::test]
async fn test_next_triggers_out_of_band_repoll() {
    let gw = FakeGateway::with_snapshots(vec![
        Ok(Some(snapshot("A", 1000, true))),
        Ok(Some(snapshot("B", 0, true))),
    ]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    session.dispatch(PlayerCommand::Next).await.unwrap();

    // the command itself plus an immediate re-poll picking up track B
    assert_eq!(gw.commands(), vec![PlayerCommand::Next]);
    assert_eq!(gw.playing_calls(), 2);
    assert_eq!(session.poller().snapshot().unwrap().track_id, "B");
    assert_eq!(gw.artist_calls(), vec!["A-artist", "B-artist"]);
}

#[tokio::test]
async fn test_auth_failure_after_retry_idles_session() {
    let gw = FakeGateway::with_snapshots(vec![Err(UpstreamError::Auth), Err(UpstreamError::Auth)]);
    let tokens = tokens_with("stale");
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens, ManualClock::default());

    let result = session.poll_once().await;

    assert!(matches!(result, Err(SessionError::Reauthenticate)));
    assert_eq!(gw.playing_calls(), 2);
    assert_eq!(session.poller().state(), PollerState::Idle);
    assert!(session.tokens().access_token().await.is_none());
}

#[tokio::test]
async fn test_logout_clears_tokens_and_idles_poller() {
    let gw = FakeGateway::with_snapshots(vec![Ok(Some(snapshot("A", 1000, true)))]);
    let mut session = Session::new(SharedGateway(Arc::clone(&gw)), tokens_with("t"), ManualClock::default());

    session.poll_once().await.unwrap();
    assert_eq!(session.poller().state(), PollerState::Polling);

    session.logout().await;

    assert!(session.tokens().access_token().await.is_none());
    assert_eq!(session.poller().state(), PollerState::Idle);
    assert!(session.poller().snapshot().is_none());
    assert!(session.concerts().is_empty());
    assert_eq!(session.images().current(), None);
}

#[test]
fn test_image_cache_stages_one_transition() {
    let mut cache = ArtistImageCache::default();

    cache.stage("a.jpg".to_string());
    assert_eq!(cache.pending(), Some("a.jpg"));
    assert_eq!(cache.commit(), Some("a.jpg"));

    // staging the current image again is a no-op
    cache.stage("a.jpg".to_string());
    assert_eq!(cache.pending(), None);

    // a new image replaces any staged one
    cache.stage("b.jpg".to_string());
    cache.stage("c.jpg".to_string());
    assert_eq!(cache.pending(), Some("c.jpg"));
    assert_eq!(cache.commit(), Some("c.jpg"));
    assert_eq!(cache.current(), Some("c.jpg"));
}
