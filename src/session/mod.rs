//! # Session Engine
//!
//! The stateful core of the application: token lifecycle and the
//! playback-state synchronization loop.
//!
//! ## Components
//!
//! - [`token`] - [`SessionTokens`]: the explicit session context owning the
//!   access/refresh token pair, with durable storage, reactive 401-driven
//!   refresh and a single-flight guard so concurrent failures share one
//!   exchange.
//! - [`gateway`] - [`UpstreamGateway`]: the transport seam to the
//!   music-streaming and events providers, with the production
//!   [`HttpGateway`] implementation.
//! - [`poller`] - [`PlaybackPoller`]: Idle/Polling state machine that
//!   detects track changes, retains snapshots across empty polls and
//!   interpolates the displayed position between polls.
//! - [`dispatcher`] - optimistic local effects for playback commands.
//!
//! ## Orchestration
//!
//! [`Session`] wires the pieces together. One scheduled task (the caller's
//! poll loop at [`poller::POLL_INTERVAL_MS`]) drives [`Session::poll_once`];
//! a track-identity change is the sole trigger for the artist-image and
//! concert lookups, which run once per new identity. Commands go through
//! [`Session::dispatch`], which applies the optimistic local effect first
//! and lets the next poll reconcile. Redundant or racing polls are tolerated
//! idempotently: observing an unchanged snapshot is a no-op.

pub mod dispatcher;
pub mod gateway;
pub mod poller;
pub mod token;

pub use gateway::{HttpGateway, UpstreamGateway};
pub use poller::{Clock, PlaybackPoller, PollEvent, PollerState, SystemClock};
pub use token::{SessionError, SessionTokens, SpotifyExchanger, TokenExchanger, call_with_refresh};

use crate::types::{ConcertEvent, PlayerCommand};

/// Current-versus-next artist image pair driving the crossfade swap.
///
/// At most one transition is staged at a time; staging the URL that is
/// already current is a no-op. Not authoritative state, purely display.
#[derive(Debug, Default)]
pub struct ArtistImageCache {
    current: Option<String>,
    next: Option<String>,
}

impl ArtistImageCache {
    pub fn stage(&mut self, url: String) {
        if self.current.as_deref() != Some(url.as_str()) {
            self.next = Some(url);
        }
    }

    /// Promotes the staged image to current, returning the new current URL.
    pub fn commit(&mut self) -> Option<&str> {
        if let Some(next) = self.next.take() {
            self.current = Some(next);
        }
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn pending(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.next = None;
    }
}

/// A live playback session: tokens, poller, dispatcher and the dependent
/// lookup state (artist image, concerts).
pub struct Session<G, X, C> {
    gateway: G,
    tokens: SessionTokens<X>,
    clock: C,
    poller: PlaybackPoller,
    images: ArtistImageCache,
    concerts: Vec<ConcertEvent>,
}

impl<G, X, C> Session<G, X, C>
where
    G: UpstreamGateway,
    X: TokenExchanger,
    C: Clock,
{
    pub fn new(gateway: G, tokens: SessionTokens<X>, clock: C) -> Self {
        Session {
            gateway,
            tokens,
            clock,
            poller: PlaybackPoller::new(),
            images: ArtistImageCache::default(),
            concerts: Vec::new(),
        }
    }

    pub fn poller(&self) -> &PlaybackPoller {
        &self.poller
    }

    pub fn tokens(&self) -> &SessionTokens<X> {
        &self.tokens
    }

    pub fn images(&mut self) -> &mut ArtistImageCache {
        &mut self.images
    }

    pub fn concerts(&self) -> &[ConcertEvent] {
        &self.concerts
    }

    /// Interpolated position for rendering, clamped to the track duration.
    pub fn displayed_progress(&self) -> Option<u64> {
        self.poller.displayed_progress(self.clock.now_ms())
    }

    /// Runs one iteration of the synchronization loop.
    ///
    /// Without a token the poller idles and nothing is fetched. With one, a
    /// snapshot is fetched through the refresh-on-401 path; an empty or
    /// failed poll retains the previous snapshot. A changed track identity
    /// triggers the artist-image and concert lookups exactly once for the
    /// new artist; lookup failures are tolerated and left for the next
    /// change to correct.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Reauthenticate`] escapes: stored tokens are
    /// gone, the poller has been stopped and the caller must restart the
    /// login flow.
    pub async fn poll_once(&mut self) -> Result<Option<PollEvent>, SessionError> {
        if self.tokens.access_token().await.is_none() {
            self.poller.stop();
            return Ok(None);
        }
        self.poller.start();

        let gateway = &self.gateway;
        let outcome = match call_with_refresh(&self.tokens, |token| async move {
            gateway.currently_playing(&token).await
        })
        .await
        {
            Ok(snapshot) => snapshot,
            Err(SessionError::Reauthenticate) => {
                self.teardown();
                return Err(SessionError::Reauthenticate);
            }
            // failed poll: keep showing what we had
            Err(_) => None,
        };

        let event = self.poller.observe(outcome, self.clock.now_ms());

        if let PollEvent::TrackChanged {
            artist_id,
            artist_name,
        } = &event
        {
            let artist_id = artist_id.clone();
            let artist_name = artist_name.clone();
            self.refresh_artist_lookups(&artist_id, &artist_name).await?;
        }

        Ok(Some(event))
    }

    /// Issues one playback command.
    ///
    /// The optimistic local effect is applied before the round-trip and is
    /// not rolled back on failure. `next`/`previous` re-poll immediately
    /// since the upcoming track identity is unknown locally.
    pub async fn dispatch(&mut self, command: PlayerCommand) -> Result<(), SessionError> {
        let needs_repoll =
            dispatcher::apply_optimistic(&mut self.poller, command, self.clock.now_ms());

        let gateway = &self.gateway;
        match call_with_refresh(&self.tokens, |token| async move {
            gateway.player_command(&token, command).await
        })
        .await
        {
            Ok(()) => {}
            Err(SessionError::Reauthenticate) => {
                self.teardown();
                return Err(SessionError::Reauthenticate);
            }
            Err(err) => return Err(err),
        }

        if needs_repoll {
            self.poll_once().await?;
        }
        Ok(())
    }

    /// Toggles play/pause based on the local flag.
    pub async fn toggle(&mut self) -> Result<(), SessionError> {
        let command = dispatcher::toggle_command(&self.poller);
        self.dispatch(command).await
    }

    /// Logs the session out: clears stored tokens and idles the poller.
    pub async fn logout(&mut self) {
        self.tokens.clear().await;
        self.teardown();
    }

    fn teardown(&mut self) {
        self.poller.stop();
        self.images.reset();
        self.concerts.clear();
    }

    async fn refresh_artist_lookups(
        &mut self,
        artist_id: &str,
        artist_name: &str,
    ) -> Result<(), SessionError> {
        let gateway = &self.gateway;

        match call_with_refresh(&self.tokens, |token| {
            let artist_id = artist_id.to_string();
            async move { gateway.artist(&token, &artist_id).await }
        })
        .await
        {
            Ok(profile) => {
                if let Some(url) = profile.primary_image() {
                    self.images.stage(url.to_string());
                }
            }
            Err(SessionError::Reauthenticate) => {
                self.teardown();
                return Err(SessionError::Reauthenticate);
            }
            Err(_) => {}
        }

        // events provider needs no bearer token
        match self.gateway.concerts(artist_name).await {
            Ok(events) => self.concerts = events,
            Err(_) => self.concerts.clear(),
        }

        Ok(())
    }
}
