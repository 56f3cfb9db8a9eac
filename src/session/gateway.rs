use crate::{
    seatgeek, spotify,
    types::{ArtistProfile, ConcertEvent, PlaybackSnapshot, PlayerCommand, UpstreamError},
};

/// Authenticated transport to the music-streaming and events providers.
///
/// The session engine only talks to upstreams through this trait, which is
/// the seam the tests replace with scripted fakes. The production
/// implementation is [`HttpGateway`].
#[allow(async_fn_in_trait)]
pub trait UpstreamGateway {
    /// Fetches the currently-playing snapshot. `Ok(None)` means nothing is
    /// playing (a 204 upstream) and is not a failure.
    async fn currently_playing(
        &self,
        token: &str,
    ) -> Result<Option<PlaybackSnapshot>, UpstreamError>;

    /// Fetches artist metadata for the image lookup.
    async fn artist(&self, token: &str, artist_id: &str) -> Result<ArtistProfile, UpstreamError>;

    /// Issues one playback command.
    async fn player_command(
        &self,
        token: &str,
        command: PlayerCommand,
    ) -> Result<(), UpstreamError>;

    /// Looks up upcoming concerts by artist name. Unauthenticated upstream;
    /// provider credentials ride along as query parameters.
    async fn concerts(&self, artist_name: &str) -> Result<Vec<ConcertEvent>, UpstreamError>;
}

/// Production gateway delegating to the Spotify and SeatGeek clients.
pub struct HttpGateway;

impl UpstreamGateway for HttpGateway {
    async fn currently_playing(
        &self,
        token: &str,
    ) -> Result<Option<PlaybackSnapshot>, UpstreamError> {
        let body = spotify::player::currently_playing(token).await?;
        Ok(body.as_ref().and_then(PlaybackSnapshot::from_player_json))
    }

    async fn artist(&self, token: &str, artist_id: &str) -> Result<ArtistProfile, UpstreamError> {
        let json = spotify::player::artist(token, artist_id).await?;
        serde_json::from_value(json).map_err(|e| UpstreamError::Network(e.to_string()))
    }

    async fn player_command(
        &self,
        token: &str,
        command: PlayerCommand,
    ) -> Result<(), UpstreamError> {
        spotify::player::player_command(token, command).await
    }

    async fn concerts(&self, artist_name: &str) -> Result<Vec<ConcertEvent>, UpstreamError> {
        seatgeek::search_events_typed(artist_name).await
    }
}
