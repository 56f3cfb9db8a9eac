//! SeatGeek events API client.
//!
//! One endpoint is used: `/events` with a free-text artist query. Credentials
//! are passed as query parameters, which is how the SeatGeek API
//! authenticates server-side callers.

use reqwest::Client;
use serde_json::Value;

use crate::{
    config,
    types::{ConcertEvent, EventsResponse, UpstreamError},
};

/// Searches upcoming events for an artist name.
///
/// Returns the raw JSON body so the proxy can relay it verbatim; use
/// [`search_events_typed`] for the structured view.
pub async fn search_events(artist: &str) -> Result<Value, UpstreamError> {
    let client = Client::new();
    let response = client
        .get(format!("{}/events", config::seatgeek_apiurl()))
        .query(&[
            ("client_id", config::seatgeek_client_id()),
            ("client_secret", config::seatgeek_client_secret()),
            ("q", artist.to_string()),
        ])
        .send()
        .await
        .map_err(|e| UpstreamError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status(status.as_u16(), body));
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamError::Network(e.to_string()))
}

/// Searches events and deserializes them into [`ConcertEvent`] values.
pub async fn search_events_typed(artist: &str) -> Result<Vec<ConcertEvent>, UpstreamError> {
    let json = search_events(artist).await?;
    let events: EventsResponse =
        serde_json::from_value(json).map_err(|e| UpstreamError::Network(e.to_string()))?;
    Ok(events.events)
}
