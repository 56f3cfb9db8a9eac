use chrono::NaiveDateTime;
use rand::{Rng, distr::Alphanumeric};

use crate::types::{ConcertEvent, ConcertTableRow};

pub fn generate_state_param() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub fn format_track_time(ms: u64) -> String {
    let minutes = ms / 60000;
    let seconds = (ms % 60000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

pub fn build_token_fragment(frontend_url: &str, access_token: &str, refresh_token: &str) -> String {
    format!(
        "{}/#access_token={}&refresh_token={}",
        frontend_url.trim_end_matches('/'),
        access_token,
        refresh_token
    )
}

pub fn clamp_progress(progress_ms: u64, duration_ms: u64) -> u64 {
    progress_ms.min(duration_ms)
}

pub fn concert_table_rows(events: &[ConcertEvent]) -> Vec<ConcertTableRow> {
    events.iter().map(concert_table_row).collect()
}

fn concert_table_row(event: &ConcertEvent) -> ConcertTableRow {
    ConcertTableRow {
        date: format_concert_date(&event.datetime_local),
        title: event.title.clone(),
        venue: format!(
            "{} - {}, {}",
            event.venue.name, event.venue.city, event.venue.state
        ),
    }
}

pub fn format_concert_date(datetime_local: &str) -> String {
    match NaiveDateTime::parse_from_str(datetime_local, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => dt.format("%a, %b %-d %Y · %-I:%M %p").to_string(),
        Err(_) => datetime_local.to_string(),
    }
}
