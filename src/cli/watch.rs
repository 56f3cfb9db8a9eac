use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error, info,
    session::{
        HttpGateway, PollEvent, Session, SessionError, SessionTokens, SpotifyExchanger,
        SystemClock, poller::POLL_INTERVAL_MS,
    },
    utils, warning,
};

/// Live now-playing view.
///
/// One scheduled loop at the poll cadence drives the session; the same tick
/// updates the interpolated position bar, so no separate interpolation timer
/// exists. Track changes print the new track, swap the staged artist image
/// and render the concerts table.
pub async fn watch() {
    let tokens = SessionTokens::load(SpotifyExchanger).await;
    if tokens.access_token().await.is_none() {
        error!("No stored session found. Run `onstage auth` first.");
    }

    let mut session = Session::new(HttpGateway, tokens, SystemClock::new());

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{wide_bar:.blue}] {prefix}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut interval = tokio::time::interval(Duration::from_millis(POLL_INTERVAL_MS));
    loop {
        interval.tick().await;

        match session.poll_once().await {
            Ok(Some(PollEvent::TrackChanged { artist_name, .. })) => {
                bar.suspend(|| {
                    if let Some(snapshot) = session.poller().snapshot() {
                        info!("Now playing: {} - {}", snapshot.track_name, artist_name);
                    }
                    render_concerts(&session, &artist_name);
                });
                if let Some(url) = session.images().commit() {
                    let url = url.to_string();
                    bar.suspend(|| info!("Artist image: {}", url));
                }
            }
            Ok(_) => {}
            Err(SessionError::Reauthenticate) => {
                bar.finish_and_clear();
                warning!("Session expired. Run `onstage auth` to log in again.");
                return;
            }
            Err(e) => {
                bar.suspend(|| warning!("Poll failed: {}", e));
            }
        }

        render_position(&session, &bar);
    }
}

fn render_position<G, X, C>(session: &Session<G, X, C>, bar: &ProgressBar)
where
    G: crate::session::UpstreamGateway,
    X: crate::session::TokenExchanger,
    C: crate::session::Clock,
{
    let Some(snapshot) = session.poller().snapshot() else {
        bar.set_message("Nothing playing");
        bar.set_prefix("");
        return;
    };

    let position = session.displayed_progress().unwrap_or(0);
    bar.set_length(snapshot.duration_ms);
    bar.set_position(position);
    bar.set_message(format!(
        "{} - {}",
        snapshot.track_name, snapshot.artist_name
    ));
    bar.set_prefix(format!(
        "{} / {}",
        utils::format_track_time(position),
        utils::format_track_time(snapshot.duration_ms)
    ));
}

fn render_concerts<G, X, C>(session: &Session<G, X, C>, artist_name: &str)
where
    G: crate::session::UpstreamGateway,
    X: crate::session::TokenExchanger,
    C: crate::session::Clock,
{
    let events = session.concerts();
    if events.is_empty() {
        info!("No concerts found for {}", artist_name);
        return;
    }

    let table = Table::new(utils::concert_table_rows(events));
    println!("{}", table);
}
