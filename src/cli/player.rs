use crate::{
    session::{HttpGateway, Session, SessionError, SessionTokens, SpotifyExchanger, SystemClock},
    success,
    types::PlayerCommand,
    warning,
};

/// One-shot playback command using the stored session.
pub async fn dispatch(command: PlayerCommand) {
    let mut session = load_session().await;

    match session.dispatch(command).await {
        Ok(()) => success!("{}", confirmation(command)),
        Err(SessionError::Reauthenticate) => {
            warning!("Session expired. Run `onstage auth` to log in again.")
        }
        Err(e) => warning!("Command failed: {}", e),
    }
}

/// One-shot play/pause toggle.
///
/// A fresh process has no polled snapshot, so the local flag is synced with
/// one poll before the toggle target is picked.
pub async fn toggle() {
    let mut session = load_session().await;

    if let Err(SessionError::Reauthenticate) = session.poll_once().await {
        warning!("Session expired. Run `onstage auth` to log in again.");
        return;
    }

    match session.toggle().await {
        Ok(()) => success!("Toggled playback"),
        Err(SessionError::Reauthenticate) => {
            warning!("Session expired. Run `onstage auth` to log in again.")
        }
        Err(e) => warning!("Command failed: {}", e),
    }
}

async fn load_session() -> Session<HttpGateway, SpotifyExchanger, SystemClock> {
    let tokens = SessionTokens::load(SpotifyExchanger).await;
    Session::new(HttpGateway, tokens, SystemClock::new())
}

fn confirmation(command: PlayerCommand) -> &'static str {
    match command {
        PlayerCommand::Play => "Playback started",
        PlayerCommand::Pause => "Playback paused",
        PlayerCommand::Seek(_) => "Seek successful",
        PlayerCommand::Next => "Skipped to next track",
        PlayerCommand::Previous => "Skipped to previous track",
    }
}
