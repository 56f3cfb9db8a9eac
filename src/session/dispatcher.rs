use crate::types::PlayerCommand;

use super::poller::PlaybackPoller;

/// Applies a command's optimistic local effect before the gateway round-trip.
///
/// `play`/`pause` flip the local play flag, `seek` moves the local position;
/// both take effect before the server confirms and are never rolled back on
/// failure (the next scheduled poll is the sole correction mechanism).
/// `next`/`previous` have no optimistic effect because the upcoming track
/// identity is unknown locally; instead they request an immediate re-poll.
///
/// Returns `true` when the caller must re-poll out of band.
pub fn apply_optimistic(poller: &mut PlaybackPoller, command: PlayerCommand, now_ms: u64) -> bool {
    match command {
        PlayerCommand::Play => {
            poller.set_playing(true, now_ms);
            false
        }
        PlayerCommand::Pause => {
            poller.set_playing(false, now_ms);
            false
        }
        PlayerCommand::Seek(position_ms) => {
            poller.apply_seek(position_ms, now_ms);
            false
        }
        PlayerCommand::Next | PlayerCommand::Previous => true,
    }
}

/// Picks the toggle target from the current local play flag.
pub fn toggle_command(poller: &PlaybackPoller) -> PlayerCommand {
    if poller.is_playing() {
        PlayerCommand::Pause
    } else {
        PlayerCommand::Play
    }
}
