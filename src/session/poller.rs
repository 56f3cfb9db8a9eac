use std::time::Instant;

use crate::{types::PlaybackSnapshot, utils};

/// Poll cadence of the playback synchronization loop.
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Monotonic time source for the poller, injectable for tests.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock backed by `Instant`, anchored at construction.
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// The poller's two states: `Idle` while no token is available, `Polling`
/// while a session holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// What a single poll observation amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The track identity changed. This is the sole trigger for the artist
    /// image and concert lookups.
    TrackChanged {
        artist_id: String,
        artist_name: String,
    },
    /// Same track as before; progress and play state were re-synced from
    /// upstream. Observationally a no-op for dependent lookups.
    Unchanged,
    /// Empty (204) or failed poll. The previous snapshot is retained, not
    /// blanked; before the first successful poll there is simply nothing.
    NoSnapshot,
}

struct TrackState {
    snapshot: PlaybackSnapshot,
    /// Clock reading at the moment `snapshot.progress_ms` was authoritative.
    synced_at_ms: u64,
}

/// Playback-state synchronization state machine.
///
/// Pure with respect to I/O: the owning session fetches snapshots through
/// the gateway and advances the machine with [`PlaybackPoller::observe`],
/// which makes every transition directly testable. Position between polls is
/// interpolated locally from the last sync point while playback is running
/// and is only re-synced by the next full poll or an explicit seek.
pub struct PlaybackPoller {
    state: PollerState,
    current: Option<TrackState>,
}

impl PlaybackPoller {
    pub fn new() -> Self {
        PlaybackPoller {
            state: PollerState::Idle,
            current: None,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Idle → Polling. Called when a token becomes available.
    pub fn start(&mut self) {
        self.state = PollerState::Polling;
    }

    /// Polling → Idle. Called on logout or terminal auth failure; drops the
    /// tracked snapshot with the session.
    pub fn stop(&mut self) {
        self.state = PollerState::Idle;
        self.current = None;
    }

    /// Advances the machine with the outcome of one poll.
    ///
    /// A changed track identity replaces the tracked state and reports
    /// [`PollEvent::TrackChanged`]; an identical identity re-syncs progress
    /// and play state in place; `None` (204 or failed call) retains whatever
    /// was there.
    pub fn observe(&mut self, outcome: Option<PlaybackSnapshot>, now_ms: u64) -> PollEvent {
        let Some(snapshot) = outcome else {
            return PollEvent::NoSnapshot;
        };

        let changed = match &self.current {
            Some(track) => track.snapshot.track_id != snapshot.track_id,
            None => true,
        };

        let event = if changed {
            PollEvent::TrackChanged {
                artist_id: snapshot.artist_id.clone(),
                artist_name: snapshot.artist_name.clone(),
            }
        } else {
            PollEvent::Unchanged
        };

        self.current = Some(TrackState {
            snapshot,
            synced_at_ms: now_ms,
        });

        event
    }

    pub fn snapshot(&self) -> Option<&PlaybackSnapshot> {
        self.current.as_ref().map(|track| &track.snapshot)
    }

    /// Local play/pause flag; `false` while nothing is tracked.
    pub fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .map(|track| track.snapshot.is_playing)
            .unwrap_or(false)
    }

    /// Interpolated playback position, clamped to the track duration.
    ///
    /// While playing, elapsed wall-clock time since the last sync point is
    /// added to the last known progress. While paused the position is frozen
    /// at the sync point.
    pub fn displayed_progress(&self, now_ms: u64) -> Option<u64> {
        let track = self.current.as_ref()?;
        let base = track.snapshot.progress_ms;
        let progress = if track.snapshot.is_playing {
            base + now_ms.saturating_sub(track.synced_at_ms)
        } else {
            base
        };
        Some(utils::clamp_progress(progress, track.snapshot.duration_ms))
    }

    /// Optimistically flips the local play/pause flag before the command
    /// round-trip completes.
    ///
    /// The interpolated position is materialized first so pausing freezes the
    /// display where it stood and resuming continues from there. There is no
    /// rollback if the command later fails; the next poll reconciles.
    pub fn set_playing(&mut self, playing: bool, now_ms: u64) {
        let materialized = self.displayed_progress(now_ms);
        if let (Some(track), Some(progress)) = (self.current.as_mut(), materialized) {
            track.snapshot.progress_ms = progress;
            track.synced_at_ms = now_ms;
            track.snapshot.is_playing = playing;
        }
    }

    /// Optimistically moves the local position for a seek command.
    ///
    /// The position is applied verbatim, without range validation against the
    /// track duration, and is not rolled back if the seek fails upstream.
    pub fn apply_seek(&mut self, position_ms: u64, now_ms: u64) {
        if let Some(track) = self.current.as_mut() {
            track.snapshot.progress_ms = position_ms;
            track.synced_at_ms = now_ms;
        }
    }
}

impl Default for PlaybackPoller {
    fn default() -> Self {
        Self::new()
    }
}
