// crates/playback/tests/common/mod.rs
#![allow(dead_code)]

use hymnal_core::{Hymn, HymnRef, HymnalVersion, Playlist};
use hymnal_network::{NetworkError, NetworkResult, ResolvedStream, TrackResolver};
use hymnal_playback::{
    ControllerSettings, HeadlessPlayer, PlaybackContext, PlaybackEvent, ProgressSettings,
};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

pub const TRACK_SECS: f64 = 60.0;

/// Resolver answering from a formula instead of the network
#[derive(Default)]
pub struct FakeResolver {
    failing: Mutex<HashSet<usize>>,
    hang: bool,
    calls: Mutex<Vec<(HymnRef, bool)>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never completes
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn fail_index(&self, index: usize) {
        self.failing.lock().unwrap().insert(index);
    }

    pub fn calls(&self) -> Vec<(HymnRef, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn url_for(hymn: HymnRef, vocal: bool) -> String {
    format!(
        "https://fake.test/{}/{}/{}",
        hymn.hymnal_version,
        hymn.index,
        if vocal { "vocal" } else { "instrumental" }
    )
}

pub fn standard_url(index: usize) -> String {
    url_for(HymnRef::new(HymnalVersion::Standard, index), true)
}

impl TrackResolver for FakeResolver {
    async fn resolve(&self, hymn: HymnRef, wants_vocal: bool) -> NetworkResult<ResolvedStream> {
        self.calls.lock().unwrap().push((hymn, wants_vocal));
        if self.hang {
            std::future::pending::<()>().await;
        }
        let failing = self.failing.lock().unwrap().contains(&hymn.index);
        if failing {
            return Err(NetworkError::NetworkUnavailable(format!("{} is down", hymn)));
        }
        Ok(ResolvedStream {
            stream_url: url_for(hymn, wants_vocal),
            duration_secs: TRACK_SECS,
            track_title: format!("Track {}", hymn.index),
            track_id: format!("t{}", hymn.index),
        })
    }
}

pub fn hymns(count: u32) -> Vec<Hymn> {
    (1..=count)
        .map(|n| Hymn::new(n, format!("Hymn {}", n), HymnalVersion::Standard))
        .collect()
}

pub fn playlist(count: u32) -> Playlist {
    let mut playlist = Playlist::new_user("Sunday".to_string());
    for hymn in hymns(count) {
        playlist.push_hymn(&hymn).unwrap();
    }
    playlist
}

pub fn context() -> PlaybackContext<HeadlessPlayer> {
    PlaybackContext::new(HeadlessPlayer::new())
}

pub fn settings() -> ControllerSettings {
    ControllerSettings {
        load_timeout: Duration::from_secs(10),
        prefer_vocal: true,
        progress: ProgressSettings {
            interval: Duration::from_millis(16),
            end_reset_delay: Duration::from_millis(500),
        },
    }
}

pub fn drain(rx: &mut broadcast::Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
