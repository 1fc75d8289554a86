// crates/network/src/resolver.rs
//! Hymn → stream URL resolution
//!
//! One resolution is three strictly sequential steps: pick a host, fetch the
//! collection's track list, build the stream URL. Any failure ends the
//! attempt; there is no retry.

use crate::api::TrackListResponse;
use crate::buckets::{self, CollectionSlot};
use crate::client::JsonTransport;
use crate::directory::HostDirectory;
use crate::error::{NetworkError, NetworkResult};
use hymnal_core::HymnRef;
use std::future::Future;

/// App name sent with every request
pub const DEFAULT_APP_NAME: &str = "hymnal";

/// A playable stream for one hymn variant
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStream {
    pub stream_url: String,
    pub duration_secs: f64,
    pub track_title: String,
    pub track_id: String,
}

/// Anything that can turn a hymn reference into a stream
pub trait TrackResolver: Send + Sync {
    fn resolve(
        &self,
        hymn: HymnRef,
        wants_vocal: bool,
    ) -> impl Future<Output = NetworkResult<ResolvedStream>> + Send;
}

impl<T: TrackResolver> TrackResolver for std::sync::Arc<T> {
    fn resolve(
        &self,
        hymn: HymnRef,
        wants_vocal: bool,
    ) -> impl Future<Output = NetworkResult<ResolvedStream>> + Send {
        (**self).resolve(hymn, wants_vocal)
    }
}

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub directory_url: String,
    pub default_host: String,
    pub app_name: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            directory_url: crate::directory::DEFAULT_DIRECTORY_URL.to_string(),
            default_host: crate::directory::DEFAULT_HOST.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

/// Resolver backed by the Audius REST API
pub struct AudiusResolver<T> {
    transport: T,
    directory: HostDirectory,
    app_name: String,
}

impl<T: JsonTransport> AudiusResolver<T> {
    pub fn new(transport: T, config: ResolverConfig) -> Self {
        Self {
            transport,
            directory: HostDirectory::new(config.directory_url, config.default_host),
            app_name: config.app_name,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Step 1: the host to use for this attempt
    pub async fn host(&self) -> String {
        self.directory.discover(&self.transport).await
    }

    /// Step 2: metadata for the slot's track
    async fn fetch_track(
        &self,
        host: &str,
        slot: CollectionSlot,
    ) -> NetworkResult<crate::api::RemoteTrack> {
        let url = tracks_url(host, slot.collection_id, &self.app_name);
        let response: TrackListResponse = self.transport.get_json(&url).await?;
        let len = response.data.len();

        response
            .data
            .into_iter()
            .nth(slot.position)
            .ok_or_else(|| NetworkError::IndexOutOfRange {
                collection: slot.collection_id.to_string(),
                index: slot.position,
                len,
            })
    }
}

impl<T: JsonTransport> TrackResolver for AudiusResolver<T> {
    async fn resolve(&self, hymn: HymnRef, wants_vocal: bool) -> NetworkResult<ResolvedStream> {
        let host = self.host().await;
        let slot = buckets::locate(hymn, wants_vocal);
        log::debug!(
            "Resolving {} ({}) via collection {} [{}]",
            hymn,
            if wants_vocal { "vocal" } else { "instrumental" },
            slot.collection_id,
            slot.position
        );

        let track = self.fetch_track(&host, slot).await.inspect_err(|e| {
            log::warn!("Metadata lookup for {} failed: {}", hymn, e);
        })?;
        let stream_url = stream_url(&host, &track.id, &self.app_name)?;

        Ok(ResolvedStream {
            stream_url,
            duration_secs: track.duration,
            track_title: track.title,
            track_id: track.id,
        })
    }
}

/// `{host}/v1/playlists/{id}/tracks?app_name={app}`
pub fn tracks_url(host: &str, collection_id: &str, app_name: &str) -> String {
    format!(
        "{}/v1/playlists/{}/tracks?app_name={}",
        host,
        urlencoding::encode(collection_id),
        urlencoding::encode(app_name)
    )
}

/// `{host}/v1/tracks/{track}/stream?app_name={app}`, validated
pub fn stream_url(host: &str, track_id: &str, app_name: &str) -> NetworkResult<String> {
    if track_id.trim().is_empty() {
        return Err(NetworkError::InvalidStreamUrl(format!(
            "{}/v1/tracks//stream",
            host
        )));
    }
    let raw = format!(
        "{}/v1/tracks/{}/stream?app_name={}",
        host,
        urlencoding::encode(track_id),
        urlencoding::encode(app_name)
    );
    reqwest::Url::parse(&raw)
        .map(|url| url.to_string())
        .map_err(|_| NetworkError::InvalidStreamUrl(raw))
}
