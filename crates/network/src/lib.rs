// crates/network/src/lib.rs
//! Track resolution against the media network
//!
//! Turns a hymn reference plus a vocal/instrumental choice into a playable
//! stream URL: discovery host selection, bucket mapping, collection metadata
//! lookup and stream URL construction.

pub mod api;
pub mod buckets;
mod client;
pub mod directory;
mod error;
mod resolver;

pub use buckets::{bucket_for, locate, CollectionSlot, BUCKET_COUNT, BUCKET_SIZE};
pub use client::{Client, ClientConfig, JsonTransport};
pub use directory::{HostDirectory, DEFAULT_DIRECTORY_URL, DEFAULT_HOST};
pub use error::{NetworkError, NetworkResult};
pub use resolver::{
    stream_url, tracks_url, AudiusResolver, ResolvedStream, ResolverConfig, TrackResolver,
    DEFAULT_APP_NAME,
};
