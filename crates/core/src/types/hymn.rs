//! Hymn domain models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edition of the hymnal a hymn belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HymnalVersion {
    Standard,
    Revised,
}

impl HymnalVersion {
    pub const ALL: [HymnalVersion; 2] = [HymnalVersion::Standard, HymnalVersion::Revised];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Revised => "revised",
        }
    }
}

impl fmt::Display for HymnalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HymnalVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "revised" => Ok(Self::Revised),
            other => Err(format!("unknown hymnal edition '{}'", other)),
        }
    }
}

/// A single hymn as shipped with the app
///
/// Hymns are loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hymn {
    /// 1-based number printed in the hymnal
    pub numeric_id: u32,
    pub title: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub vocal_track_ref: Option<String>,
    #[serde(default)]
    pub instrumental_track_ref: Option<String>,
    pub hymnal_version: HymnalVersion,
}

impl Hymn {
    pub fn new(numeric_id: u32, title: impl Into<String>, hymnal_version: HymnalVersion) -> Self {
        Self {
            numeric_id,
            title: title.into(),
            lyrics: String::new(),
            vocal_track_ref: None,
            instrumental_track_ref: None,
            hymnal_version,
        }
    }

    /// Stable identifier across editions, e.g. `revised-245`
    pub fn key(&self) -> String {
        hymn_key(self.hymnal_version, self.numeric_id)
    }

    /// Zero-based position of the hymn in its edition
    pub fn sequence_index(&self) -> usize {
        self.numeric_id.saturating_sub(1) as usize
    }

    pub fn reference(&self) -> HymnRef {
        HymnRef::from_number(self.hymnal_version, self.numeric_id)
    }

    /// The bundled track reference for the requested variant, if any
    pub fn track_ref(&self, vocal: bool) -> Option<&str> {
        if vocal {
            self.vocal_track_ref.as_deref()
        } else {
            self.instrumental_track_ref.as_deref()
        }
    }
}

/// Builds the key used to identify a hymn in playlists and favorites
pub fn hymn_key(version: HymnalVersion, numeric_id: u32) -> String {
    format!("{}-{}", version, numeric_id)
}

/// The minimal information needed to locate a hymn's recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HymnRef {
    pub hymnal_version: HymnalVersion,
    /// Zero-based sequential index within the edition
    pub index: usize,
}

impl HymnRef {
    pub fn new(hymnal_version: HymnalVersion, index: usize) -> Self {
        Self {
            hymnal_version,
            index,
        }
    }

    /// Builds a reference from the 1-based printed hymn number
    pub fn from_number(hymnal_version: HymnalVersion, numeric_id: u32) -> Self {
        Self::new(hymnal_version, numeric_id.saturating_sub(1) as usize)
    }
}

impl fmt::Display for HymnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.hymnal_version, self.index + 1)
    }
}
