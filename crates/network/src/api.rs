// crates/network/src/api.rs
//! Wire shapes of the media network's REST API

use serde::{Deserialize, Serialize};

/// Body of the directory endpoint: a list of discovery hosts
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectoryResponse {
    #[serde(default)]
    pub data: Vec<String>,
}

/// Body of `/v1/playlists/{id}/tracks`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrackListResponse {
    #[serde(default)]
    pub data: Vec<RemoteTrack>,
}

/// One track in a remote collection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteTrack {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Length in seconds
    #[serde(default)]
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_missing_data_is_empty() {
        let parsed: DirectoryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_track_list_parses_integer_duration() {
        let json = r#"{"data":[{"id":"Yk2Xb","title":"Amazing Grace","duration":187,"extra":true}]}"#;
        let parsed: TrackListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].id, "Yk2Xb");
        assert_eq!(parsed.data[0].duration, 187.0);
    }

    #[test]
    fn test_track_without_id_is_rejected() {
        let json = r#"{"data":[{"title":"No id"}]}"#;
        assert!(serde_json::from_str::<TrackListResponse>(json).is_err());
    }
}
