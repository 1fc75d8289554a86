// crates/network/src/error.rs
//! Error types for network operations

use hymnal_core::AppError;
use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur while talking to the media network
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Network unavailable
    #[error("Network is unavailable: {0}")]
    NetworkUnavailable(String),

    /// Body could not be decoded into the expected shape
    #[error("Malformed response from {endpoint}: {details}")]
    MalformedResponse { endpoint: String, details: String },

    /// The bucket position is past the end of the remote track list
    #[error("Index {index} out of range for collection {collection} ({len} tracks)")]
    IndexOutOfRange {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Stream URL could not be built
    #[error("Invalid stream URL: {0}")]
    InvalidStreamUrl(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,
}

impl NetworkError {
    /// True for failures of the transport itself rather than of the payload
    pub fn is_connectivity(&self) -> bool {
        match self {
            NetworkError::NetworkUnavailable(_) | NetworkError::Timeout => true,
            NetworkError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, NetworkError::Status { status, .. } if (400..500).contains(status))
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, NetworkError::Status { status, .. } if (500..600).contains(status))
    }
}

impl From<NetworkError> for AppError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::MalformedResponse { endpoint, details } => {
                AppError::MalformedResponse { endpoint, details }
            }
            NetworkError::IndexOutOfRange {
                collection,
                index,
                len,
            } => AppError::IndexOutOfRange {
                collection,
                index,
                len,
            },
            NetworkError::InvalidStreamUrl(url) => AppError::InvalidStreamUrl { url },
            NetworkError::Status { url, status } => AppError::MalformedResponse {
                endpoint: url,
                details: format!("HTTP {}", status),
            },
            other => AppError::NetworkUnavailable {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetworkError::InvalidStreamUrl("test".to_string());
        assert!(err.to_string().contains("Invalid stream URL"));
    }

    #[test]
    fn test_network_unavailable() {
        let err = NetworkError::NetworkUnavailable("offline".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.is_connectivity());
    }

    #[test]
    fn test_status_classification() {
        let not_found = NetworkError::Status {
            url: "u".to_string(),
            status: 404,
        };
        let bad_gateway = NetworkError::Status {
            url: "u".to_string(),
            status: 502,
        };
        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());
        assert!(bad_gateway.is_server_error());
        assert!(!bad_gateway.is_connectivity());
    }

    #[test]
    fn test_conversion_into_app_error() {
        let err: AppError = NetworkError::IndexOutOfRange {
            collection: "x".to_string(),
            index: 3,
            len: 2,
        }
        .into();
        assert!(matches!(err, AppError::IndexOutOfRange { index: 3, len: 2, .. }));

        let err: AppError = NetworkError::Timeout.into();
        assert!(matches!(err, AppError::NetworkUnavailable { .. }));
    }
}
