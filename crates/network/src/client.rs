// crates/network/src/client.rs
//! HTTP client wrapper and the JSON transport seam

use crate::error::{NetworkError, NetworkResult};
use reqwest::{Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Something that can GET a URL and decode the JSON body
///
/// The resolver is generic over this so it can run against canned
/// responses in tests.
pub trait JsonTransport: Send + Sync {
    fn get_json<T>(&self, url: &str) -> impl Future<Output = NetworkResult<T>> + Send
    where
        T: DeserializeOwned + Send;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: format!("Hymnal/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client used for directory and metadata requests
///
/// Requests are made once; resolution has no retry loop.
#[derive(Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET request, failing on non-success status codes
    pub async fn get(&self, url: &str) -> NetworkResult<Response> {
        let response = self.inner.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout
            } else if e.is_connect() {
                NetworkError::NetworkUnavailable(e.to_string())
            } else {
                NetworkError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            log::debug!("GET {} -> {}", url, status);
            Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

impl JsonTransport for Client {
    async fn get_json<T>(&self, url: &str) -> NetworkResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let response = self.get(url).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                NetworkError::MalformedResponse {
                    endpoint: url.to_string(),
                    details: e.to_string(),
                }
            } else {
                NetworkError::Http(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("Hymnal/"));
    }

    #[test]
    fn test_client_creation() {
        let client = Client::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = ClientConfig {
            timeout: Duration::from_secs(5),
            user_agent: "TestAgent".to_string(),
            max_redirects: 2,
        };

        let client = Client::with_config(config).expect("client");
        assert_eq!(client.config().user_agent, "TestAgent");
    }

    #[tokio::test]
    async fn test_unroutable_host_is_an_error() {
        let client = Client::with_config(
            ClientConfig::default().with_timeout(Duration::from_millis(500)),
        )
        .expect("client");

        let result: NetworkResult<serde_json::Value> =
            client.get_json("http://127.0.0.1:9/unreachable").await;
        assert!(result.is_err());
    }
}
