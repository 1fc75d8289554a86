// crates/network/src/directory.rs
//! Discovery-host selection

use crate::api::DirectoryResponse;
use crate::client::JsonTransport;

/// Public directory listing healthy discovery hosts
pub const DEFAULT_DIRECTORY_URL: &str = "https://api.audius.co";

/// Host used whenever the directory cannot be consulted
pub const DEFAULT_HOST: &str = "https://audius-discovery-3.altego.net";

/// Picks the discovery host to talk to
#[derive(Debug, Clone)]
pub struct HostDirectory {
    directory_url: String,
    default_host: String,
}

impl HostDirectory {
    pub fn new(directory_url: impl Into<String>, default_host: impl Into<String>) -> Self {
        Self {
            directory_url: directory_url.into(),
            default_host: normalize_host(&default_host.into()),
        }
    }

    pub fn default_host(&self) -> &str {
        &self.default_host
    }

    pub fn directory_url(&self) -> &str {
        &self.directory_url
    }

    /// Returns the first listed host, or the default host on any failure
    ///
    /// Never fails: an empty list, a transport error and a malformed body all
    /// end up on the default host.
    pub async fn discover<T: JsonTransport>(&self, transport: &T) -> String {
        match transport
            .get_json::<DirectoryResponse>(&self.directory_url)
            .await
        {
            Ok(response) => match response
                .data
                .into_iter()
                .map(|h| normalize_host(&h))
                .find(|h| !h.is_empty())
            {
                Some(host) => {
                    log::debug!("Discovered host {}", host);
                    host
                }
                None => {
                    log::warn!(
                        "Directory {} listed no hosts, using {}",
                        self.directory_url,
                        self.default_host
                    );
                    self.default_host.clone()
                }
            },
            Err(e) => {
                log::warn!(
                    "Host discovery failed ({}), using {}",
                    e,
                    self.default_host
                );
                self.default_host.clone()
            }
        }
    }
}

impl Default for HostDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_URL, DEFAULT_HOST)
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let directory = HostDirectory::default();
        assert_eq!(directory.directory_url(), DEFAULT_DIRECTORY_URL);
        assert_eq!(directory.default_host(), DEFAULT_HOST);
    }

    #[test]
    fn test_default_host_is_normalized() {
        let directory = HostDirectory::new(DEFAULT_DIRECTORY_URL, " https://example.org/ ");
        assert_eq!(directory.default_host(), "https://example.org");
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("https://a.b//"), "https://a.b");
        assert_eq!(normalize_host("   "), "");
    }
}
