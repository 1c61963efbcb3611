use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::MediaKind;
use crate::config::{DebridProvider, StreamsConfig};
use crate::fetch::{decode_each, fetch_json, null_as_default, FetchError, REQUEST_TIMEOUT};

/// A playable candidate for a title or episode, kept in resolver order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Multi-line descriptor: release name first, then emoji-tagged details
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Set by resolvers that return bare torrents instead of links
    #[serde(default, rename = "infoHash")]
    pub info_hash: Option<String>,
}

impl Source {
    /// Locator handed to the player: the direct url, or a magnet built from the info hash
    pub fn playable_url(&self) -> Option<String> {
        if !self.url.is_empty() {
            return Some(self.url.clone());
        }

        self.info_hash
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .map(|hash| {
                let release = self.title.lines().next().unwrap_or_default();
                format!("magnet:?xt=urn:btih:{}&dn={}", hash, urlencoding::encode(release))
            })
    }
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    streams: Vec<serde_json::Value>,
}

pub struct StreamClient {
    client: Client,
    base_url: String,
    provider: DebridProvider,
    api_key: Option<String>,
    timeout: Duration,
}

impl StreamClient {
    pub fn new(config: &StreamsConfig) -> Self {
        Self::with_base_url(&config.url, config.provider, config.apikey.as_deref())
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: &str, provider: DebridProvider, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            provider,
            api_key: api_key.map(String::from),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base}/{providerKey}={credential}/stream/{kind}/{id}.json`
    ///
    /// The provider segment is always present; without a credential it ends in `=`.
    pub fn stream_url(&self, kind: MediaKind, id: &str) -> String {
        format!(
            "{}/{}={}/stream/{}/{}.json",
            self.base_url,
            self.provider.key(),
            self.api_key.as_deref().unwrap_or_default(),
            kind,
            id
        )
    }

    pub async fn resolve_streams(&self, kind: MediaKind, id: &str) -> Result<Vec<Source>, FetchError> {
        debug!(%kind, id, provider = self.provider.key(), "resolving streams");

        let response: StreamResponse =
            fetch_json(&self.client, &self.stream_url(kind, id), self.timeout).await?;
        Ok(decode_each(response.streams))
    }

    /// URL of the resolver manifest, used for health checks
    pub fn manifest_url(&self) -> String {
        format!("{}/manifest.json", self.base_url)
    }

    pub async fn check_manifest(&self) -> Result<(), FetchError> {
        let _: serde_json::Value = fetch_json(&self.client, &self.manifest_url(), self.timeout).await?;
        Ok(())
    }
}
