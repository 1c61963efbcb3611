use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::fetch::{decode_each, fetch_json, null_as_default, FetchError, REQUEST_TIMEOUT};

pub type MetadataFetchError = FetchError;

/// Catalog namespace. Ids are only unique within one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment used by both the catalog and the stream resolver
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "movies" => Some(MediaKind::Movie),
            "series" | "tv" | "show" | "shows" => Some(MediaKind::Series),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie or series entry from the catalog
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawTitle")]
pub struct Title {
    pub id: String,
    pub name: String,
    pub poster: String,
    pub release_info: String,
}

/// Wire shape of a catalog entry. Both spellings of the release field occur.
#[derive(Deserialize)]
struct RawTitle {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    poster: String,
    #[serde(default, rename = "releaseInfo")]
    release_info: Option<String>,
    #[serde(default)]
    releaseinfo: Option<String>,
}

impl From<RawTitle> for Title {
    fn from(raw: RawTitle) -> Self {
        let release_info = raw
            .release_info
            .filter(|r| !r.is_empty())
            .or(raw.releaseinfo)
            .unwrap_or_default();

        Title {
            id: raw.id,
            name: raw.name,
            poster: raw.poster,
            release_info,
        }
    }
}

impl Title {
    /// "The Matrix (1999)", or just the name when there is no release info
    pub fn display_title(&self) -> String {
        if self.release_info.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.release_info)
        }
    }

    pub fn imdb_url(&self) -> String {
        format!("https://imdb.com/title/{}", self.id)
    }
}

/// One episode of a series. Season 0 holds specials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode: u32,
    #[serde(default)]
    pub released: Option<String>,
}

impl Episode {
    /// Format as "S1E2: Episode Name"
    pub fn display_title(&self) -> String {
        format!("S{}E{}: {}", self.season, self.episode, self.name)
    }
}

// Collections are kept as raw values and decoded entry by entry
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    metas: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
    #[serde(default)]
    meta: Option<SeriesMeta>,
}

#[derive(Debug, Deserialize)]
struct SeriesMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    videos: Vec<serde_json::Value>,
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
    trending_url: String,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_base_urls(&config.url, &config.trending_url)
    }

    /// Create a client against custom hosts (for testing)
    pub fn with_base_urls(base_url: &str, trending_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            trending_url: trending_url.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn search_url(&self, kind: MediaKind, query: &str) -> String {
        format!(
            "{}/catalog/{}/top/search={}.json",
            self.base_url,
            kind,
            urlencoding::encode(query)
        )
    }

    pub fn trending_url(&self, kind: MediaKind) -> String {
        format!("{}/top/catalog/{}/top.json", self.trending_url, kind)
    }

    pub fn series_meta_url(&self, series_id: &str) -> String {
        format!("{}/meta/series/{}.json", self.base_url, series_id)
    }

    /// Search titles by free text.
    ///
    /// An empty query has no meaning upstream; callers must use
    /// [`CatalogClient::trending_titles`] instead.
    pub async fn search_titles(
        &self,
        kind: MediaKind,
        query: &str,
    ) -> Result<Vec<Title>, MetadataFetchError> {
        debug!(%kind, query, "searching catalog");

        let response: CatalogResponse =
            fetch_json(&self.client, &self.search_url(kind, query), self.timeout).await?;
        Ok(keep_identified(decode_each(response.metas)))
    }

    pub async fn trending_titles(&self, kind: MediaKind) -> Result<Vec<Title>, MetadataFetchError> {
        debug!(%kind, "fetching trending titles");

        let response: CatalogResponse =
            fetch_json(&self.client, &self.trending_url(kind), self.timeout).await?;
        Ok(keep_identified(decode_each(response.metas)))
    }

    /// Flat, ungrouped episode list of a series
    pub async fn series_episodes(&self, series_id: &str) -> Result<Vec<Episode>, MetadataFetchError> {
        debug!(series_id, "fetching episodes");

        let response: MetaResponse =
            fetch_json(&self.client, &self.series_meta_url(series_id), self.timeout).await?;
        Ok(response.meta.map(|m| decode_each(m.videos)).unwrap_or_default())
    }
}

/// Entries without an id cannot be queried further
fn keep_identified(titles: Vec<Title>) -> Vec<Title> {
    titles.into_iter().filter(|t| !t.id.is_empty()).collect()
}
