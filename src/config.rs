use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Token in the player command that is replaced by the chosen stream URL
pub const URL_PLACEHOLDER: &str = "{}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config directory not found")]
    NoConfigDir,
    #[error("failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub streams: StreamsConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Trending catalogs live on a separate host
    #[serde(default = "default_trending_url")]
    pub trending_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            trending_url: default_trending_url(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://v3-cinemeta.strem.io".to_string()
}

fn default_trending_url() -> String {
    "https://cinemeta-catalogs.strem.io".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamsConfig {
    #[serde(default = "default_streams_url")]
    pub url: String,
    #[serde(default)]
    pub provider: DebridProvider,
    pub apikey: Option<String>,
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            url: default_streams_url(),
            provider: DebridProvider::default(),
            apikey: None,
        }
    }
}

fn default_streams_url() -> String {
    "https://torrentio.strem.fun".to_string()
}

/// Debrid services understood by the stream resolver.
///
/// The lowercase name is the key used in the resolver's path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebridProvider {
    #[default]
    RealDebrid,
    Premiumize,
    AllDebrid,
    DebridLink,
    EasyDebrid,
    Offcloud,
    Torbox,
    Putio,
}

impl DebridProvider {
    pub fn key(&self) -> &'static str {
        match self {
            DebridProvider::RealDebrid => "realdebrid",
            DebridProvider::Premiumize => "premiumize",
            DebridProvider::AllDebrid => "alldebrid",
            DebridProvider::DebridLink => "debridlink",
            DebridProvider::EasyDebrid => "easydebrid",
            DebridProvider::Offcloud => "offcloud",
            DebridProvider::Torbox => "torbox",
            DebridProvider::Putio => "putio",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Shell command template, `{}` is replaced by the stream URL
    #[serde(default = "default_player_command")]
    pub command: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
        }
    }
}

fn default_player_command() -> String {
    "mpv {}".to_string()
}

impl Config {
    /// Load from the platform config dir, falling back to defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(contents)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "streampick")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    fn normalize(&mut self) {
        // Strip trailing slash for consistency
        for url in [
            &mut self.catalog.url,
            &mut self.catalog.trending_url,
            &mut self.streams.url,
        ] {
            let trimmed = url.trim_end_matches('/').len();
            url.truncate(trimmed);
        }

        if self
            .streams
            .apikey
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            self.streams.apikey = None;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("catalog.url", &self.catalog.url)?;
        validate_url("catalog.trending_url", &self.catalog.trending_url)?;
        validate_url("streams.url", &self.streams.url)?;

        if !self.player.command.contains(URL_PLACEHOLDER) {
            return Err(ConfigError::ValidationError(format!(
                "player.command must contain the {} placeholder",
                URL_PLACEHOLDER
            )));
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::ValidationError(format!(
            "{} must start with http:// or https://",
            field
        )));
    }

    Ok(())
}
