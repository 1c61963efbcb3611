use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Upper bound for one catalog or stream request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Failure of any catalog or stream query. Carries the URL that was attempted.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Timeout { url, .. } => url,
        }
    }
}

/// GET `url` and decode the JSON body, giving up after `limit`. No retries.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    limit: Duration,
) -> Result<T, FetchError> {
    debug!(url, "fetching");

    match timeout(limit, get_json(client, url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
            after: limit,
        }),
    }
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_error)?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response.json::<T>().await.map_err(request_error)
}

/// Treat an explicit `null` like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode array entries one by one so a malformed entry only loses itself
pub(crate) fn decode_each<T: DeserializeOwned>(items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "skipping malformed entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Entry {
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
        #[serde(default, deserialize_with = "null_as_default")]
        count: u32,
    }

    #[test]
    fn test_null_fields_become_defaults() {
        let entry: Entry = serde_json::from_str(r#"{"name":null,"count":null}"#).unwrap();
        assert_eq!(entry, Entry::default());

        let missing: Entry = serde_json::from_str("{}").unwrap();
        assert_eq!(missing, Entry::default());
    }

    #[test]
    fn test_decode_each_skips_bad_entries() {
        let items: Vec<serde_json::Value> =
            serde_json::from_str(r#"[{"name":"a","count":1},{"count":"many"},null,{"name":"b"}]"#).unwrap();
        let entries: Vec<Entry> = decode_each(items);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[1].name, "b");
    }

    #[test]
    fn test_error_url_for_every_kind() {
        let err = FetchError::Timeout {
            url: "https://x/top.json".to_string(),
            after: Duration::from_secs(2),
        };
        assert_eq!(err.url(), "https://x/top.json");
        assert!(err.to_string().contains("timed out"));
    }
}
