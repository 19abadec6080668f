//! iTunes Search API HTTP client
//!
//! No API key required. Requests carry a timeout; a timed-out or failed
//! request is indistinguishable from "no artwork found" to callers.

use std::time::Duration;

use tracing::debug;

use super::dto;
use crate::config::LookupConfig;

/// Size tokens in iTunes artwork URLs; the thumbnail URL embeds the first,
/// the downloadable high-resolution variant uses the second.
const THUMB_SIZE_TOKEN: &str = "100x100";
const HIRES_SIZE_TOKEN: &str = "600x600";

/// Errors internal to the lookup client.
///
/// These never escape [`ArtworkClient::find_artwork`]; they exist so the
/// internal request path can use `?` and so the constructor can report a
/// broken HTTP stack.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Artwork search client
pub struct ArtworkClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ArtworkClient {
    /// Create a new client with the configured endpoint and timeout.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Search for artwork by artist and title.
    ///
    /// Returns the high-resolution image bytes on a positive match.
    /// Network errors, timeouts, non-success statuses, empty result sets,
    /// and malformed responses all yield `None` - the fallback chain moves
    /// on to the next strategy.
    pub async fn find_artwork(&self, artist: &str, title: &str) -> Option<Vec<u8>> {
        match self.search_and_download(artist, title).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Artwork lookup failed for {} - {}: {}", artist, title, e);
                None
            }
        }
    }

    async fn search_and_download(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<Vec<u8>>, LookupError> {
        let term = urlencoding::encode(&format!("{artist} {title}")).into_owned();
        let url = format!("{}/search?term={}&limit=1", self.base_url, term);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: dto::SearchResponse = response.json().await?;
        if body.result_count == 0 {
            return Ok(None);
        }

        let Some(artwork_url) = body
            .results
            .first()
            .and_then(|r| r.artwork_url_100.as_deref())
            .filter(|u| !u.is_empty())
        else {
            return Ok(None);
        };

        let bytes = self.download_image(&high_res_variant(artwork_url)).await?;
        Ok(Some(bytes))
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, LookupError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Rewrite a thumbnail artwork URL to its high-resolution variant.
fn high_res_variant(url: &str) -> String {
    url.replace(THUMB_SIZE_TOKEN, HIRES_SIZE_TOKEN)
}
