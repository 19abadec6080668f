//! iTunes Search API Data Transfer Objects
//!
//! The search endpoint returns a result count and a list of matches whose
//! `artworkUrl100` field points at a 100x100 thumbnail. Higher resolutions
//! are reachable by rewriting the size token in that URL.
//!
//! API Reference: https://performance-partners.apple.com/search-api

use serde::Deserialize;

/// Top-level search response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Number of matches
    #[serde(rename = "resultCount", default)]
    pub result_count: u32,
    /// Matches, possibly empty
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single search match
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    /// URL of the 100x100 artwork thumbnail
    #[serde(rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
}
