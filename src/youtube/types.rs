//! YouTube Data API search response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level search response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Result items for this page.
    #[serde(default)]
    pub items: Vec<SearchItem>,
    /// Present when more than one page exists. Not followed.
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// Paging metadata.
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

/// Paging metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: Option<i64>,
    #[serde(default)]
    pub results_per_page: Option<i64>,
}

/// A single search result.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: VideoId,
    pub snippet: Snippet,
}

impl SearchItem {
    /// Canonical watch URL for this video.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id.video_id)
    }
}

/// Video identifier wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoId {
    pub video_id: String,
}

/// Video metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Thumbnail variants by size.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// URL of the medium thumbnail, the size rendered into the digest.
    #[must_use]
    pub fn medium_url(&self) -> &str {
        self.medium.as_ref().map_or("", |t| t.url.as_str())
    }
}

/// A single thumbnail.
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}
