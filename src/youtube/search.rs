//! Authenticated search against the YouTube Data API.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};

use crate::auth::{OauthClient, StoredToken, TokenStore};

use super::types::{SearchItem, SearchResponse};

/// YouTube Data v3 search endpoint.
pub const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Search parameters for one poll.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Fixed search keyword.
    pub query: String,
    /// Page size. More results than this are silently not fetched.
    pub max_results: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: "emacs".to_string(),
            max_results: 50,
        }
    }
}

/// Search client that keeps the persisted token fresh.
///
/// Every refresh is written back to the token store before the search
/// proceeds, so the next run starts from the current refresh cycle.
pub struct SearchClient<'a> {
    http: Client,
    oauth: &'a OauthClient,
    store: &'a TokenStore,
    endpoint: String,
}

impl<'a> SearchClient<'a> {
    /// Create a client against the production endpoint.
    pub fn new(oauth: &'a OauthClient, store: &'a TokenStore) -> Result<Self> {
        Self::with_endpoint(oauth, store, SEARCH_URL.to_string())
    }

    /// Create a client against a custom endpoint (tests use a mock server).
    pub fn with_endpoint(
        oauth: &'a OauthClient,
        store: &'a TokenStore,
        endpoint: String,
    ) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            oauth,
            store,
            endpoint,
        })
    }

    /// Fetch videos published after `since`, newest first.
    ///
    /// Single page only: a `nextPageToken` in the response is logged, not
    /// followed. An empty item list is a valid outcome.
    pub async fn search(
        &self,
        token: &StoredToken,
        since: DateTime<Utc>,
        params: &SearchParams,
    ) -> Result<Vec<SearchItem>> {
        let mut token = token.clone();

        // Proactive refresh when we already know the access token is stale
        if token.is_expired(Utc::now()) {
            tracing::info!("Access token expired, refreshing");
            token = self.refresh_and_persist(&token).await?;
        }

        let response = self.request(&token, since, params).await?;

        // One retry after a refresh when the provider disagrees about expiry
        let response = if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("Search returned 401, refreshing token and retrying once");
            token = self.refresh_and_persist(&token).await?;
            self.request(&token, since, params).await?
        } else {
            response
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".into());
            return Err(anyhow!("search request failed ({status}): {body}"));
        }

        let decoded: SearchResponse = response
            .json()
            .await
            .context("failed to decode search response")?;

        if let Some(next) = &decoded.next_page_token {
            // Known single-page limitation; the narrow polling window keeps
            // result counts small in practice
            tracing::debug!(next_page_token = %next, "More results exist, not fetching");
        }

        tracing::info!(count = decoded.items.len(), "Search complete");
        Ok(decoded.items)
    }

    async fn request(
        &self,
        token: &StoredToken,
        since: DateTime<Utc>,
        params: &SearchParams,
    ) -> Result<reqwest::Response> {
        let published_after = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = params.max_results.to_string();

        self.http
            .get(&self.endpoint)
            .bearer_auth(&token.access_token)
            .query(&[
                ("part", "snippet"),
                ("order", "date"),
                ("publishedAfter", published_after.as_str()),
                ("q", params.query.as_str()),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .context("search request failed")
    }

    async fn refresh_and_persist(&self, token: &StoredToken) -> Result<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| anyhow!("access token expired and no refresh token is stored"))?;

        let refreshed = self.oauth.refresh(refresh_token).await?;
        self.store
            .save(&refreshed)
            .context("failed to persist refreshed token")?;
        Ok(refreshed)
    }
}
