//! Digest pipeline - orchestrates the config, watermark, token, search,
//! render, email sequence of one run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};

use crate::auth::{ensure_token, CodePrompt, OauthClient, TokenStore, AUTH_URL, TOKEN_URL};
use crate::config::{self, Credentials};
use crate::digest::{DigestRenderer, EmailSender, DIGEST_SUBJECT};
use crate::watermark::Watermark;
use crate::youtube::{SearchClient, SearchParams, SEARCH_URL};

/// Configuration for one digest cycle.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the credentials, watermark and token files.
    pub config_dir: PathBuf,
    /// Search keyword.
    pub query: String,
    /// Page size for the search call.
    pub max_results: u32,
    /// Search endpoint (tests point this at a mock server).
    pub search_endpoint: String,
    /// Token endpoint (tests point this at a mock server).
    pub token_endpoint: String,
}

impl PipelineConfig {
    /// Configuration against the production endpoints.
    #[must_use]
    pub fn new(config_dir: PathBuf, query: String, max_results: u32) -> Self {
        Self {
            config_dir,
            query,
            max_results,
            search_endpoint: SEARCH_URL.to_string(),
            token_endpoint: TOKEN_URL.to_string(),
        }
    }
}

/// Result of a single digest cycle.
#[derive(Debug)]
pub struct CycleSummary {
    /// Number of videos the search returned.
    pub fetched: usize,
    /// Whether a digest email was sent.
    pub emailed: bool,
    /// The watermark committed at the end of the run (RFC 3339).
    pub watermark: String,
}

/// Digest pipeline orchestrator.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    prompt: &'a dyn CodePrompt,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline. The prompt is only consulted when no token has
    /// been persisted yet.
    #[must_use]
    pub fn new(config: PipelineConfig, prompt: &'a dyn CodePrompt) -> Self {
        Self { config, prompt }
    }

    /// Run one strictly linear digest cycle.
    ///
    /// The watermark is committed last, and only when everything before it
    /// succeeded: a failed run leaves it untouched and the next scheduled
    /// invocation re-polls the same window.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        let run_start = Utc::now();

        config::ensure_config_dir(&self.config.config_dir)?;
        let creds = Credentials::load(&self.config.config_dir)?;
        tracing::debug!(dir = %self.config.config_dir.display(), "Loaded credentials");

        let watermark = Watermark::new(&self.config.config_dir);
        let (since, just_created) = watermark.load_or_init(run_start)?;
        tracing::info!(
            since = %since.to_rfc3339(),
            first_run = just_created,
            "Polling for videos published after watermark"
        );

        let oauth = OauthClient::with_endpoints(
            creds.client_id.clone(),
            creds.client_secret.clone(),
            AUTH_URL.to_string(),
            self.config.token_endpoint.clone(),
        )?;
        let store = TokenStore::new(&self.config.config_dir);
        let token = ensure_token(&oauth, &store, self.prompt).await?;

        let params = SearchParams {
            query: self.config.query.clone(),
            max_results: self.config.max_results,
        };
        let search =
            SearchClient::with_endpoint(&oauth, &store, self.config.search_endpoint.clone())?;
        let items = search.search(&token, since, &params).await?;

        let emailed = if items.is_empty() {
            tracing::info!("No new videos, skipping email");
            false
        } else {
            let renderer = DigestRenderer::new()?;
            let html = renderer.render(&items)?;

            let sender = EmailSender::new(&creds);
            sender
                .send(DIGEST_SUBJECT, html)
                .await
                .context("digest dispatch failed")?;
            true
        };

        // Search and dispatch both succeeded; the watermark may advance
        watermark.commit(run_start)?;

        Ok(CycleSummary {
            fetched: items.len(),
            emailed,
            watermark: run_start.to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}
