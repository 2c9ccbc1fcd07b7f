//! Interactive authorization-code flow against Google's OAuth endpoints.
//!
//! The flow is out-of-band: the consent page displays the code and the user
//! pastes it on stdin. No local callback server.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::token::{StoredToken, TokenError, TokenStore};

/// Google authorization endpoint.
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google token endpoint.
pub const TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// Read-only access to the YouTube Data API.
pub const YOUTUBE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

/// Out-of-band redirect sentinel: the consent page shows the code to the user.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Source of the pasted authorization code.
///
/// Production blocks on stdin; tests substitute a scripted provider.
pub trait CodePrompt {
    fn read_code(&self) -> Result<String>;
}

/// Reads the authorization code from standard input.
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn read_code(&self) -> Result<String> {
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("failed to read authorization code from stdin")?;
        let code = line.trim().to_string();
        if code.is_empty() {
            return Err(anyhow!("no authorization code entered"));
        }
        Ok(code)
    }
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Convert to the persisted form, keeping a prior refresh token if the
    /// response omitted one (Google only returns it on the first exchange).
    fn into_stored(self, now: DateTime<Utc>, prior_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(prior_refresh),
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            token_type: self.token_type,
        }
    }
}

/// OAuth client for the authorization-code and refresh grants.
pub struct OauthClient {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    http: Client,
}

impl OauthClient {
    /// Create a client against the Google endpoints.
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        Self::with_endpoints(
            client_id,
            client_secret,
            AUTH_URL.to_string(),
            TOKEN_URL.to_string(),
        )
    }

    /// Create a client against custom endpoints (tests point this at a mock
    /// server).
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        auth_url: String,
        token_url: String,
    ) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            client_id,
            client_secret,
            auth_url,
            token_url,
            http,
        })
    }

    /// Build the consent-page URL for an offline-access code grant.
    pub fn authorize_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.auth_url).context("invalid authorization endpoint")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", OOB_REDIRECT_URI)
            .append_pair("response_type", "code")
            .append_pair("scope", YOUTUBE_READONLY_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("state", "state");
        Ok(url.into())
    }

    /// Exchange an authorization code for a token. A failure here is fatal
    /// for the run; there is no retry.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredToken> {
        let now = Utc::now();
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", OOB_REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .context("token exchange request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".into());
            return Err(anyhow!("token exchange failed ({status}): {body}"));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("failed to decode token exchange response")?;
        Ok(token.into_stored(now, None))
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<StoredToken> {
        let now = Utc::now();
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .context("token refresh request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".into());
            return Err(anyhow!("token refresh failed ({status}): {body}"));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("failed to decode token refresh response")?;
        Ok(token.into_stored(now, Some(refresh_token.to_string())))
    }
}

/// Load the persisted token, driving the interactive flow if none exists.
///
/// A malformed token file is fatal rather than a re-auth trigger: the error
/// names the file so the operator can delete it deliberately.
pub async fn ensure_token(
    oauth: &OauthClient,
    store: &TokenStore,
    prompt: &dyn CodePrompt,
) -> Result<StoredToken> {
    match store.load() {
        Ok(token) => Ok(token),
        Err(TokenError::NotFound { .. }) => reauthorize(oauth, store, prompt).await,
        Err(e) => Err(e.into()),
    }
}

/// Drive the interactive flow unconditionally and persist the result,
/// replacing any existing token (account switch, scope revocation).
pub async fn reauthorize(
    oauth: &OauthClient,
    store: &TokenStore,
    prompt: &dyn CodePrompt,
) -> Result<StoredToken> {
    let token = interactive_authorize(oauth, prompt).await?;
    store.save(&token)?;
    Ok(token)
}

/// Drive one pass of the interactive consent flow.
async fn interactive_authorize(
    oauth: &OauthClient,
    prompt: &dyn CodePrompt,
) -> Result<StoredToken> {
    let url = oauth.authorize_url()?;

    println!("Visit the URL below, grant access, then paste the code here:");
    println!("{url}\n");

    // Opening the browser is a convenience; the URL is already printed
    if let Err(e) = webbrowser::open(&url) {
        tracing::debug!(error = %e, "Could not open browser, continue manually");
    }

    print!("Authorization code: ");
    use std::io::Write as _;
    let _ = std::io::stdout().flush();

    let code = prompt.read_code()?;
    tracing::info!("Exchanging authorization code for token");
    oauth.exchange_code(&code).await
}
