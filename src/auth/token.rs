//! Persisted OAuth token.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the token inside the config directory.
pub const TOKEN_FILE: &str = "token.json";

/// OAuth token payload persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
}

impl StoredToken {
    /// Whether the access token has expired as of `now`.
    ///
    /// A token without an expiry is treated as still valid; the 401 retry
    /// path catches the ones that lied.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Errors from loading the token file.
#[derive(Debug, Error)]
pub enum TokenError {
    /// First-run signal: no token has been persisted yet.
    #[error("no token file at {path}")]
    NotFound { path: PathBuf },

    /// The file exists but cannot be decoded. Deleting it forces a fresh
    /// interactive authorization.
    #[error("malformed token file at {path} (delete it to re-authorize): {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read token file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load/save access for the token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store for the token inside `config_dir`.
    #[must_use]
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(TOKEN_FILE),
        }
    }

    /// Load the persisted token.
    pub fn load(&self) -> Result<StoredToken, TokenError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TokenError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(TokenError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| TokenError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Persist the token, overwriting any prior content.
    pub fn save(&self, token: &StoredToken) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(token)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content).map_err(|e| {
            anyhow::anyhow!("failed to write token file {}: {e}", self.path.display())
        })?;
        tracing::debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
