//! Credential configuration for the digest run.
//!
//! Credentials live in a single JSON file under the config directory and are
//! owned by the user; this module only ever reads it. The field names match
//! the original config file contract exactly.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name of the credentials document inside the config directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Sentinel client ID shipped in the config template.
pub const PLACEHOLDER_CLIENT_ID: &str = "YOUR-CLIENTID";

/// Sentinel client secret shipped in the config template.
pub const PLACEHOLDER_CLIENT_SECRET: &str = "YOUR-CLIENTSECRET";

/// API client identity and SMTP settings, loaded once per run.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// OAuth client ID.
    #[serde(rename = "clientID")]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    /// SMTP server hostname.
    #[serde(rename = "smtpHost")]
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(rename = "smtpPort")]
    pub smtp_port: u16,
    /// SMTP username, also used as sender and recipient address.
    #[serde(rename = "smtpUserName")]
    pub smtp_username: String,
    /// SMTP password (app password for Gmail-style providers).
    #[serde(rename = "smtpPassword")]
    pub smtp_password: String,
}

/// Errors from loading the credentials file.
///
/// `Missing` and `Placeholder` are user-setup conditions: the CLI maps them
/// to an instructive message and exit code 1 before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no credentials file at {path}")]
    Missing { path: PathBuf },

    #[error("malformed credentials file at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("credentials file at {path} still contains placeholder values")]
    Placeholder { path: PathBuf },

    #[error("failed to read credentials file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Credentials {
    /// Load credentials from `<config_dir>/credentials.json`.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CREDENTIALS_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing { path });
            }
            Err(e) => return Err(ConfigError::Io { path, source: e }),
        };

        let creds: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Malformed {
                path: path.clone(),
                source: e,
            })?;

        if creds.client_id == PLACEHOLDER_CLIENT_ID
            || creds.client_secret == PLACEHOLDER_CLIENT_SECRET
        {
            return Err(ConfigError::Placeholder { path });
        }

        Ok(creds)
    }
}

/// Resolve the default config directory: `~/.config/youtube-digest`.
pub fn default_config_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not resolve home directory"))?;
    Ok(home.join(".config").join("youtube-digest"))
}

/// Create the config directory (and parents) if missing, owner-only on Unix.
pub fn ensure_config_dir(dir: &Path) -> anyhow::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("failed to create config directory {}: {e}", dir.display()))?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, Permissions::from_mode(0o700))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_credentials(dir: &Path, client_id: &str, client_secret: &str) {
        let json = format!(
            r#"{{
                "clientID": "{client_id}",
                "clientSecret": "{client_secret}",
                "smtpHost": "smtp.example.com",
                "smtpPort": 587,
                "smtpUserName": "digest@example.com",
                "smtpPassword": "hunter2"
            }}"#
        );
        std::fs::write(dir.join(CREDENTIALS_FILE), json).unwrap();
    }

    #[test]
    fn test_load_valid_credentials() {
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "real-id", "real-secret");

        let creds = Credentials::load(dir.path()).unwrap();
        assert_eq!(creds.client_id, "real-id");
        assert_eq!(creds.smtp_port, 587);
        assert_eq!(creds.smtp_username, "digest@example.com");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_placeholder_client_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), PLACEHOLDER_CLIENT_ID, "real-secret");

        let err = Credentials::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { .. }));
    }

    #[test]
    fn test_placeholder_client_secret_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "real-id", PLACEHOLDER_CLIENT_SECRET);

        let err = Credentials::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CREDENTIALS_FILE), "{not json").unwrap();

        let err = Credentials::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_ensure_config_dir_creates_parents() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        ensure_config_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Idempotent on an existing directory
        ensure_config_dir(&nested).unwrap();
    }
}
