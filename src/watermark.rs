//! Poll watermark tracking.
//!
//! A single RFC 3339 timestamp file marks the boundary between already-seen
//! and not-yet-seen videos. The watermark only advances after a fully
//! successful cycle, so a failed run re-polls the same window (at-least-once:
//! a video may be reported twice, never silently dropped).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// File name of the watermark inside the config directory.
pub const WATERMARK_FILE: &str = "timestamp";

/// Safety margin subtracted on first run, tolerating clock skew and
/// late-indexed items.
pub const FIRST_RUN_LOOKBACK_DAYS: i64 = 2;

/// Handle to the watermark file.
#[derive(Debug, Clone)]
pub struct Watermark {
    path: PathBuf,
}

impl Watermark {
    /// Create a handle for the watermark inside `config_dir`.
    #[must_use]
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(WATERMARK_FILE),
        }
    }

    /// Load the watermark, initializing it to `now - 2 days` on first run.
    ///
    /// Returns the watermark value and whether the file was just created.
    /// An existing file with unparseable contents is fatal.
    pub fn load_or_init(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, bool)> {
        // Exclusive create doubles as the first-run check
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                let initial = now - Duration::days(FIRST_RUN_LOOKBACK_DAYS);
                file.write_all(format_rfc3339(initial).as_bytes())
                    .with_context(|| {
                        format!("failed to write initial watermark to {}", self.path.display())
                    })?;
                tracing::info!(
                    path = %self.path.display(),
                    watermark = %format_rfc3339(initial),
                    "No watermark file, initialized to two days ago"
                );
                Ok((initial, true))
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let content = std::fs::read_to_string(&self.path).with_context(|| {
                    format!("failed to read watermark file {}", self.path.display())
                })?;
                let parsed = DateTime::parse_from_rfc3339(content.trim())
                    .with_context(|| {
                        format!(
                            "watermark file {} does not contain an RFC 3339 timestamp",
                            self.path.display()
                        )
                    })?
                    .with_timezone(&Utc);
                Ok((parsed, false))
            }
            Err(e) => Err(e).with_context(|| {
                format!("failed to create watermark file {}", self.path.display())
            }),
        }
    }

    /// Overwrite the watermark with the run's start time.
    ///
    /// Committing the start time, not "now", avoids missing videos published
    /// while the run itself was executing. Call only after the search and the
    /// digest dispatch both succeeded.
    pub fn commit(&self, run_start: DateTime<Utc>) -> Result<()> {
        std::fs::write(&self.path, format_rfc3339(run_start)).with_context(|| {
            format!("failed to commit watermark to {}", self.path.display())
        })?;
        tracing::debug!(
            path = %self.path.display(),
            watermark = %format_rfc3339(run_start),
            "Committed watermark"
        );
        Ok(())
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// RFC 3339 at second precision, matching the stored format.
fn format_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
