//! YouTube search digest crate.
//!
//! This crate provides:
//! - Credential configuration with placeholder-value detection
//! - An RFC 3339 watermark file for incremental polling
//! - OAuth token acquisition (out-of-band code flow) and refresh-with-persist
//! - A typed client for the YouTube Data v3 search endpoint
//! - HTML digest rendering and SMTP email dispatch

pub mod auth;
pub mod config;
pub mod digest;
pub mod pipeline;
pub mod watermark;
pub mod youtube;

// Re-export main types
pub use auth::{CodePrompt, OauthClient, StdinPrompt, StoredToken, TokenStore};
pub use config::{ConfigError, Credentials};
pub use digest::{DigestRecord, DigestRenderer, EmailSender};
pub use pipeline::{CycleSummary, Pipeline, PipelineConfig};
pub use watermark::Watermark;
pub use youtube::{SearchClient, SearchItem, SearchParams};
