//! OAuth token lifecycle: acquire interactively, persist, reuse, refresh.

mod flow;
mod token;

pub use flow::{
    ensure_token, reauthorize, CodePrompt, OauthClient, StdinPrompt, AUTH_URL, OOB_REDIRECT_URI,
    TOKEN_URL, YOUTUBE_READONLY_SCOPE,
};
pub use token::{StoredToken, TokenError, TokenStore, TOKEN_FILE};
