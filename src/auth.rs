//! Authentication gate turning an `authorization` header into a caller identity.
//!
//! Verification is pluggable through [`TokenVerifier`]. Without configuration the service
//! runs with [`RejectAll`], so every protected request fails closed.

use std::{collections::HashMap, sync::Arc};

use axum::http::HeaderValue;
use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

/// Identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    /// Stable user identifier, used as game owner.
    pub uid: String,
    /// Contact email of the user.
    pub email: String,
}

/// Reasons a request is refused by the authentication gate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No usable credential was sent.
    #[error("missing authorization header")]
    MissingCredential,
    /// The credential was not accepted by the verifier.
    #[error("invalid token")]
    InvalidToken,
    /// No verifier is configured, every token is refused.
    #[error("token verification is not configured")]
    NotConfigured,
}

/// Resolves a bearer token into the identity it was issued for.
pub trait TokenVerifier: Send + Sync {
    /// Resolve `token` (already stripped of any `Bearer ` prefix) or reject it.
    fn verify(&self, token: &str) -> BoxFuture<'static, Result<Identity, AuthError>>;
}

/// Verifier refusing every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl TokenVerifier for RejectAll {
    fn verify(&self, _token: &str) -> BoxFuture<'static, Result<Identity, AuthError>> {
        Box::pin(async { Err(AuthError::NotConfigured) })
    }
}

/// Verifier backed by a fixed token table, meant for development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: Arc<HashMap<String, Identity>>,
}

impl StaticTokenVerifier {
    /// Build the table from `(token, identity)` pairs; a repeated token keeps its last identity.
    pub fn new(tokens: impl IntoIterator<Item = (String, Identity)>) -> Self {
        Self {
            tokens: Arc::new(tokens.into_iter().collect()),
        }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> BoxFuture<'static, Result<Identity, AuthError>> {
        let identity = self.tokens.get(token).cloned();
        Box::pin(async move { identity.ok_or(AuthError::InvalidToken) })
    }
}

/// Extract the token from an `authorization` header value, accepting an optional
/// `Bearer ` scheme prefix.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let raw = header
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if raw.eq_ignore_ascii_case("bearer") => "",
        _ => raw,
    };

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}
