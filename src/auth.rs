//! Session tokens for the admin UI.
//!
//! Tokens are base64-encoded JSON, not signed JWTs; they gate convenience
//! features (username resolution on variation assignment), never data the
//! upstream would not already allow through its own key checks.

use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionToken {
    pub username: String,
    pub role: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl SessionToken {
    pub fn issue(username: impl Into<String>, role: impl Into<String>, ttl_secs: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            username: username.into(),
            role: role.into(),
            issued_at: now,
            expires_at: now + ttl_secs as i64,
        }
    }

    pub fn encode(&self) -> Result<String, ServiceError> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64.encode(json))
    }

    pub fn decode(raw: &str) -> Result<Self, ServiceError> {
        let bytes = BASE64
            .decode(raw.trim())
            .map_err(|_| ServiceError::Unauthorized("malformed session token".into()))?;
        let token: SessionToken = serde_json::from_slice(&bytes)
            .map_err(|_| ServiceError::Unauthorized("malformed session token".into()))?;
        if token.expires_at < Utc::now().timestamp() {
            return Err(ServiceError::Unauthorized("session token expired".into()));
        }
        Ok(token)
    }
}

/// Pull a decoded session token out of an `Authorization: Bearer` header,
/// if one is present and valid. Invalid tokens read as absent so the
/// resolution chain can fall through to its next strategy.
pub fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let raw = value.strip_prefix("Bearer ").unwrap_or(value);
    SessionToken::decode(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn round_trip() {
        let token = SessionToken::issue("alice", "admin", 3600);
        let encoded = token.encode().unwrap();
        let decoded = SessionToken::decode(&encoded).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut token = SessionToken::issue("alice", "admin", 3600);
        token.expires_at = Utc::now().timestamp() - 10;
        let encoded = token.encode().unwrap();
        assert_matches!(
            SessionToken::decode(&encoded),
            Err(ServiceError::Unauthorized(_))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_matches!(
            SessionToken::decode("not-base64!!"),
            Err(ServiceError::Unauthorized(_))
        );
    }

    #[test]
    fn header_extraction_strips_bearer_prefix() {
        let token = SessionToken::issue("bob", "client", 3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", token.encode().unwrap()).parse().unwrap(),
        );
        assert_eq!(token_from_headers(&headers).unwrap().username, "bob");
    }

    #[test]
    fn invalid_header_reads_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer junk".parse().unwrap());
        assert!(token_from_headers(&headers).is_none());
    }
}
