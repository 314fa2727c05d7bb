//! Username-only login issuing a base64 session token.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::SessionToken;
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AuthKeyRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthKeyQuery {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthKeyResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub expires_at: i64,
    pub client: Value,
}

pub async fn login_get(
    State(state): State<AppState>,
    Query(query): Query<AuthKeyQuery>,
) -> ApiResult<AuthKeyResponse> {
    let username = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("username is required".into()))?;
    issue_token(&state, username).await
}

pub async fn login_post(
    State(state): State<AppState>,
    Json(body): Json<AuthKeyRequest>,
) -> ApiResult<AuthKeyResponse> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ServiceError::BadRequest("username is required".into()));
    }
    issue_token(&state, username).await
}

async fn issue_token(state: &AppState, username: &str) -> ApiResult<AuthKeyResponse> {
    let located = state.services.clients.find_by_username(username).await?;
    let role = located
        .row
        .get("role")
        .or_else(|| located.row.get("ROLE"))
        .and_then(Value::as_str)
        .unwrap_or("client")
        .to_string();

    let token = SessionToken::issue(username, &role, state.config.token_ttl_secs);
    let encoded = token.encode()?;

    Ok(Json(ApiResponse::success(AuthKeyResponse {
        token: encoded,
        username: username.to_string(),
        role,
        expires_at: token.expires_at,
        client: located.row,
    })))
}
