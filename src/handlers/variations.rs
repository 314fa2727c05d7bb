//! Variation catalog reads and per-item variation assignments.
//!
//! Assignments are scoped to a vendor username. Writes resolve the acting
//! username from the `x-username` header, the owner of the referenced menu
//! item, the bearer session token, or the configured fallback, in that order.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::token_from_headers;
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

pub const USERNAME_HEADER: &str = "x-username";

#[derive(Debug, Deserialize)]
pub struct VariationQuery {
    pub menu_item_id: Option<String>,
    pub variation_id: Option<String>,
}

pub async fn get_variations(
    State(state): State<AppState>,
    Query(query): Query<VariationQuery>,
) -> ApiResult<Value> {
    let rows = match trimmed(query.menu_item_id.as_deref()) {
        Some(menu_item_id) => state.services.catalog.list_assignments(menu_item_id).await?,
        None => state.services.catalog.list_variations().await?,
    };
    Ok(Json(ApiResponse::success(Value::Array(rows))))
}

pub async fn assign_variation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let menu_item_id = body
        .get("menu_item_id")
        .map(value_as_id)
        .transpose()?
        .ok_or_else(|| ServiceError::BadRequest("menu_item_id is required".into()))?;
    if body.get("variation_id").is_none() {
        return Err(ServiceError::BadRequest("variation_id is required".into()));
    }

    let header_username = headers
        .get(USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            body.get("username")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
    let token = token_from_headers(&headers);

    let username = state
        .services
        .catalog
        .resolve_username(
            header_username.as_deref(),
            Some(&menu_item_id),
            token.as_ref(),
        )
        .await?;

    let created = state
        .services
        .catalog
        .assign_variation(&username, body)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        created,
        "Variation assigned".to_string(),
    )))
}

pub async fn unassign_variation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<VariationQuery>,
) -> ApiResult<Value> {
    let menu_item_id = trimmed(query.menu_item_id.as_deref())
        .ok_or_else(|| ServiceError::BadRequest("menu_item_id is required".into()))?;
    let variation_id = trimmed(query.variation_id.as_deref())
        .ok_or_else(|| ServiceError::BadRequest("variation_id is required".into()))?;

    let header_username = headers
        .get(USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let token = token_from_headers(&headers);

    let username = state
        .services
        .catalog
        .resolve_username(header_username.as_deref(), Some(menu_item_id), token.as_ref())
        .await?;

    let deleted = state
        .services
        .catalog
        .unassign_variation(&username, menu_item_id, variation_id)
        .await?;
    let message = if deleted == 0 {
        "Variation assignment already removed".to_string()
    } else {
        "Variation unassigned".to_string()
    };
    Ok(Json(ApiResponse::success_with_message(
        Value::Null,
        message,
    )))
}

fn trimmed(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn value_as_id(value: &Value) -> Result<String, ServiceError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ServiceError::BadRequest(
            "menu_item_id must be a string or number".into(),
        )),
    }
}
