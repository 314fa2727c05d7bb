//! Menu category CRUD. Deletes are idempotent.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use super::common::IdQuery;
use crate::{ApiResponse, ApiResult, AppState};

pub async fn get_menu_categories(State(state): State<AppState>) -> ApiResult<Value> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(Json(ApiResponse::success(Value::Array(categories))))
}

pub async fn create_menu_category(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let created = state.services.catalog.create_category(body).await?;
    Ok(Json(ApiResponse::success_with_message(
        created,
        "Category created".to_string(),
    )))
}

pub async fn update_menu_category(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let updated = state.services.catalog.update_category(id, body).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_menu_category(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let deleted = state.services.catalog.delete_category(id).await?;
    let message = if deleted == 0 {
        "Category already deleted".to_string()
    } else {
        "Category deleted".to_string()
    };
    Ok(Json(ApiResponse::success_with_message(
        Value::Null,
        message,
    )))
}
