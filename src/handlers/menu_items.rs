//! Menu item CRUD.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::common::IdQuery;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct MenuItemQuery {
    pub id: Option<String>,
    pub category_id: Option<String>,
    pub username: Option<String>,
}

pub async fn get_menu_items(
    State(state): State<AppState>,
    Query(query): Query<MenuItemQuery>,
) -> ApiResult<Value> {
    if let Some(id) = query.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let item = state.services.catalog.get_item(id).await?;
        return Ok(Json(ApiResponse::success(item)));
    }

    let items = state
        .services
        .catalog
        .list_items(query.category_id.as_deref(), query.username.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Value::Array(items))))
}

pub async fn create_menu_item(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let created = state.services.catalog.create_item(body).await?;
    Ok(Json(ApiResponse::success_with_message(
        created,
        "Menu item created".to_string(),
    )))
}

pub async fn update_menu_item(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let updated = state.services.catalog.update_item(id, body).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_menu_item(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let deleted = state.services.catalog.delete_item(id).await?;
    let message = if deleted == 0 {
        "Menu item already deleted".to_string()
    } else {
        "Menu item deleted".to_string()
    };
    Ok(Json(ApiResponse::success_with_message(
        Value::Null,
        message,
    )))
}
