//! Dining table CRUD.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use super::common::IdQuery;
use crate::{ApiResponse, ApiResult, AppState};

pub async fn get_tables(State(state): State<AppState>) -> ApiResult<Value> {
    let tables = state.services.orders.list_tables().await?;
    Ok(Json(ApiResponse::success(Value::Array(tables))))
}

pub async fn create_table(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let created = state.services.orders.create_table(body).await?;
    Ok(Json(ApiResponse::success_with_message(
        created,
        "Table created".to_string(),
    )))
}

pub async fn update_table(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let updated = state.services.orders.update_table(id, body).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_table(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let deleted = state.services.orders.delete_table(id).await?;
    let message = if deleted == 0 {
        "Table already deleted".to_string()
    } else {
        "Table deleted".to_string()
    };
    Ok(Json(ApiResponse::success_with_message(
        Value::Null,
        message,
    )))
}
