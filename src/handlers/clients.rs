//! Client record CRUD keyed by query parameter.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use super::common::IdQuery;
use crate::{ApiResponse, ApiResult, AppState};

pub async fn get_clients(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    match query.id() {
        Some(id) => {
            let client = state.services.clients.get(id).await?;
            Ok(Json(ApiResponse::success(client)))
        }
        None => {
            let clients = state.services.clients.list().await?;
            Ok(Json(ApiResponse::success(Value::Array(clients))))
        }
    }
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let created = state.services.clients.create(body).await?;
    Ok(Json(ApiResponse::success_with_message(
        created,
        "Client created".to_string(),
    )))
}

pub async fn update_client(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let updated = state.services.clients.update(id, body).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let deleted = state.services.clients.delete(id).await?;
    let message = if deleted == 0 {
        "Client already deleted".to_string()
    } else {
        "Client deleted".to_string()
    };
    Ok(Json(ApiResponse::success_with_message(
        Value::Null,
        message,
    )))
}
