//! Order placement and retrieval.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::common::IdQuery;
use crate::errors::ServiceError;
use crate::models::order::CreateOrderRequest;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub id: Option<String>,
    pub client_username: Option<String>,
}

pub async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Value> {
    let id = query.id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let client = query
        .client_username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let orders = state.services.orders.list(id, client).await?;
    if id.is_some() {
        let order = orders
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;
        return Ok(Json(ApiResponse::success(order)));
    }
    Ok(Json(ApiResponse::success(Value::Array(orders))))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.orders.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            created,
            "Order created".to_string(),
        )),
    ))
}

pub async fn update_order(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let id = query.require_id()?;
    let updated = state.services.orders.update(id, body).await?;
    Ok(Json(ApiResponse::success(updated)))
}
