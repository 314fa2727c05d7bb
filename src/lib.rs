//! Foodcourt API Library
//!
//! HTTP facade over a Supabase/PostgREST backend for a shared food court:
//! client credit accounts, menu catalog, variation assignments and orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod supabase;
pub mod tracing;

use std::sync::Arc;

use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::supabase::SupabaseClient;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub supabase: Arc<SupabaseClient>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(config: config::AppConfig, supabase: Arc<SupabaseClient>) -> Self {
        let services = handlers::AppServices::new(supabase.clone(), &config);
        Self {
            config,
            supabase,
            services,
        }
    }
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Foodcourt API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn api_status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Assemble the full route table. Middleware layers are applied by the
/// binary so tests can exercise the bare router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/api/status", get(api_status))
        .route(
            "/api/authkey",
            get(handlers::auth::login_get).post(handlers::auth::login_post),
        )
        .route(
            "/api/client/credit-topup",
            post(handlers::credit::mutate_credit),
        )
        .route(
            "/api/clients-crud",
            get(handlers::clients::get_clients)
                .post(handlers::clients::create_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/menu-items",
            get(handlers::menu_items::get_menu_items)
                .post(handlers::menu_items::create_menu_item)
                .put(handlers::menu_items::update_menu_item)
                .delete(handlers::menu_items::delete_menu_item),
        )
        .route(
            "/api/menu-categories",
            get(handlers::menu_categories::get_menu_categories)
                .post(handlers::menu_categories::create_menu_category)
                .put(handlers::menu_categories::update_menu_category)
                .delete(handlers::menu_categories::delete_menu_category),
        )
        .route(
            "/api/menu-item-variations",
            get(handlers::variations::get_variations)
                .post(handlers::variations::assign_variation)
                .delete(handlers::variations::unassign_variation),
        )
        .route(
            "/api/orders",
            get(handlers::orders::get_orders)
                .post(handlers::orders::create_order)
                .put(handlers::orders::update_order),
        )
        .route(
            "/api/tables",
            get(handlers::tables::get_tables)
                .post(handlers::tables::create_table)
                .put(handlers::tables::update_table)
                .delete(handlers::tables::delete_table),
        )
        .with_state(state)
}
