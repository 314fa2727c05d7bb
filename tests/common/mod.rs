use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::MockServer;

use foodcourt_api::{config::AppConfig, supabase::SupabaseClient, AppState};

/// Test harness: the full route table wired to a mock upstream.
pub struct TestApp {
    router: Router,
    pub upstream: MockServer,
}

impl TestApp {
    pub async fn new() -> Self {
        let upstream = MockServer::start().await;
        let config = test_config(&upstream.uri());
        let supabase = Arc::new(
            SupabaseClient::from_config(&config).expect("failed to build upstream client"),
        );
        let router = foodcourt_api::app_routes(AppState::new(config, supabase));
        Self { router, upstream }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json_body) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(json_body.to_string()))
                    .expect("failed to build request")
            }
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router call failed");

        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json_body = serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}));
        (status, json_body)
    }
}

pub fn test_config(upstream_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: upstream_url.to_string(),
        supabase_service_role_key: Some("test-service-role-key".into()),
        supabase_anon_key: None,
        host: "127.0.0.1".into(),
        port: 18_080,
        environment: "test".into(),
        log_level: "debug".into(),
        log_json: false,
        cors_allowed_origins: None,
        upstream_timeout_secs: 5,
        allow_cross_user_operations: false,
        fallback_username: None,
        token_ttl_secs: 3600,
    }
}
