mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, _) = app.request(Method::GET, "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.upstream)
        .await;
    let (status, body) = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ready"));
}

#[tokio::test]
async fn clients_crud_round() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .and(query_param("id", "eq.3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 3, "username": "alice" }])),
        )
        .mount(&app.upstream)
        .await;
    let (status, body) = app
        .request(Method::GET, "/api/clients-crud?id=3", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], json!("alice"));

    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_partial_json(json!({ "username": "newbie" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([{ "id": 4, "username": "newbie" }])),
        )
        .mount(&app.upstream)
        .await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/clients-crud",
            Some(json!({ "username": "newbie" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(4));

    Mock::given(method("PATCH"))
        .and(path("/clients"))
        .and(query_param("id", "eq.4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 4, "username": "renamed" }])),
        )
        .mount(&app.upstream)
        .await;
    let (status, body) = app
        .request(
            Method::PUT,
            "/api/clients-crud?id=4",
            Some(json!({ "username": "renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], json!("renamed"));

    Mock::given(method("DELETE"))
        .and(path("/clients"))
        .and(query_param("id", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 4 }])))
        .mount(&app.upstream)
        .await;
    let (status, body) = app
        .request(Method::DELETE, "/api/clients-crud?id=4", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Client deleted"));
}

#[tokio::test]
async fn update_without_id_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::PUT, "/api/clients-crud", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("query parameter 'id'"));
}

#[tokio::test]
async fn deleting_a_missing_category_still_succeeds() {
    let app = TestApp::new().await;

    Mock::given(method("DELETE"))
        .and(path("/menu_categories"))
        .and(query_param("id", "eq.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.upstream)
        .await;

    let (status, body) = app
        .request(Method::DELETE, "/api/menu-categories?id=99", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Category already deleted"));
}

#[tokio::test]
async fn menu_items_can_be_filtered_by_category_and_username() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/menu_items"))
        .and(query_param("category_id", "eq.2"))
        .and(query_param("username", "eq.vendor1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 11, "name": "Pad Thai", "category_id": 2, "username": "vendor1" },
        ])))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let (status, body) = app
        .request(
            Method::GET,
            "/api/menu-items?category_id=2&username=vendor1",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], json!("Pad Thai"));
}

#[tokio::test]
async fn authkey_issues_token_for_known_client() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .and(query_param("username", "eq.alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "username": "alice",
            "role": "admin",
            "credits": "100",
        }])))
        .mount(&app.upstream)
        .await;

    let (status, body) = app
        .request(Method::GET, "/api/authkey?username=alice", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["username"], json!("alice"));
    assert_eq!(data["role"], json!("admin"));
    assert!(!data["token"].as_str().unwrap_or_default().is_empty());

    // The token decodes back to the same identity.
    let token = foodcourt_api::auth::SessionToken::decode(data["token"].as_str().unwrap())
        .expect("issued token should decode");
    assert_eq!(token.username, "alice");
    assert_eq!(token.role, "admin");
}

#[tokio::test]
async fn variation_assignment_resolves_owner_from_menu_item() {
    let app = TestApp::new().await;

    // No x-username header and no token: ownership comes from the item row.
    Mock::given(method("GET"))
        .and(path("/menu_items"))
        .and(query_param("id", "eq.11"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 11, "username": "vendor1" }])),
        )
        .mount(&app.upstream)
        .await;

    Mock::given(method("POST"))
        .and(path("/menu_item_variations"))
        .and(body_partial_json(json!({
            "menu_item_id": 11,
            "variation_id": 5,
            "username": "vendor1",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 77,
            "menu_item_id": 11,
            "variation_id": 5,
            "username": "vendor1",
        }])))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/menu-item-variations",
            Some(json!({ "menu_item_id": 11, "variation_id": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], json!("vendor1"));
}

#[tokio::test]
async fn variation_assignment_without_any_owner_is_rejected() {
    let app = TestApp::new().await;

    // The referenced item has no owner column and no fallback is configured.
    Mock::given(method("GET"))
        .and(path("/menu_items"))
        .and(query_param("id", "eq.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 12 }])))
        .mount(&app.upstream)
        .await;

    let (status, _body) = app
        .request(
            Method::POST,
            "/api/menu-item-variations",
            Some(json!({ "menu_item_id": 12, "variation_id": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_errors_are_sanitized() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/menu_categories"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "42P01",
            "message": "relation \"public.menu_categories\" does not exist",
        })))
        .mount(&app.upstream)
        .await;

    let (status, body) = app
        .request(Method::GET, "/api/menu-categories", None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("status 500"));
    assert!(!message.contains("relation"));
    assert!(!message.contains("menu_categories"));
}
