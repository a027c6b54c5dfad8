//! Router-level tests driving the full API through `tower::ServiceExt`.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use og_server::api::{AppState, create_router};
use order_grab::{
    auth::AuthManager, ledger::LedgerManager, rules::RuleManager, store::JsonStore,
    store::StoreConfig, task::TaskEngine, user::UserManager,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonStore::new(StoreConfig::with_dir(dir.path())));
    store.init().await.unwrap();

    let users = Arc::new(UserManager::load(store.clone()).await.unwrap());
    let rules = Arc::new(RuleManager::load(store.clone()).await.unwrap());
    let ledger = Arc::new(LedgerManager::load(store.clone(), users.clone()).await.unwrap());
    let auth = Arc::new(
        AuthManager::load(store.clone(), "test_pepper".into(), "test_jwt_secret".into())
            .await
            .unwrap(),
    );
    let engine = TaskEngine::new(users.clone(), rules.clone());

    let state = AppState {
        store,
        users,
        rules,
        engine,
        ledger,
        auth,
    };
    (dir, create_router(state))
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({"username": "admin", "password": "Admin12345"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["accessToken"].as_str().unwrap().to_string()
}

async fn register_user(app: &Router, username: &str) -> String {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({"username": username})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["user"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = test_app().await;
    let (status, body) = request_json(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], true);
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let (_dir, app) = test_app().await;

    let (status, _) = request_json(&app, "GET", "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request_json(&app, "GET", "/api/admin/users", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token(&app).await;
    let (status, body) = request_json(&app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn admin_login_rejects_bad_password() {
    let (_dir, app) = test_app().await;
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({"username": "admin", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn task_grab_and_settle_round_trip() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "alice").await;

    // Fund the account through an admin balance patch
    let (status, _) = request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": 50.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Grab
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let task = &body["task"];
    let task_id = task["id"].as_str().unwrap().to_string();
    let amount = task["orderAmount"].as_f64().unwrap();
    assert!((10.0..=37.5).contains(&amount), "amount {amount}");

    // A second grab re-serves the same pending task
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unpaid"], true);
    assert_eq!(body["task"]["id"], task_id.as_str());

    // Settle
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/submit",
        None,
        Some(json!({"userId": user_id, "taskId": task_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["summary"]["completedToday"], 1);
    assert_eq!(body["summary"]["task"]["id"], task_id.as_str());

    // Progress reflects the settlement, flat alongside `ok`
    let (status, body) = request_json(
        &app,
        "GET",
        &format!("/api/progress?userId={user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completedToday"], 1);
    assert_eq!(body["totalCompleted"], 1);
    assert!(body["unpaidTask"].is_null());
    assert!(body["balance"].as_f64().unwrap() > 50.0);
}

#[tokio::test]
async fn submit_underfunded_task_prompts_recharge() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "bob").await;

    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": 40.0})),
    )
    .await;

    let (_, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    // Drain the balance below the order amount
    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": -39.0})),
    )
    .await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/submit",
        None,
        Some(json!({"userId": user_id, "taskId": task_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["needRecharge"], true);
    assert!(body["deficit"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn unknown_user_maps_to_404_and_frozen_to_403() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": "missing", "store": "amazon"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let user_id = register_user(&app, "carol").await;
    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"frozen": true})),
    )
    .await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "account_frozen");
}

#[tokio::test]
async fn inject_rule_flow_through_api() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "dave").await;
    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": 200.0})),
    )
    .await;

    // Create + confirm a rule for task #1
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/admin/inject-rules",
        Some(&token),
        Some(json!({"userId": user_id, "taskNo": 1, "amountSpec": "80-95", "percent": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rule_id = body["rule"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["rule"]["status"], "new");

    let (status, _) = request_json(
        &app,
        "PATCH",
        &format!("/api/admin/inject-rules/{rule_id}"),
        Some(&token),
        Some(json!({"action": "confirm"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    let amount = body["task"]["orderAmount"].as_f64().unwrap();
    assert!((80.0..=95.0).contains(&amount), "amount {amount}");
    assert_eq!(body["task"]["kind"], "combine");
    assert!((body["task"]["commissionRate"].as_f64().unwrap() - 0.12).abs() < 1e-9);

    // Rule consumed
    let (_, body) =
        request_json(&app, "GET", "/api/admin/inject-rules", Some(&token), None).await;
    assert_eq!(body["rules"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn tier_rejection_flags_not_eligible() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "hana").await;
    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": 600.0})),
    )
    .await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["notEligible"], true);
    assert_eq!(body["suggested"], "alibaba");
    assert!(body["task"].is_null());
}

#[tokio::test]
async fn incomplete_marks_pending_task_unpaid() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "ivan").await;
    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": 50.0})),
    )
    .await;

    let (_, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "amazon"})),
    )
    .await;
    let task = body["task"].clone();
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/incomplete",
        None,
        Some(json!({"userId": user_id, "task": task})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["unpaid"], true);
    assert_eq!(body["task"]["id"], task_id.as_str());
}

#[tokio::test]
async fn deposit_moderation_flow() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "erin").await;

    // Pool an address
    let (status, _) = request_json(
        &app,
        "POST",
        "/api/admin/addresses",
        Some(&token),
        Some(json!({"address": "TXYZdepositAddr1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Request a deposit
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/wallet/deposit",
        None,
        Some(json!({"userId": user_id, "amount": 500.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["address"], "TXYZdepositAddr1");
    assert_eq!(body["record"]["status"], "PENDING");
    let record_id = body["record"]["id"].as_str().unwrap().to_string();

    // Approve it
    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/admin/deposits/{record_id}/approve"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "APPROVED");

    // Balance credited
    let (_, body) = request_json(
        &app,
        "GET",
        &format!("/api/progress?userId={user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["balance"], 500.0);

    // Wrong-kind route is rejected without side effects
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/admin/withdrawals/{record_id}/approve"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdrawal_reject_refunds_hold() {
    let (_dir, app) = test_app().await;
    let token = admin_token(&app).await;
    let user_id = register_user(&app, "frank").await;
    request_json(
        &app,
        "PATCH",
        &format!("/api/admin/users/{user_id}"),
        Some(&token),
        Some(json!({"balanceDelta": 300.0})),
    )
    .await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/wallet/withdraw",
        None,
        Some(json!({"userId": user_id, "amount": 120.0, "address": "TDest"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let record_id = body["record"]["id"].as_str().unwrap().to_string();

    // Hold visible in records
    let (_, body) = request_json(
        &app,
        "GET",
        &format!("/api/wallet/records?userId={user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["records"].as_array().unwrap().len(), 1);

    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/admin/withdrawals/{record_id}/reject"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(
        &app,
        "GET",
        &format!("/api/progress?userId={user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["balance"], 300.0);
}

#[tokio::test]
async fn invalid_store_name_is_a_bad_request() {
    let (_dir, app) = test_app().await;
    let user_id = register_user(&app, "gina").await;
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/task/next",
        None,
        Some(json!({"userId": user_id, "store": "ebay"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn responses_carry_request_id_header() {
    let (_dir, app) = test_app().await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header("x-request-id", "fixed-id-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "fixed-id-1"
    );
}
