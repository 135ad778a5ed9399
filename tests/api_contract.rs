mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{manager_token, test_app, token, TestApp, ALICE, BOB, CAROL, MANAGER};

async fn call(router: &Router, method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn propose(app: &TestApp) -> String {
    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/shift-swaps",
        Some(&token(ALICE)),
        Some(json!({
            "targetId": BOB,
            "requesterSlotId": app.alice_slot,
            "targetSlotId": app.bob_slot,
            "reason": "Dentist appointment"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    assert_eq!(body["status"], "PENDING");
    body["id"].as_str().unwrap().to_string()
}

fn statuses(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_reports_memory_store() {
    let app = test_app(false).await;
    let (status, body) = call(&app.router, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = test_app(false).await;

    let (status, body) = call(&app.router, Method::GET, "/api/shift-swaps?type=sent", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app.router, Method::GET, "/api/shift-swaps?type=sent", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_accept_is_visible_to_both_sides() {
    let app = test_app(false).await;
    let id = propose(&app).await;

    let (status, body) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/shift-swaps/{}/respond", id),
        Some(&token(BOB)),
        Some(json!({ "status": "ACCEPTED", "responseMessage": "Happy to help" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACCEPTED");
    assert!(body["respondedAt"].is_string());
    assert_eq!(body["responseMessage"], "Happy to help");

    let (_, sent) = call(&app.router, Method::GET, "/api/shift-swaps?type=sent", Some(&token(ALICE)), None).await;
    let (_, received) = call(&app.router, Method::GET, "/api/shift-swaps?type=received", Some(&token(BOB)), None).await;
    assert_eq!(statuses(&sent), vec!["ACCEPTED"]);
    assert_eq!(statuses(&received), vec!["ACCEPTED"]);
    assert_eq!(sent["meta"]["total"], 1);

    // The assignments changed hands.
    let (_, bob_assignments) = call(&app.router, Method::GET, "/api/shift-assignments", Some(&token(BOB)), None).await;
    let ids: Vec<&str> = bob_assignments
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![app.alice_slot.to_string().as_str()]);
}

#[tokio::test]
async fn test_cancel_removes_request_from_pending_received() {
    let app = test_app(false).await;
    let id = propose(&app).await;

    let (status, body) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/shift-swaps/{}/cancel", id),
        Some(&token(ALICE)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    let (_, pending) = call(
        &app.router,
        Method::GET,
        "/api/shift-swaps?type=received&status=PENDING",
        Some(&token(BOB)),
        None,
    )
    .await;
    assert!(statuses(&pending).is_empty());
    assert_eq!(pending["meta"]["totalPages"], 0);
}

#[tokio::test]
async fn test_status_filter_is_exact_for_both_directions() {
    let app = test_app(false).await;
    let first = propose(&app).await;

    // Alice's second slot against Carol stays pending.
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/shift-swaps",
        Some(&token(ALICE)),
        Some(json!({
            "targetId": CAROL,
            "requesterSlotId": app.alice_second_slot,
            "targetSlotId": app.carol_slot
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/shift-swaps/{}/respond", first),
        Some(&token(BOB)),
        Some(json!({ "status": "REJECTED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, sent_pending) = call(
        &app.router,
        Method::GET,
        "/api/shift-swaps?type=sent&status=PENDING",
        Some(&token(ALICE)),
        None,
    )
    .await;
    assert_eq!(statuses(&sent_pending), vec!["PENDING"]);

    let (_, received_pending) = call(
        &app.router,
        Method::GET,
        "/api/shift-swaps?type=received&status=PENDING",
        Some(&token(BOB)),
        None,
    )
    .await;
    assert!(statuses(&received_pending).is_empty());

    let (_, all_sent) = call(&app.router, Method::GET, "/api/shift-swaps?type=sent", Some(&token(ALICE)), None).await;
    assert_eq!(all_sent["meta"]["total"], 2);
}

#[tokio::test]
async fn test_only_target_may_respond_and_only_once() {
    let app = test_app(false).await;
    let id = propose(&app).await;
    let uri = format!("/api/shift-swaps/{}/respond", id);

    let (status, _) = call(&app.router, Method::PATCH, &uri, Some(&token(ALICE)), Some(json!({ "status": "ACCEPTED" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app.router, Method::PATCH, &uri, Some(&token(BOB)), Some(json!({ "status": "REJECTED" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app.router, Method::PATCH, &uri, Some(&token(BOB)), Some(json!({ "status": "ACCEPTED" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Request is no longer pending, current status: REJECTED");

    let (_, detail) = call(&app.router, Method::GET, &format!("/api/shift-swaps/{}", id), Some(&token(ALICE)), None).await;
    assert_eq!(detail["status"], "REJECTED");
}

#[tokio::test]
async fn test_respond_rejects_non_decision_status() {
    let app = test_app(false).await;
    let id = propose(&app).await;

    let (status, _) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/shift-swaps/{}/respond", id),
        Some(&token(BOB)),
        Some(json!({ "status": "CANCELLED" })),
    )
    .await;
    assert!(status.is_client_error());
    assert_ne!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_only_requester_may_cancel() {
    let app = test_app(false).await;
    let id = propose(&app).await;
    let uri = format!("/api/shift-swaps/{}/cancel", id);

    for employee in [BOB, CAROL] {
        let (status, _) = call(&app.router, Method::PATCH, &uri, Some(&token(employee)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (_, detail) = call(&app.router, Method::GET, &format!("/api/shift-swaps/{}", id), Some(&token(BOB)), None).await;
    assert_eq!(detail["status"], "PENDING");
}

#[tokio::test]
async fn test_detail_visibility() {
    let app = test_app(false).await;
    let id = propose(&app).await;
    let uri = format!("/api/shift-swaps/{}", id);

    let (status, _) = call(&app.router, Method::GET, &uri, Some(&token(CAROL)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app.router, Method::GET, &uri, Some(&manager_token(MANAGER)), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app.router,
        Method::GET,
        &format!("/api/shift-swaps/{}", uuid::Uuid::new_v4()),
        Some(&token(ALICE)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_pending_offer_conflicts() {
    let app = test_app(false).await;
    propose(&app).await;

    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/shift-swaps",
        Some(&token(ALICE)),
        Some(json!({
            "targetId": CAROL,
            "requesterSlotId": app.alice_slot,
            "targetSlotId": app.carol_slot
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_complete_requires_manager_and_accepted() {
    let app = test_app(false).await;
    let id = propose(&app).await;
    let uri = format!("/api/shift-swaps/{}/complete", id);

    let (status, _) = call(&app.router, Method::PATCH, &uri, Some(&manager_token(MANAGER)), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    call(
        &app.router,
        Method::PATCH,
        &format!("/api/shift-swaps/{}/respond", id),
        Some(&token(BOB)),
        Some(json!({ "status": "ACCEPTED" })),
    )
    .await;

    let (status, _) = call(&app.router, Method::PATCH, &uri, Some(&token(ALICE)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app.router, Method::PATCH, &uri, Some(&manager_token(MANAGER)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
}

#[tokio::test]
async fn test_auto_complete_moves_accepted_to_completed() {
    let app = test_app(true).await;
    let id = propose(&app).await;

    let (status, body) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/shift-swaps/{}/respond", id),
        Some(&token(BOB)),
        Some(json!({ "status": "ACCEPTED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
    assert!(body["respondedAt"].is_string());
}

#[tokio::test]
async fn test_invalid_paging_is_bad_request() {
    let app = test_app(false).await;

    for query in ["type=sent&page=0", "type=sent&limit=0", "type=sent&limit=101"] {
        let (status, _) = call(
            &app.router,
            Method::GET,
            &format!("/api/shift-swaps?{}", query),
            Some(&token(ALICE)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
    }
}

#[tokio::test]
async fn test_dashboard_counts_pending() {
    let app = test_app(false).await;
    propose(&app).await;

    let (_, alice) = call(&app.router, Method::GET, "/api/shift-swaps/dashboard", Some(&token(ALICE)), None).await;
    let (_, bob) = call(&app.router, Method::GET, "/api/shift-swaps/dashboard", Some(&token(BOB)), None).await;

    assert_eq!(alice, json!({ "pendingSent": 1, "pendingReceived": 0 }));
    assert_eq!(bob, json!({ "pendingSent": 0, "pendingReceived": 1 }));
}

#[tokio::test]
async fn test_overlong_reason_is_unprocessable() {
    let app = test_app(false).await;

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/shift-swaps",
        Some(&token(ALICE)),
        Some(json!({
            "targetId": BOB,
            "requesterSlotId": app.alice_slot,
            "targetSlotId": app.bob_slot,
            "reason": "x".repeat(501)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_openapi_document_lists_swap_paths() {
    let app = test_app(false).await;
    let (status, doc) = call(&app.router, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/shift-swaps/{id}/respond"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_scalar_reference_is_served() {
    let app = test_app(false).await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/scalar").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_auth_is_checked_before_path_id() {
    let app = test_app(false).await;

    for (method, uri) in [
        (Method::GET, "/api/shift-swaps/not-a-uuid"),
        (Method::PATCH, "/api/shift-swaps/not-a-uuid/cancel"),
        (Method::PATCH, "/api/shift-swaps/not-a-uuid/complete"),
    ] {
        let (status, body) = call(&app.router, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }

    let (status, body) = call(
        &app.router,
        Method::PATCH,
        "/api/shift-swaps/not-a-uuid/respond",
        None,
        Some(json!({ "status": "ACCEPTED" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}
