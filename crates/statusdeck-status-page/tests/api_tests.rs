use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request as HttpRequest, StatusCode},
    middleware, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use statusdeck_auth::{identity_middleware, IdentityResolver, OpenAccessPolicy, USER_ID_HEADER};
use statusdeck_config::ServiceStatusStrategy;
use statusdeck_database::test_utils::TestDatabase;
use statusdeck_realtime::EventHub;
use statusdeck_status_page::{create_router, StatusPageState};
use tower::ServiceExt;

const USER: &str = "test_user_123";

async fn app() -> anyhow::Result<(Router, TestDatabase)> {
    let db = TestDatabase::with_migrations().await?;
    let state = StatusPageState::new(
        db.connection_arc(),
        EventHub::new(16),
        Arc::new(OpenAccessPolicy),
        ServiceStatusStrategy::LatestEvent,
    );

    let router = Router::new()
        .nest("/api", create_router::<StatusPageState>())
        .layer(middleware::from_fn_with_state(
            Arc::new(IdentityResolver::TrustedHeader),
            identity_middleware,
        ))
        .with_state(Arc::new(state));

    Ok((router, db))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = HttpRequest::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, USER);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_status_page_flow_over_http() -> anyhow::Result<()> {
    let (router, db) = app().await?;

    let (status, org) = send(
        &router,
        "POST",
        "/api/organizations",
        Some(json!({"name": "Acme", "slug": "acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(org["members"][0]["userId"], USER);
    assert_eq!(org["members"][0]["role"], "ADMIN");
    let org_id = org["id"].as_i64().unwrap();

    let (status, service) = send(
        &router,
        "POST",
        &format!("/api/organizations/{org_id}/services"),
        Some(json!({"name": "API"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(service["status"], "OPERATIONAL");
    assert_eq!(service["order"], 0);
    let service_id = service["id"].as_i64().unwrap();

    let (status, incident) = send(
        &router,
        "POST",
        &format!("/api/organizations/{org_id}/incidents"),
        Some(json!({"title": "API down", "serviceId": service_id, "impact": "CRITICAL"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(incident["service"]["status"], "MAJOR_OUTAGE");
    let incident_id = incident["id"].as_i64().unwrap();

    let (_, public) = send(&router, "GET", "/api/public/status/acme", None).await;
    assert_eq!(public["overallStatus"], "Major Outage");
    assert_eq!(public["activeIncidents"].as_array().unwrap().len(), 1);

    let (status, resolved) = send(
        &router,
        "PATCH",
        &format!("/api/incidents/{incident_id}"),
        Some(json!({"status": "RESOLVED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(resolved["resolvedAt"].is_string());
    assert_eq!(resolved["service"]["status"], "OPERATIONAL");

    let (_, history) = send(&router, "GET", "/api/public/status/acme/history", None).await;
    assert_eq!(history[0]["id"], incident_id);

    let (status, _) = send(&router, "DELETE", &format!("/api/services/{service_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(db.count_rows("incidents").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_invalid_status_lists_valid_statuses() -> anyhow::Result<()> {
    let (router, _db) = app().await?;
    let (_, org) = send(
        &router,
        "POST",
        "/api/organizations",
        Some(json!({"name": "Acme", "slug": "acme"})),
    )
    .await;
    let org_id = org["id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        "POST",
        &format!("/api/organizations/{org_id}/services"),
        Some(json!({"name": "API", "status": "ON_FIRE"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let valid = body["validStatuses"].as_array().unwrap();
    assert_eq!(valid.len(), 5);
    assert!(valid.contains(&json!("OPERATIONAL")));
    Ok(())
}

#[tokio::test]
async fn test_error_envelopes() -> anyhow::Result<()> {
    let (router, _db) = app().await?;

    let (status, body) = send(&router, "GET", "/api/public/status/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Status page not found");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(&router, "GET", "/api/services/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Service not found");

    let (status, body) = send(
        &router,
        "POST",
        "/api/organizations",
        Some(json!({"name": "Acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and slug are required");

    send(
        &router,
        "POST",
        "/api/organizations",
        Some(json!({"name": "Acme", "slug": "acme"})),
    )
    .await;
    let (status, body) = send(
        &router,
        "POST",
        "/api/organizations",
        Some(json!({"name": "Acme again", "slug": "acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Organization slug already exists");

    let (status, body) = send(&router, "GET", "/api/public/status/acme/history?limit=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_uses_envelope() -> anyhow::Result<()> {
    let (router, _db) = app().await?;

    let request = HttpRequest::post("/api/organizations")
        .header(USER_ID_HEADER, USER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["code"], "INVALID_BODY");
    Ok(())
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() -> anyhow::Result<()> {
    let (router, _db) = app().await?;

    let response = router
        .clone()
        .oneshot(HttpRequest::get("/api/organizations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Public pages need no identity.
    let response = router
        .oneshot(
            HttpRequest::get("/api/public/status/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[test]
fn test_openapi_document_lists_routes() {
    use statusdeck_status_page::StatusPageApiDoc;
    use utoipa::OpenApi;

    let doc = StatusPageApiDoc::openapi();
    for path in [
        "/organizations",
        "/organizations/{organization_id}/services",
        "/services/{id}/status",
        "/incidents/{id}/updates",
        "/public/status/{slug}/history",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
