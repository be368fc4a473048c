use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use statusdeck_core::error_builder::{
    bad_request, conflict, database_error, forbidden, internal_server_error, not_found,
    unauthorized, validation_error, ErrorBuilder,
};

#[test]
fn test_error_builder_basic() {
    let error = ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .error("Invalid status")
        .message("Status must be one of the listed values")
        .code("VALIDATION_ERROR")
        .build();

    assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(error.error(), Some("Invalid status"));
    assert_eq!(error.message(), Some("Status must be one of the listed values"));
    assert_eq!(
        error.body.get("code").unwrap().as_str().unwrap(),
        "VALIDATION_ERROR"
    );
    let timestamp = error.body["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'), "unexpected timestamp {timestamp}");
}

#[test]
fn test_error_builder_defaults_from_status() {
    let error = ErrorBuilder::new(StatusCode::UNPROCESSABLE_ENTITY).build();

    assert_eq!(error.error(), Some("Unprocessable Entity"));
    assert_eq!(
        error.body.get("code").unwrap().as_str().unwrap(),
        "UNPROCESSABLE_ENTITY"
    );
    assert!(error.message().is_none());
    assert!(!error.body.contains_key("message"));
}

#[test]
fn test_error_builder_with_values() {
    let error = validation_error()
        .error("Invalid status")
        .value("validStatuses", vec!["OPERATIONAL", "MAJOR_OUTAGE"])
        .build();

    let statuses = error.body.get("validStatuses").unwrap().as_array().unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].as_str().unwrap(), "OPERATIONAL");
}

#[test]
fn test_common_builders_status_codes() {
    assert_eq!(bad_request().build().status_code, StatusCode::BAD_REQUEST);
    assert_eq!(validation_error().build().status_code, StatusCode::BAD_REQUEST);
    assert_eq!(database_error().build().status_code, StatusCode::BAD_REQUEST);
    assert_eq!(not_found().build().status_code, StatusCode::NOT_FOUND);
    assert_eq!(unauthorized().build().status_code, StatusCode::UNAUTHORIZED);
    assert_eq!(forbidden().build().status_code, StatusCode::FORBIDDEN);
    assert_eq!(conflict().build().status_code, StatusCode::CONFLICT);
    assert_eq!(
        internal_server_error().build().status_code,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_internal_server_error_is_generic() {
    let error = internal_server_error().build();

    assert_eq!(error.error(), Some("Internal server error"));
    assert_eq!(error.message(), Some("Something went wrong"));
    assert_eq!(
        error.body.get("code").unwrap().as_str().unwrap(),
        "INTERNAL_SERVER_ERROR"
    );
}

#[tokio::test]
async fn test_problem_into_response() {
    let response = not_found().message("Service not found").build().into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Service not found");
    assert_eq!(body["code"], "NOT_FOUND");
}
