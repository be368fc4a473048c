use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::OriginalUri,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use statusdeck_auth::{identity_middleware, IdentityResolver, USER_EMAIL_HEADER, USER_ID_HEADER};
use statusdeck_config::{Environment, ServerConfig};
use statusdeck_core::{internal_server_error, not_found, timestamp_now, Problem};
use statusdeck_status_page::{StatusPageApiDoc, StatusPageState};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Statusdeck API",
        description = "Multi-tenant status pages: organizations, services, incidents and public status"
    ),
    nest((path = "/api", api = StatusPageApiDoc))
)]
pub struct ApiDoc;

/// Assemble the full HTTP surface: `/api`, `/ws`, `/health`, docs and fallbacks.
pub fn build_application(
    state: Arc<StatusPageState>,
    config: &ServerConfig,
) -> anyhow::Result<Router> {
    let resolver = Arc::new(IdentityResolver::from_config(config));

    let api = statusdeck_status_page::create_router::<StatusPageState>()
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(resolver, identity_middleware));

    let environment = config.environment;
    let mut app = Router::new()
        .route("/health", get(move || health(environment)))
        .nest("/api", api)
        .merge(statusdeck_realtime::create_router::<StatusPageState>())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app = match &config.static_dir {
        Some(dir) => {
            info!("Serving frontend from {}", dir.display());
            app.fallback_service(static_files(dir))
        }
        None => app.fallback(route_not_found),
    };

    let expose_panics = config.environment == Environment::Development;
    let mut app = app
        .with_state(state)
        .layer(CatchPanicLayer::custom(move |err| {
            panic_response(expose_panics, err)
        }))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = &config.cors_origin {
        app = app.layer(cors_layer(origin)?);
    }

    Ok(app)
}

async fn health(environment: Environment) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": timestamp_now(),
        "environment": environment.as_str(),
    }))
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> Problem {
    not_found().value("path", uri.path()).build()
}

/// Unknown paths fall through to `index.html` so client-side routing works.
fn static_files(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_EMAIL_HEADER),
        ])
        .allow_credentials(true))
}

fn panic_response(expose: bool, err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    error!("Request handler panicked: {}", detail);

    let mut builder = internal_server_error().error("Internal server error");
    if expose {
        builder = builder.message(detail);
    }
    builder.build().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use statusdeck_auth::OpenAccessPolicy;
    use statusdeck_config::ServiceStatusStrategy;
    use statusdeck_database::test_utils::TestDatabase;
    use statusdeck_realtime::EventHub;
    use tower::ServiceExt;

    async fn app_with(config: ServerConfig) -> anyhow::Result<(Router, TestDatabase)> {
        let db = TestDatabase::with_migrations().await?;
        let state = Arc::new(StatusPageState::new(
            db.connection_arc(),
            EventHub::new(16),
            Arc::new(OpenAccessPolicy),
            ServiceStatusStrategy::LatestEvent,
        ));
        Ok((build_application(state, &config)?, db))
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(HttpRequest::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_reports_environment() -> anyhow::Result<()> {
        let config = ServerConfig {
            environment: Environment::Production,
            ..ServerConfig::default()
        };
        let (app, _db) = app_with(config).await?;

        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "production");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_routes_return_not_found_envelope() -> anyhow::Result<()> {
        let (app, _db) = app_with(ServerConfig::default()).await?;

        let (status, body) = get_json(&app, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/nowhere");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

        let (status, body) = get_json(&app, "/api/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/api/nowhere");
        Ok(())
    }

    #[tokio::test]
    async fn test_fixed_identity_reaches_api() -> anyhow::Result<()> {
        let (app, _db) = app_with(ServerConfig::default()).await?;

        let (status, body) = get_json(&app, "/api/organizations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(vec![]));
        Ok(())
    }

    #[tokio::test]
    async fn test_openapi_document_is_served_under_api_prefix() -> anyhow::Result<()> {
        let (app, _db) = app_with(ServerConfig::default()).await?;

        let (status, body) = get_json(&app, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/organizations"].is_object());
        assert!(body["paths"]["/api/public/status/{slug}"].is_object());
        Ok(())
    }

    #[tokio::test]
    async fn test_static_dir_serves_index_for_client_routes() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("statusdeck-static-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("index.html"), "<h1>status</h1>")?;

        let config = ServerConfig {
            static_dir: Some(dir.clone()),
            ..ServerConfig::default()
        };
        let (app, _db) = app_with(config).await?;

        let response = app
            .clone()
            .oneshot(HttpRequest::get("/status/acme").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>status</h1>");

        // API misses still answer with JSON.
        let (status, body) = get_json(&app, "/api/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() -> anyhow::Result<()> {
        let config = ServerConfig {
            cors_origin: Some("http://localhost:5173".to_string()),
            ..ServerConfig::default()
        };
        let (app, _db) = app_with(config).await?;

        let response = app
            .oneshot(
                HttpRequest::get("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_panic_detail_only_exposed_in_development() {
        let response = panic_response(true, Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "boom");

        let response = panic_response(false, Box::new(String::from("boom")));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "Something went wrong");
    }
}
