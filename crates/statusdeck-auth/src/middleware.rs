use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use statusdeck_config::{IdentityMode, ServerConfig};
use std::sync::Arc;
use tracing::trace;

use crate::context::AuthContext;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Decides which identity a request runs as.
#[derive(Debug, Clone)]
pub enum IdentityResolver {
    /// Every request runs as the same configured user.
    Fixed(AuthContext),
    /// Identity comes from headers set by a trusted upstream proxy.
    TrustedHeader,
}

impl IdentityResolver {
    pub fn from_config(config: &ServerConfig) -> Self {
        match config.identity_mode {
            IdentityMode::Fixed => {
                let mut context = AuthContext::new(config.fixed_user_id.clone());
                context.email = config.fixed_user_email.clone();
                IdentityResolver::Fixed(context)
            }
            IdentityMode::Header => IdentityResolver::TrustedHeader,
        }
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Option<AuthContext> {
        match self {
            IdentityResolver::Fixed(context) => Some(context.clone()),
            IdentityResolver::TrustedHeader => {
                let user_id = header_value(headers, USER_ID_HEADER)?;
                let mut context = AuthContext::new(user_id);
                context.email = header_value(headers, USER_EMAIL_HEADER);
                Some(context)
            }
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Attaches an [`AuthContext`] to the request when one can be resolved.
///
/// Requests without identity continue; the `RequireAuth` extractor rejects
/// them on routes that need a caller.
pub async fn identity_middleware(
    State(resolver): State<Arc<IdentityResolver>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(context) = resolver.resolve(req.headers()) {
        trace!(user_id = %context.user_id, "Resolved request identity");
        req.extensions_mut().insert(context);
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequireAuth;
    use axum::{body::Body, http::Request as HttpRequest, http::StatusCode, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(RequireAuth(auth): RequireAuth) -> String {
        format!("{}|{}", auth.user_id, auth.email_or_empty())
    }

    fn app(resolver: IdentityResolver) -> Router {
        Router::new().route("/whoami", get(whoami)).layer(
            axum::middleware::from_fn_with_state(Arc::new(resolver), identity_middleware),
        )
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_fixed_identity_applies_to_every_request() {
        let resolver = IdentityResolver::from_config(&ServerConfig::default());
        let response = app(resolver)
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "test_user_123|test@example.com");
    }

    #[tokio::test]
    async fn test_header_identity() {
        let response = app(IdentityResolver::TrustedHeader)
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(USER_ID_HEADER, "user_42")
                    .header(USER_EMAIL_HEADER, "ops@acme.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "user_42|ops@acme.test");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app(IdentityResolver::TrustedHeader)
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[test]
    fn test_blank_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "   ".parse().unwrap());
        assert!(IdentityResolver::TrustedHeader.resolve(&headers).is_none());
    }
}
