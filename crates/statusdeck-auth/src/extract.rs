use axum::{extract::FromRequestParts, http::request::Parts};
use statusdeck_core::{error_builder::unauthorized, Problem};

use crate::context::AuthContext;

/// Extractor that rejects requests without a resolved identity
///
/// Usage:
/// ```ignore
/// pub async fn list_organizations<T: StatusPageAppState>(
///     RequireAuth(auth): RequireAuth,
///     State(state): State<Arc<T>>,
/// ) -> Result<impl IntoResponse, Problem> {
///     // auth.user_id is the caller
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| unauthorized().build())
    }
}
