use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error_builder::bad_request;
use crate::problem::Problem;

/// JSON body extractor whose rejections use the API error envelope.
///
/// Behaves like [`axum::Json`] but a missing content type, malformed JSON or
/// a type mismatch produce a 400 `Problem` instead of axum's plain-text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(bad_request()
                .error("Invalid request body")
                .message(rejection.body_text())
                .code("INVALID_BODY")
                .build()),
        }
    }
}
