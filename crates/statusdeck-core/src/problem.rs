use std::collections::BTreeMap;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Wire shape of every error returned by the API.
///
/// `error` is always present; `message` carries the occurrence-specific
/// explanation when there is one. Handlers may attach extra keys such as
/// `validStatuses`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "error": "Invalid status",
    "message": "Status must be one of the valid statuses",
    "code": "VALIDATION_ERROR",
    "timestamp": "2025-01-15T14:30:00Z",
    "validStatuses": ["OPERATIONAL", "MAJOR_OUTAGE"]
}))]
pub struct ErrorBody {
    /// Short, human-readable summary of the problem
    pub error: String,
    /// Explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code
    pub code: String,
    /// When the error was produced
    pub timestamp: String,
    /// Additional properties of the problem
    #[serde(flatten)]
    #[schema(additional_properties = true)]
    pub extensions: BTreeMap<String, Value>,
}

/// An error response on its way to the client.
#[derive(Debug, Clone)]
pub struct Problem {
    /// The status code of the problem.
    pub status_code: StatusCode,
    /// The JSON body of the problem.
    pub body: BTreeMap<String, Value>,
}

/// Create a new `Problem` response to send to the client.
pub fn new<S>(status_code: S) -> Problem
where
    S: Into<StatusCode>,
{
    Problem {
        status_code: status_code.into(),
        body: BTreeMap::new(),
    }
}

impl Problem {
    /// Specify the "error" summary.
    pub fn with_error<S>(self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.with_value("error", value.into())
    }

    /// Specify the "message" detail.
    pub fn with_message<S>(self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.with_value("message", value.into())
    }

    /// Specify the machine-readable "code".
    pub fn with_code<S>(self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.with_value("code", value.into())
    }

    /// Specify an arbitrary value to include in the problem.
    pub fn with_value<V>(mut self, key: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.body.insert(key.to_owned(), value.into());

        self
    }

    /// The "error" summary, if one was set.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// The "message" detail, if one was set.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

impl<S> From<S> for Problem
where
    S: Into<StatusCode>,
{
    fn from(status_code: S) -> Self {
        new(status_code.into())
    }
}

/// Result type where the error is always a `Problem`.
pub type Result<T> = std::result::Result<T, Problem>;

impl IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        if self.body.is_empty() {
            self.status_code.into_response()
        } else {
            let mut response = (self.status_code, Json(self.body)).into_response();

            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
    }
}
