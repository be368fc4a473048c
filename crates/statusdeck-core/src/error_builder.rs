use crate::problem;
use axum::http::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

pub struct ErrorBuilder {
    status: StatusCode,
    error: String,
    message: Option<String>,
    code: String,
    values: HashMap<String, serde_json::Value>,
}

impl ErrorBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: None,
            code: status
                .canonical_reason()
                .unwrap_or("ERROR")
                .to_uppercase()
                .replace(' ', "_"),
            values: HashMap::new(),
        }
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn value<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.values.insert(key.to_string(), value);
        }
        self
    }

    pub fn build(self) -> problem::Problem {
        let mut problem = problem::new(self.status)
            .with_error(self.error)
            .with_code(self.code)
            .with_value("timestamp", crate::types::timestamp_now());

        if let Some(message) = self.message {
            problem = problem.with_message(message);
        }

        for (key, value) in self.values {
            problem = problem.with_value(&key, value);
        }

        problem
    }
}

// Common error builders
pub fn internal_server_error() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
        .error("Internal server error")
        .message("Something went wrong")
        .code("INTERNAL_SERVER_ERROR")
}

pub fn not_found() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::NOT_FOUND)
        .error("Not Found")
        .code("NOT_FOUND")
}

pub fn unauthorized() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::UNAUTHORIZED)
        .error("Unauthorized")
        .message("Authentication is required to access this resource")
        .code("UNAUTHORIZED")
}

pub fn bad_request() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .error("Bad Request")
        .code("BAD_REQUEST")
}

pub fn validation_error() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .error("Validation failed")
        .code("VALIDATION_ERROR")
}

/// Storage-layer failures surface as 400 with a generic message; the
/// underlying error is only logged.
pub fn database_error() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .error("Database error")
        .message("The request could not be applied to the database")
        .code("DATABASE_ERROR")
}

pub fn forbidden() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::FORBIDDEN)
        .error("Access denied")
        .code("FORBIDDEN")
}

pub fn conflict() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::CONFLICT)
        .error("Conflict")
        .code("CONFLICT")
}
