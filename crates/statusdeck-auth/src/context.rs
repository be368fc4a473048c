use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity of the caller, attached to every request by the identity middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    /// External user identifier (not a database id)
    pub user_id: String,
    pub email: Option<String>,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Email to record on membership rows; empty when the identity carries none.
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}
