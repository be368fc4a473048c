use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use statusdeck_config::AccessMode;
use statusdeck_entities::members;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::context::AuthContext;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("You are not a member of organization {organization_id}")]
    NotMember { organization_id: i32 },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Decides whether a caller may act on an organization's records.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn authorize(&self, auth: &AuthContext, organization_id: i32)
        -> Result<(), AccessError>;

    fn name(&self) -> &'static str;
}

/// Allows every caller. Suitable for local development and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAccessPolicy;

#[async_trait]
impl AccessPolicy for OpenAccessPolicy {
    async fn authorize(&self, _auth: &AuthContext, _organization_id: i32) -> Result<(), AccessError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "open"
    }
}

/// Requires a member row linking the caller to the organization.
pub struct MembershipPolicy {
    db: Arc<DatabaseConnection>,
}

impl MembershipPolicy {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccessPolicy for MembershipPolicy {
    async fn authorize(&self, auth: &AuthContext, organization_id: i32) -> Result<(), AccessError> {
        let count = members::Entity::find()
            .filter(members::Column::UserId.eq(auth.user_id.as_str()))
            .filter(members::Column::OrganizationId.eq(organization_id))
            .count(self.db.as_ref())
            .await?;

        if count == 0 {
            debug!(
                user_id = %auth.user_id,
                organization_id,
                "Denied access to organization"
            );
            return Err(AccessError::NotMember { organization_id });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "membership"
    }
}

/// Build the policy selected by configuration.
pub fn access_policy_for(mode: AccessMode, db: Arc<DatabaseConnection>) -> Arc<dyn AccessPolicy> {
    match mode {
        AccessMode::Open => Arc::new(OpenAccessPolicy),
        AccessMode::Membership => Arc::new(MembershipPolicy::new(db)),
    }
}
