use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use statusdeck_auth::{AccessPolicy, AuthContext};
use statusdeck_core::non_blank;
use statusdeck_entities::types::MemberRole;
use statusdeck_entities::{members, organizations};
use std::sync::Arc;
use tracing::info;

use super::loaders::{find_organization, organization_counts};
use super::types::{
    CreateOrganizationRequest, MemberResponse, OrganizationDetail, OrganizationSummary,
    StatusPageError,
};

const SLUG_TAKEN: &str = "Organization slug already exists";

/// Organizations and their membership.
pub struct OrganizationService {
    db: Arc<DatabaseConnection>,
    policy: Arc<dyn AccessPolicy>,
}

impl OrganizationService {
    pub fn new(db: Arc<DatabaseConnection>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { db, policy }
    }

    /// Create an organization with the caller as its first admin.
    pub async fn create_organization(
        &self,
        auth: &AuthContext,
        request: CreateOrganizationRequest,
    ) -> Result<OrganizationDetail, StatusPageError> {
        let (name, slug) = match (
            non_blank(request.name.as_deref()),
            non_blank(request.slug.as_deref()),
        ) {
            (Some(name), Some(slug)) => (name.to_string(), slug.to_string()),
            _ => {
                return Err(StatusPageError::Validation(
                    "Name and slug are required".to_string(),
                ))
            }
        };

        if slug::slugify(&slug) != slug {
            return Err(StatusPageError::Validation(
                "Slug may only contain lowercase letters, numbers and dashes".to_string(),
            ));
        }

        let existing = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(StatusPageError::Conflict(SLUG_TAKEN.to_string()));
        }

        let txn = self.db.begin().await?;

        let organization = organizations::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(slug_conflict)?;

        let admin = members::ActiveModel {
            user_id: Set(auth.user_id.clone()),
            email: Set(auth.email_or_empty().to_string()),
            role: Set(MemberRole::Admin),
            organization_id: Set(organization.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            organization_id = organization.id,
            slug = %organization.slug,
            user_id = %auth.user_id,
            "Created organization"
        );

        Ok(OrganizationDetail {
            organization: organization.into(),
            members: vec![admin.into()],
            counts: None,
        })
    }

    /// Organizations the caller belongs to, with the caller's role.
    pub async fn list_organizations(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<OrganizationSummary>, StatusPageError> {
        let memberships = members::Entity::find()
            .filter(members::Column::UserId.eq(auth.user_id.as_str()))
            .order_by_asc(members::Column::CreatedAt)
            .order_by_asc(members::Column::Id)
            .find_also_related(organizations::Entity)
            .all(self.db.as_ref())
            .await?;

        let mut summaries = Vec::with_capacity(memberships.len());
        for (member, organization) in memberships {
            let Some(organization) = organization else {
                continue;
            };
            let counts = organization_counts(self.db.as_ref(), organization.id).await?;
            summaries.push(OrganizationSummary {
                organization: organization.into(),
                role: member.role,
                counts,
            });
        }

        Ok(summaries)
    }

    pub async fn get_organization(
        &self,
        auth: &AuthContext,
        organization_id: i32,
    ) -> Result<OrganizationDetail, StatusPageError> {
        self.policy.authorize(auth, organization_id).await?;
        let organization = find_organization(self.db.as_ref(), organization_id).await?;

        let members = members::Entity::find()
            .filter(members::Column::OrganizationId.eq(organization_id))
            .order_by_asc(members::Column::CreatedAt)
            .order_by_asc(members::Column::Id)
            .all(self.db.as_ref())
            .await?;
        let counts = organization_counts(self.db.as_ref(), organization_id).await?;

        Ok(OrganizationDetail {
            organization: organization.into(),
            members: members.into_iter().map(MemberResponse::from).collect(),
            counts: Some(counts),
        })
    }
}

/// A concurrent insert can still hit the unique index after the pre-check.
fn slug_conflict(err: DbErr) -> StatusPageError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            StatusPageError::Conflict(SLUG_TAKEN.to_string())
        }
        _ => StatusPageError::Database(err),
    }
}
