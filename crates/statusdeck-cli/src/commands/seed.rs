use clap::Args;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use statusdeck_config::{DEFAULT_DATABASE_URL, DEFAULT_USER_EMAIL, DEFAULT_USER_ID};
use statusdeck_database::establish_connection;
use statusdeck_entities::types::{IncidentImpact, IncidentStatus, MemberRole, ServiceStatus};
use statusdeck_entities::{incident_updates, incidents, members, organizations, services};
use tracing::info;

pub const DEMO_SLUG: &str = "acme-corp";

#[derive(Args)]
pub struct SeedCommand {
    /// Database connection URL (sqlite:// or postgres://)
    #[arg(long, default_value = DEFAULT_DATABASE_URL, env = "STATUSDECK_DATABASE_URL")]
    pub database_url: String,

    /// User id of the demo organization's admin
    #[arg(long, default_value = DEFAULT_USER_ID, env = "STATUSDECK_USER_ID")]
    pub user_id: String,

    /// Email of the demo organization's admin
    #[arg(long, default_value = DEFAULT_USER_EMAIL, env = "STATUSDECK_USER_EMAIL")]
    pub user_email: String,
}

/// What a seed run did.
#[derive(Debug, PartialEq)]
pub enum SeedOutcome {
    Created { organization_id: i32, services: usize },
    AlreadySeeded { organization_id: i32 },
}

impl SeedCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let db = establish_connection(&self.database_url).await?;

            match seed_demo_data(&db, &self.user_id, &self.user_email).await? {
                SeedOutcome::Created {
                    organization_id,
                    services,
                } => {
                    info!(
                        organization_id,
                        services, "Seeded demo organization '{}'", DEMO_SLUG
                    );
                    println!("Organization ID: {}", organization_id);
                    println!("Public page: /api/public/status/{}", DEMO_SLUG);
                }
                SeedOutcome::AlreadySeeded { organization_id } => {
                    info!(
                        organization_id,
                        "Demo organization '{}' already exists, nothing to do", DEMO_SLUG
                    );
                }
            }
            Ok(())
        })
    }
}

/// Insert the Acme Corp demo organization. Safe to run repeatedly.
pub async fn seed_demo_data(
    db: &DatabaseConnection,
    user_id: &str,
    user_email: &str,
) -> Result<SeedOutcome, DbErr> {
    if let Some(existing) = organizations::Entity::find()
        .filter(organizations::Column::Slug.eq(DEMO_SLUG))
        .one(db)
        .await?
    {
        return Ok(SeedOutcome::AlreadySeeded {
            organization_id: existing.id,
        });
    }

    let txn = db.begin().await?;

    let organization = organizations::ActiveModel {
        name: Set("Acme Corp".to_string()),
        slug: Set(DEMO_SLUG.to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    members::ActiveModel {
        user_id: Set(user_id.to_string()),
        email: Set(user_email.to_string()),
        role: Set(MemberRole::Admin),
        organization_id: Set(organization.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let demo_services = [
        ("API Server", "Main application API", ServiceStatus::Operational),
        ("Web Application", "Frontend web app", ServiceStatus::Operational),
        ("Database", "PostgreSQL database", ServiceStatus::DegradedPerformance),
    ];
    let mut created = Vec::with_capacity(demo_services.len());
    for (order, (name, description, status)) in demo_services.into_iter().enumerate() {
        let service = services::ActiveModel {
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            status: Set(status),
            order: Set(order as i32 + 1),
            organization_id: Set(organization.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        created.push(service);
    }

    // The degraded database gets an open incident so the public page has something to show.
    if let Some(database) = created.last() {
        let incident = incidents::ActiveModel {
            title: Set("Elevated query latency".to_string()),
            status: Set(IncidentStatus::Monitoring),
            impact: Set(IncidentImpact::Minor),
            service_id: Set(database.id),
            organization_id: Set(organization.id),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (message, status) in [
            (
                "We are investigating slow responses from the primary database.",
                IncidentStatus::Investigating,
            ),
            (
                "A fix has been deployed and we are monitoring query times.",
                IncidentStatus::Monitoring,
            ),
        ] {
            incident_updates::ActiveModel {
                incident_id: Set(incident.id),
                message: Set(message.to_string()),
                status: Set(status),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    Ok(SeedOutcome::Created {
        organization_id: organization.id,
        services: created.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use statusdeck_database::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_seed_creates_demo_organization_once() -> anyhow::Result<()> {
        let db = TestDatabase::with_migrations().await?;

        let first = seed_demo_data(db.connection(), DEFAULT_USER_ID, DEFAULT_USER_EMAIL).await?;
        let organization_id = match first {
            SeedOutcome::Created {
                organization_id,
                services,
            } => {
                assert_eq!(services, 3);
                organization_id
            }
            other => panic!("expected a fresh seed, got {:?}", other),
        };

        assert_eq!(db.count_rows("members").await?, 1);
        assert_eq!(db.count_rows("incidents").await?, 1);
        assert_eq!(db.count_rows("incident_updates").await?, 2);

        let second = seed_demo_data(db.connection(), DEFAULT_USER_ID, DEFAULT_USER_EMAIL).await?;
        assert_eq!(second, SeedOutcome::AlreadySeeded { organization_id });
        assert_eq!(db.count_rows("organizations").await?, 1);
        assert_eq!(db.count_rows("services").await?, 3);
        Ok(())
    }
}
