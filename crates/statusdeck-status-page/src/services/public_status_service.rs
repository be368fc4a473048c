use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use statusdeck_entities::types::{IncidentStatus, ServiceStatus};
use statusdeck_entities::{incidents, organizations};
use std::fmt::Display;
use std::sync::Arc;

use super::loaders::{incident_details, ordered_services, UpdateOrder};
use super::types::{
    IncidentDetail, PublicOrganization, PublicStatusResponse, ServiceResponse, StatusPageError,
};

pub const DEFAULT_HISTORY_LIMIT: u64 = 10;
pub const MAX_HISTORY_LIMIT: u64 = 100;
/// Updates shown per active incident on the public page.
pub const PUBLIC_UPDATE_LIMIT: usize = 5;

/// Headline shown at the top of a public status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Operational,
    UnderMaintenance,
    Degraded,
    MajorOutage,
}

impl OverallStatus {
    /// Major outage beats degradation, which beats maintenance.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ServiceStatus>,
    {
        statuses
            .into_iter()
            .map(|status| match status {
                ServiceStatus::MajorOutage => OverallStatus::MajorOutage,
                ServiceStatus::PartialOutage | ServiceStatus::DegradedPerformance => {
                    OverallStatus::Degraded
                }
                ServiceStatus::UnderMaintenance => OverallStatus::UnderMaintenance,
                ServiceStatus::Operational => OverallStatus::Operational,
            })
            .max_by_key(|overall| overall.severity())
            .unwrap_or(OverallStatus::Operational)
    }

    fn severity(&self) -> u8 {
        match self {
            OverallStatus::Operational => 0,
            OverallStatus::UnderMaintenance => 1,
            OverallStatus::Degraded => 2,
            OverallStatus::MajorOutage => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Operational => "All Systems Operational",
            OverallStatus::UnderMaintenance => "Under Maintenance",
            OverallStatus::Degraded => "Degraded Performance",
            OverallStatus::MajorOutage => "Major Outage",
        }
    }
}

impl Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parse the `limit` query value of the history endpoint.
pub fn parse_history_limit(limit: Option<&str>) -> Result<u64, StatusPageError> {
    let Some(raw) = limit else {
        return Ok(DEFAULT_HISTORY_LIMIT);
    };

    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(StatusPageError::Validation(
            "Limit must be a positive integer".to_string(),
        )),
        Ok(n) => Ok(n.min(MAX_HISTORY_LIMIT)),
    }
}

/// Read-only view of an organization for anonymous visitors.
pub struct PublicStatusService {
    db: Arc<DatabaseConnection>,
}

impl PublicStatusService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<organizations::Model, StatusPageError> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| StatusPageError::NotFound("Status page not found".to_string()))
    }

    pub async fn get_public_status(
        &self,
        slug: &str,
    ) -> Result<PublicStatusResponse, StatusPageError> {
        let organization = self.find_by_slug(slug).await?;

        let services = ordered_services(self.db.as_ref(), organization.id).await?;
        let overall = OverallStatus::from_statuses(services.iter().map(|s| s.status));

        let active = incidents::Entity::find()
            .filter(incidents::Column::OrganizationId.eq(organization.id))
            .filter(incidents::Column::Status.ne(IncidentStatus::Resolved))
            .order_by_desc(incidents::Column::CreatedAt)
            .order_by_desc(incidents::Column::Id)
            .all(self.db.as_ref())
            .await?;
        let active_incidents = incident_details(
            self.db.as_ref(),
            active,
            UpdateOrder::NewestFirst,
            Some(PUBLIC_UPDATE_LIMIT),
        )
        .await?;

        Ok(PublicStatusResponse {
            organization: PublicOrganization::from(organization),
            overall_status: overall.label().to_string(),
            services: services.into_iter().map(ServiceResponse::from).collect(),
            active_incidents,
            last_updated: Utc::now(),
        })
    }

    /// Resolved incidents, most recently resolved first.
    pub async fn get_public_history(
        &self,
        slug: &str,
        limit: Option<&str>,
    ) -> Result<Vec<IncidentDetail>, StatusPageError> {
        let limit = parse_history_limit(limit)?;
        let organization = self.find_by_slug(slug).await?;

        let resolved = incidents::Entity::find()
            .filter(incidents::Column::OrganizationId.eq(organization.id))
            .filter(incidents::Column::Status.eq(IncidentStatus::Resolved))
            .order_by_desc(incidents::Column::ResolvedAt)
            .order_by_desc(incidents::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(incident_details(self.db.as_ref(), resolved, UpdateOrder::NewestFirst, None).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_services_is_operational() {
        assert_eq!(OverallStatus::from_statuses([]), OverallStatus::Operational);
        assert_eq!(
            OverallStatus::from_statuses([]).label(),
            "All Systems Operational"
        );
    }

    #[test]
    fn test_major_outage_takes_precedence() {
        let overall = OverallStatus::from_statuses([
            ServiceStatus::UnderMaintenance,
            ServiceStatus::MajorOutage,
            ServiceStatus::DegradedPerformance,
        ]);
        assert_eq!(overall, OverallStatus::MajorOutage);
    }

    #[test]
    fn test_partial_outage_reads_as_degraded() {
        let overall = OverallStatus::from_statuses([
            ServiceStatus::Operational,
            ServiceStatus::PartialOutage,
            ServiceStatus::UnderMaintenance,
        ]);
        assert_eq!(overall.label(), "Degraded Performance");
    }

    #[test]
    fn test_maintenance_beats_operational() {
        let overall =
            OverallStatus::from_statuses([ServiceStatus::Operational, ServiceStatus::UnderMaintenance]);
        assert_eq!(overall, OverallStatus::UnderMaintenance);
    }

    #[test]
    fn test_history_limit_parsing() {
        assert_eq!(parse_history_limit(None).unwrap(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(parse_history_limit(Some("25")).unwrap(), 25);
        assert_eq!(parse_history_limit(Some("5000")).unwrap(), MAX_HISTORY_LIMIT);
        assert!(matches!(
            parse_history_limit(Some("0")),
            Err(StatusPageError::Validation(_))
        ));
        assert!(matches!(
            parse_history_limit(Some("ten")),
            Err(StatusPageError::Validation(_))
        ));
    }
}
