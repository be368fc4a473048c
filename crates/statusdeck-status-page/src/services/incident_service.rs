use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use statusdeck_auth::{AccessPolicy, AuthContext};
use statusdeck_config::ServiceStatusStrategy;
use statusdeck_core::non_blank;
use statusdeck_entities::types::{IncidentImpact, IncidentStatus, ServiceStatus};
use statusdeck_entities::{incident_updates, incidents, services};
use statusdeck_realtime::{EventKind, EventPublisher};
use std::sync::Arc;
use tracing::{debug, info};

use super::loaders::{
    find_organization, incident_detail, incident_details, recompute_service_status,
    set_service_status, UpdateOrder,
};
use super::types::{
    parse_incident_impact, parse_incident_status, CreateIncidentRequest,
    CreateIncidentUpdateRequest, IncidentDetail, IncidentUpdateResponse, PatchIncidentRequest,
    ServiceResponse, StatusPageError,
};

/// What just happened to an incident, as far as its service's status is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncidentChange {
    Created(IncidentImpact),
    Resolved,
    Patched,
    UpdateAdded,
}

/// Incident lifecycle and the service status derived from it.
pub struct IncidentService {
    db: Arc<DatabaseConnection>,
    events: Arc<dyn EventPublisher>,
    policy: Arc<dyn AccessPolicy>,
    strategy: ServiceStatusStrategy,
}

impl IncidentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        events: Arc<dyn EventPublisher>,
        policy: Arc<dyn AccessPolicy>,
        strategy: ServiceStatusStrategy,
    ) -> Self {
        Self {
            db,
            events,
            policy,
            strategy,
        }
    }

    pub fn strategy(&self) -> ServiceStatusStrategy {
        self.strategy
    }

    /// Load an incident and check the caller may act on its organization.
    async fn authorized_incident(
        &self,
        auth: &AuthContext,
        incident_id: i32,
    ) -> Result<incidents::Model, StatusPageError> {
        let incident = incidents::Entity::find_by_id(incident_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| StatusPageError::NotFound("Incident not found".to_string()))?;

        self.policy.authorize(auth, incident.organization_id).await?;
        Ok(incident)
    }

    /// Apply the configured strategy to the incident's service.
    ///
    /// Returns the service when its status was written.
    async fn derive_service_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        service_id: i32,
        change: IncidentChange,
    ) -> Result<Option<services::Model>, DbErr> {
        let target = match self.strategy {
            ServiceStatusStrategy::LatestEvent => match change {
                IncidentChange::Created(impact) => Some(impact.service_status()),
                IncidentChange::Resolved => Some(ServiceStatus::Operational),
                IncidentChange::Patched | IncidentChange::UpdateAdded => None,
            },
            ServiceStatusStrategy::RecomputeOpenIncidents => {
                Some(recompute_service_status(conn, service_id).await?)
            }
        };
        let Some(target) = target else {
            return Ok(None);
        };

        let Some(service) = services::Entity::find_by_id(service_id).one(conn).await? else {
            return Ok(None);
        };

        if self.strategy == ServiceStatusStrategy::RecomputeOpenIncidents
            && service.status == target
        {
            return Ok(None);
        }

        debug!(
            service_id,
            previous = %service.status,
            new = %target,
            strategy = %self.strategy,
            "Deriving service status from incident"
        );
        set_service_status(conn, service, target).await.map(Some)
    }

    fn publish_service(&self, service: Option<services::Model>) {
        if let Some(service) = service {
            let response = ServiceResponse::from(service);
            self.events.publish(
                response.organization_id,
                EventKind::ServiceUpdated,
                json!({ "service": response }),
            );
        }
    }

    /// Open an incident against one of the organization's services.
    pub async fn create_incident(
        &self,
        auth: &AuthContext,
        organization_id: i32,
        request: CreateIncidentRequest,
    ) -> Result<IncidentDetail, StatusPageError> {
        self.policy.authorize(auth, organization_id).await?;
        find_organization(self.db.as_ref(), organization_id).await?;

        let (title, service_id) = match (non_blank(request.title.as_deref()), request.service_id)
        {
            (Some(title), Some(service_id)) => (title.to_string(), service_id),
            _ => {
                return Err(StatusPageError::Validation(
                    "Title and serviceId are required".to_string(),
                ))
            }
        };
        let impact = match non_blank(request.impact.as_deref()) {
            Some(impact) => parse_incident_impact(impact)?,
            None => IncidentImpact::Minor,
        };
        let status = match non_blank(request.status.as_deref()) {
            Some(status) => parse_incident_status(status)?,
            None => IncidentStatus::Investigating,
        };

        let service = services::Entity::find_by_id(service_id)
            .filter(services::Column::OrganizationId.eq(organization_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| StatusPageError::NotFound("Service not found".to_string()))?;

        let txn = self.db.begin().await?;

        let incident = incidents::ActiveModel {
            title: Set(title),
            status: Set(status),
            impact: Set(impact),
            service_id: Set(service.id),
            organization_id: Set(organization_id),
            resolved_at: Set(status.is_resolved().then(Utc::now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(message) = non_blank(request.message.as_deref()) {
            incident_updates::ActiveModel {
                incident_id: Set(incident.id),
                message: Set(message.to_string()),
                status: Set(status),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let service_change = self
            .derive_service_status(&txn, service.id, IncidentChange::Created(impact))
            .await?;
        let detail = incident_detail(&txn, incident, UpdateOrder::OldestFirst).await?;

        txn.commit().await?;

        info!(
            incident_id = detail.incident.id,
            service_id = service.id,
            organization_id,
            impact = %impact,
            "Created incident"
        );

        self.events.publish(
            organization_id,
            EventKind::IncidentCreated,
            json!({ "incident": &detail }),
        );
        self.publish_service(service_change);

        Ok(detail)
    }

    /// Incidents of an organization, newest first, optionally filtered by status.
    pub async fn list_incidents(
        &self,
        auth: &AuthContext,
        organization_id: i32,
        status: Option<&str>,
    ) -> Result<Vec<IncidentDetail>, StatusPageError> {
        self.policy.authorize(auth, organization_id).await?;
        find_organization(self.db.as_ref(), organization_id).await?;

        let status = non_blank(status).map(parse_incident_status).transpose()?;

        let mut query = incidents::Entity::find()
            .filter(incidents::Column::OrganizationId.eq(organization_id));
        if let Some(status) = status {
            query = query.filter(incidents::Column::Status.eq(status));
        }

        let incidents = query
            .order_by_desc(incidents::Column::CreatedAt)
            .order_by_desc(incidents::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(incident_details(self.db.as_ref(), incidents, UpdateOrder::NewestFirst, None).await?)
    }

    pub async fn get_incident(
        &self,
        auth: &AuthContext,
        incident_id: i32,
    ) -> Result<IncidentDetail, StatusPageError> {
        let incident = self.authorized_incident(auth, incident_id).await?;
        Ok(incident_detail(self.db.as_ref(), incident, UpdateOrder::OldestFirst).await?)
    }

    /// Write the provided fields. Resolving stamps `resolvedAt`.
    pub async fn update_incident(
        &self,
        auth: &AuthContext,
        incident_id: i32,
        request: PatchIncidentRequest,
    ) -> Result<IncidentDetail, StatusPageError> {
        let incident = self.authorized_incident(auth, incident_id).await?;

        // Empty values count as absent.
        let status = non_blank(request.status.as_deref())
            .map(parse_incident_status)
            .transpose()?;
        let impact = non_blank(request.impact.as_deref())
            .map(parse_incident_impact)
            .transpose()?;
        let title = non_blank(request.title.as_deref()).map(str::to_string);

        let resolved = status.is_some_and(|s| s.is_resolved());
        let organization_id = incident.organization_id;
        let service_id = incident.service_id;

        let txn = self.db.begin().await?;

        let mut active: incidents::ActiveModel = incident.into();
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(impact) = impact {
            active.impact = Set(impact);
        }
        if let Some(title) = title {
            active.title = Set(title);
        }
        if resolved {
            active.resolved_at = Set(Some(Utc::now()));
        }
        let updated = active.update(&txn).await?;

        let change = if resolved {
            IncidentChange::Resolved
        } else {
            IncidentChange::Patched
        };
        let service_change = self.derive_service_status(&txn, service_id, change).await?;
        let detail = incident_detail(&txn, updated, UpdateOrder::OldestFirst).await?;

        txn.commit().await?;

        let kind = if resolved {
            info!(incident_id, service_id, "Resolved incident");
            EventKind::IncidentResolved
        } else {
            EventKind::IncidentUpdated
        };
        self.events
            .publish(organization_id, kind, json!({ "incident": &detail }));
        self.publish_service(service_change);

        Ok(detail)
    }

    /// Append an update and move the incident to the update's status.
    pub async fn add_incident_update(
        &self,
        auth: &AuthContext,
        incident_id: i32,
        request: CreateIncidentUpdateRequest,
    ) -> Result<IncidentUpdateResponse, StatusPageError> {
        let incident = self.authorized_incident(auth, incident_id).await?;

        let (message, status) = match (
            non_blank(request.message.as_deref()),
            non_blank(request.status.as_deref()),
        ) {
            (Some(message), Some(status)) => (message.to_string(), status),
            _ => {
                return Err(StatusPageError::Validation(
                    "Message and status are required".to_string(),
                ))
            }
        };
        let status = parse_incident_status(status)?;

        let organization_id = incident.organization_id;
        let service_id = incident.service_id;

        let txn = self.db.begin().await?;

        let update = incident_updates::ActiveModel {
            incident_id: Set(incident.id),
            message: Set(message),
            status: Set(status),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut active: incidents::ActiveModel = incident.into();
        active.status = Set(status);
        active.update(&txn).await?;

        let service_change = self
            .derive_service_status(&txn, service_id, IncidentChange::UpdateAdded)
            .await?;

        txn.commit().await?;

        debug!(incident_id, update_id = update.id, status = %status, "Added incident update");

        let response = IncidentUpdateResponse::from(update);
        self.events.publish(
            organization_id,
            EventKind::IncidentUpdated,
            json!({ "incidentId": incident_id, "update": &response }),
        );
        self.publish_service(service_change);

        Ok(response)
    }
}
