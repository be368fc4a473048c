use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::json;
use statusdeck_auth::{AccessPolicy, AuthContext};
use statusdeck_core::non_blank;
use statusdeck_entities::types::{IncidentStatus, ServiceStatus};
use statusdeck_entities::{incidents, services};
use statusdeck_realtime::{EventKind, EventPublisher};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::loaders::{find_organization, ordered_services, updates_by_incident};
use super::types::{
    parse_service_status, CreateServiceRequest, IncidentUpdateResponse, OpenIncidentSummary,
    PatchServiceRequest, ServiceDetail, ServiceListItem, ServiceResponse, StatusPageError,
    UpdateServiceRequest, UpdateServiceStatusRequest,
};

const NAME_REQUIRED: &str = "Service name is required";

/// CRUD for the services shown on a status page.
pub struct ServiceRegistry {
    db: Arc<DatabaseConnection>,
    events: Arc<dyn EventPublisher>,
    policy: Arc<dyn AccessPolicy>,
}

impl ServiceRegistry {
    pub fn new(
        db: Arc<DatabaseConnection>,
        events: Arc<dyn EventPublisher>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self { db, events, policy }
    }

    /// Load a service and check the caller may act on its organization.
    async fn authorized_service(
        &self,
        auth: &AuthContext,
        service_id: i32,
    ) -> Result<services::Model, StatusPageError> {
        let service = services::Entity::find_by_id(service_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| StatusPageError::NotFound("Service not found".to_string()))?;

        self.policy.authorize(auth, service.organization_id).await?;
        Ok(service)
    }

    pub async fn create_service(
        &self,
        auth: &AuthContext,
        organization_id: i32,
        request: CreateServiceRequest,
    ) -> Result<ServiceResponse, StatusPageError> {
        self.policy.authorize(auth, organization_id).await?;
        find_organization(self.db.as_ref(), organization_id).await?;

        let name = non_blank(request.name.as_deref())
            .ok_or_else(|| StatusPageError::Validation(NAME_REQUIRED.to_string()))?
            .to_string();
        let status = match non_blank(request.status.as_deref()) {
            Some(status) => parse_service_status(status)?,
            None => ServiceStatus::Operational,
        };

        let service = services::ActiveModel {
            name: Set(name),
            description: Set(non_blank(request.description.as_deref()).map(str::to_string)),
            status: Set(status),
            order: Set(request.order.unwrap_or(0)),
            organization_id: Set(organization_id),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(
            service_id = service.id,
            organization_id,
            name = %service.name,
            "Created service"
        );

        let response = ServiceResponse::from(service);
        self.events.publish(
            organization_id,
            EventKind::ServiceCreated,
            json!({ "service": &response }),
        );
        Ok(response)
    }

    /// Services in display order, each with its count of unresolved incidents.
    pub async fn list_services(
        &self,
        auth: &AuthContext,
        organization_id: i32,
    ) -> Result<Vec<ServiceListItem>, StatusPageError> {
        self.policy.authorize(auth, organization_id).await?;
        find_organization(self.db.as_ref(), organization_id).await?;

        let services = ordered_services(self.db.as_ref(), organization_id).await?;

        let open_service_ids: Vec<i32> = incidents::Entity::find()
            .select_only()
            .column(incidents::Column::ServiceId)
            .filter(incidents::Column::OrganizationId.eq(organization_id))
            .filter(incidents::Column::Status.ne(IncidentStatus::Resolved))
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await?;

        let mut open_counts: HashMap<i32, u64> = HashMap::new();
        for service_id in open_service_ids {
            *open_counts.entry(service_id).or_default() += 1;
        }

        Ok(services
            .into_iter()
            .map(|service| ServiceListItem {
                open_incident_count: open_counts.get(&service.id).copied().unwrap_or(0),
                service: service.into(),
            })
            .collect())
    }

    /// A service with its open incidents and the latest update of each.
    pub async fn get_service(
        &self,
        auth: &AuthContext,
        service_id: i32,
    ) -> Result<ServiceDetail, StatusPageError> {
        let service = self.authorized_service(auth, service_id).await?;

        let open_incidents = incidents::Entity::find()
            .filter(incidents::Column::ServiceId.eq(service_id))
            .filter(incidents::Column::Status.ne(IncidentStatus::Resolved))
            .order_by_desc(incidents::Column::CreatedAt)
            .order_by_desc(incidents::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let ids: Vec<i32> = open_incidents.iter().map(|i| i.id).collect();
        let mut updates = updates_by_incident(self.db.as_ref(), &ids).await?;

        let incidents = open_incidents
            .into_iter()
            .map(|incident| {
                let latest_update = updates
                    .remove(&incident.id)
                    .and_then(|mut list| list.pop())
                    .map(IncidentUpdateResponse::from);
                OpenIncidentSummary {
                    incident: incident.into(),
                    latest_update,
                }
            })
            .collect();

        Ok(ServiceDetail {
            service: service.into(),
            incidents,
        })
    }

    /// Replace a service. A missing description is cleared, missing status and order are kept.
    pub async fn update_service(
        &self,
        auth: &AuthContext,
        service_id: i32,
        request: UpdateServiceRequest,
    ) -> Result<ServiceResponse, StatusPageError> {
        let service = self.authorized_service(auth, service_id).await?;

        let name = non_blank(request.name.as_deref())
            .ok_or_else(|| StatusPageError::Validation(NAME_REQUIRED.to_string()))?
            .to_string();
        let status = request
            .status
            .as_deref()
            .map(parse_service_status)
            .transpose()?;

        let mut active: services::ActiveModel = service.into();
        active.name = Set(name);
        active.description = Set(non_blank(request.description.as_deref()).map(str::to_string));
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(order) = request.order {
            active.order = Set(order);
        }

        let updated = active.update(self.db.as_ref()).await?;
        Ok(self.publish_updated(updated))
    }

    /// Write only the fields present in the request.
    pub async fn patch_service(
        &self,
        auth: &AuthContext,
        service_id: i32,
        request: PatchServiceRequest,
    ) -> Result<ServiceResponse, StatusPageError> {
        let service = self.authorized_service(auth, service_id).await?;

        let name = match request.name.as_deref() {
            Some(name) => Some(
                non_blank(Some(name))
                    .ok_or_else(|| StatusPageError::Validation(NAME_REQUIRED.to_string()))?
                    .to_string(),
            ),
            None => None,
        };
        let status = request
            .status
            .as_deref()
            .map(parse_service_status)
            .transpose()?;

        let mut active: services::ActiveModel = service.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(non_blank(description.as_deref()).map(str::to_string));
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(order) = request.order {
            active.order = Set(order);
        }

        let updated = active.update(self.db.as_ref()).await?;
        Ok(self.publish_updated(updated))
    }

    pub async fn update_service_status(
        &self,
        auth: &AuthContext,
        service_id: i32,
        request: UpdateServiceStatusRequest,
    ) -> Result<ServiceResponse, StatusPageError> {
        let service = self.authorized_service(auth, service_id).await?;

        let new_status = match request.status.as_deref() {
            Some(status) => parse_service_status(status)?,
            None => {
                return Err(StatusPageError::Validation(
                    "Status is required".to_string(),
                ))
            }
        };
        let previous_status = service.status;

        let mut active: services::ActiveModel = service.into();
        active.status = Set(new_status);
        let updated = active.update(self.db.as_ref()).await?;

        info!(
            service_id,
            previous = %previous_status,
            new = %new_status,
            "Service status changed"
        );

        let response = ServiceResponse::from(updated);
        self.events.publish(
            response.organization_id,
            EventKind::ServiceUpdated,
            json!({
                "service": &response,
                "statusChanged": true,
                "previousStatus": previous_status,
                "newStatus": new_status,
            }),
        );
        Ok(response)
    }

    /// Delete a service. Its incidents go with it.
    pub async fn delete_service(
        &self,
        auth: &AuthContext,
        service_id: i32,
    ) -> Result<(), StatusPageError> {
        let service = self.authorized_service(auth, service_id).await?;

        services::Entity::delete_by_id(service.id)
            .exec(self.db.as_ref())
            .await?;

        info!(service_id, name = %service.name, "Deleted service");

        self.events.publish(
            service.organization_id,
            EventKind::ServiceDeleted,
            json!({ "serviceId": service.id, "serviceName": service.name }),
        );
        Ok(())
    }

    fn publish_updated(&self, service: services::Model) -> ServiceResponse {
        let response = ServiceResponse::from(service);
        self.events.publish(
            response.organization_id,
            EventKind::ServiceUpdated,
            json!({ "service": &response }),
        );
        response
    }
}
