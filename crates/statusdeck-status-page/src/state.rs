use sea_orm::DatabaseConnection;
use statusdeck_auth::AccessPolicy;
use statusdeck_config::ServiceStatusStrategy;
use statusdeck_realtime::{EventHub, EventPublisher, RealtimeAppState};
use std::sync::Arc;

use crate::services::{IncidentService, OrganizationService, PublicStatusService, ServiceRegistry};

/// Application state trait for status page routes
pub trait StatusPageAppState: Send + Sync + 'static {
    fn organization_service(&self) -> &OrganizationService;
    fn service_registry(&self) -> &ServiceRegistry;
    fn incident_service(&self) -> &IncidentService;
    fn public_status_service(&self) -> &PublicStatusService;
}

/// Services wired to one database, event hub and access policy.
pub struct StatusPageState {
    pub organizations: OrganizationService,
    pub services: ServiceRegistry,
    pub incidents: IncidentService,
    pub public_status: PublicStatusService,
    hub: EventHub,
}

impl StatusPageState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        hub: EventHub,
        policy: Arc<dyn AccessPolicy>,
        strategy: ServiceStatusStrategy,
    ) -> Self {
        let events: Arc<dyn EventPublisher> = Arc::new(hub.clone());

        Self {
            organizations: OrganizationService::new(db.clone(), policy.clone()),
            services: ServiceRegistry::new(db.clone(), events.clone(), policy.clone()),
            incidents: IncidentService::new(db.clone(), events, policy, strategy),
            public_status: PublicStatusService::new(db),
            hub,
        }
    }
}

impl StatusPageAppState for StatusPageState {
    fn organization_service(&self) -> &OrganizationService {
        &self.organizations
    }

    fn service_registry(&self) -> &ServiceRegistry {
        &self.services
    }

    fn incident_service(&self) -> &IncidentService {
        &self.incidents
    }

    fn public_status_service(&self) -> &PublicStatusService {
        &self.public_status
    }
}

impl RealtimeAppState for StatusPageState {
    fn event_hub(&self) -> &EventHub {
        &self.hub
    }
}
