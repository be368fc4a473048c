pub mod incident_service;
pub mod loaders;
pub mod organization_service;
pub mod public_status_service;
pub mod service_registry;
pub mod types;

pub use incident_service::IncidentService;
pub use organization_service::OrganizationService;
pub use public_status_service::{OverallStatus, PublicStatusService};
pub use service_registry::ServiceRegistry;
pub use types::*;
