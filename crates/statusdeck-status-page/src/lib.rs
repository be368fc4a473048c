//! Organizations, services, incidents and the public status view

pub mod routes;
pub mod services;
mod state;


pub use routes::{create_router, StatusPageApiDoc};
pub use services::{
    IncidentService, OrganizationService, OverallStatus, PublicStatusService, ServiceRegistry,
    StatusPageError,
};
pub use state::{StatusPageAppState, StatusPageState};
