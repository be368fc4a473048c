use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use statusdeck_core::error_builder::{
    conflict, database_error, forbidden, not_found, validation_error,
};
use statusdeck_core::{ErrorBody, Problem};
use statusdeck_entities::types::{IncidentImpact, IncidentStatus, MemberRole, ServiceStatus};
use utoipa::OpenApi;

use crate::services::*;
use crate::state::StatusPageAppState;

pub mod incidents;
pub mod organizations;
pub mod public;
pub mod services;

/// OpenAPI documentation for the status page API
#[derive(OpenApi)]
#[openapi(
    paths(
        organizations::create_organization,
        organizations::list_organizations,
        organizations::get_organization,
        services::create_service,
        services::list_services,
        services::get_service,
        services::update_service,
        services::patch_service,
        services::update_service_status,
        services::delete_service,
        incidents::create_incident,
        incidents::list_incidents,
        incidents::get_incident,
        incidents::update_incident,
        incidents::add_incident_update,
        public::get_public_status,
        public::get_public_history,
    ),
    components(
        schemas(
            ErrorBody,
            ServiceStatus,
            IncidentStatus,
            IncidentImpact,
            MemberRole,
            CreateOrganizationRequest,
            OrganizationResponse,
            OrganizationSummary,
            OrganizationDetail,
            OrganizationCounts,
            MemberResponse,
            CreateServiceRequest,
            UpdateServiceRequest,
            PatchServiceRequest,
            UpdateServiceStatusRequest,
            ServiceResponse,
            ServiceListItem,
            ServiceDetail,
            OpenIncidentSummary,
            CreateIncidentRequest,
            PatchIncidentRequest,
            CreateIncidentUpdateRequest,
            IncidentResponse,
            IncidentUpdateResponse,
            IncidentDetail,
            PublicOrganization,
            PublicStatusResponse,
        )
    ),
    tags(
        (name = "Organizations", description = "Organizations and membership"),
        (name = "Services", description = "Services shown on a status page"),
        (name = "Incidents", description = "Incident lifecycle and updates"),
        (name = "Public", description = "Unauthenticated status page views"),
    )
)]
pub struct StatusPageApiDoc;

pub fn create_router<T>() -> Router<Arc<T>>
where
    T: StatusPageAppState,
{
    Router::new()
        .route(
            "/organizations",
            post(organizations::create_organization::<T>).get(organizations::list_organizations::<T>),
        )
        .route("/organizations/{id}", get(organizations::get_organization::<T>))
        .route(
            "/organizations/{organization_id}/services",
            post(services::create_service::<T>).get(services::list_services::<T>),
        )
        .route(
            "/services/{id}",
            get(services::get_service::<T>)
                .put(services::update_service::<T>)
                .patch(services::patch_service::<T>)
                .delete(services::delete_service::<T>),
        )
        .route("/services/{id}/status", patch(services::update_service_status::<T>))
        .route(
            "/organizations/{organization_id}/incidents",
            post(incidents::create_incident::<T>).get(incidents::list_incidents::<T>),
        )
        .route(
            "/incidents/{id}",
            get(incidents::get_incident::<T>).patch(incidents::update_incident::<T>),
        )
        .route("/incidents/{id}/updates", post(incidents::add_incident_update::<T>))
        .route("/public/status/{slug}", get(public::get_public_status::<T>))
        .route(
            "/public/status/{slug}/history",
            get(public::get_public_history::<T>),
        )
}

pub(crate) fn map_error(error: StatusPageError) -> Problem {
    match error {
        StatusPageError::NotFound(msg) => not_found().error(msg).build(),
        StatusPageError::Validation(msg) => validation_error().error(msg).build(),
        StatusPageError::InvalidValue {
            error,
            key,
            allowed,
        } => validation_error().error(error).value(key, allowed).build(),
        StatusPageError::Conflict(msg) => conflict().error(msg).build(),
        StatusPageError::Forbidden => forbidden().build(),
        StatusPageError::Database(err) => {
            tracing::error!("Database error: {}", err);
            database_error().build()
        }
    }
}
