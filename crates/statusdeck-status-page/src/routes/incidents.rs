use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use statusdeck_auth::RequireAuth;
use statusdeck_core::{ApiJson, ErrorBody, Problem};

use super::map_error;
use crate::services::{
    CreateIncidentRequest, CreateIncidentUpdateRequest, IncidentDetail, IncidentUpdateResponse,
    PatchIncidentRequest,
};
use crate::state::StatusPageAppState;

#[derive(Debug, Default, Deserialize)]
pub struct IncidentListQuery {
    pub status: Option<String>,
}

/// Open an incident against a service
#[utoipa::path(
    post,
    path = "/organizations/{organization_id}/incidents",
    request_body = CreateIncidentRequest,
    params(
        ("organization_id" = i32, Path, description = "Organization ID"),
    ),
    responses(
        (status = 201, description = "Incident created", body = IncidentDetail),
        (status = 400, description = "Missing title/serviceId or invalid enum value", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Organization or service not found", body = ErrorBody),
    ),
    tag = "Incidents"
)]
pub async fn create_incident<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(organization_id): Path<i32>,
    ApiJson(request): ApiJson<CreateIncidentRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .incident_service()
        .create_incident(&auth, organization_id, request)
        .await
        .map(|incident| (StatusCode::CREATED, Json(incident)))
        .map_err(map_error)
}

/// List incidents, newest first
#[utoipa::path(
    get,
    path = "/organizations/{organization_id}/incidents",
    params(
        ("organization_id" = i32, Path, description = "Organization ID"),
        ("status" = Option<String>, Query, description = "Only incidents with this status"),
    ),
    responses(
        (status = 200, description = "Incidents with service and updates", body = Vec<IncidentDetail>),
        (status = 400, description = "Invalid status filter", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Organization not found", body = ErrorBody),
    ),
    tag = "Incidents"
)]
pub async fn list_incidents<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(organization_id): Path<i32>,
    Query(query): Query<IncidentListQuery>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .incident_service()
        .list_incidents(&auth, organization_id, query.status.as_deref())
        .await
        .map(Json)
        .map_err(map_error)
}

/// Get an incident with its full update timeline
#[utoipa::path(
    get,
    path = "/incidents/{id}",
    params(
        ("id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 200, description = "Incident found", body = IncidentDetail),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Incident not found", body = ErrorBody),
    ),
    tag = "Incidents"
)]
pub async fn get_incident<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .incident_service()
        .get_incident(&auth, id)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Update an incident, resolving it when the status is RESOLVED
#[utoipa::path(
    patch,
    path = "/incidents/{id}",
    request_body = PatchIncidentRequest,
    params(
        ("id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 200, description = "Incident updated", body = IncidentDetail),
        (status = 400, description = "Invalid field value", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Incident not found", body = ErrorBody),
    ),
    tag = "Incidents"
)]
pub async fn update_incident<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<PatchIncidentRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .incident_service()
        .update_incident(&auth, id, request)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Post an update to an incident
#[utoipa::path(
    post,
    path = "/incidents/{id}/updates",
    request_body = CreateIncidentUpdateRequest,
    params(
        ("id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 201, description = "Update recorded", body = IncidentUpdateResponse),
        (status = 400, description = "Missing message/status or invalid status", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Incident not found", body = ErrorBody),
    ),
    tag = "Incidents"
)]
pub async fn add_incident_update<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<CreateIncidentUpdateRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .incident_service()
        .add_incident_update(&auth, id, request)
        .await
        .map(|update| (StatusCode::CREATED, Json(update)))
        .map_err(map_error)
}
