use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use statusdeck_auth::RequireAuth;
use statusdeck_core::{ApiJson, ErrorBody, Problem};

use super::map_error;
use crate::services::{CreateOrganizationRequest, OrganizationDetail, OrganizationSummary};
use crate::state::StatusPageAppState;

/// Create an organization, making the caller its admin
#[utoipa::path(
    post,
    path = "/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationDetail),
        (status = 400, description = "Missing name or malformed slug", body = ErrorBody),
        (status = 401, description = "No identity", body = ErrorBody),
        (status = 409, description = "Slug already taken", body = ErrorBody),
    ),
    tag = "Organizations"
)]
pub async fn create_organization<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    ApiJson(request): ApiJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .organization_service()
        .create_organization(&auth, request)
        .await
        .map(|organization| (StatusCode::CREATED, Json(organization)))
        .map_err(map_error)
}

/// List the caller's organizations
#[utoipa::path(
    get,
    path = "/organizations",
    responses(
        (status = 200, description = "Organizations the caller belongs to", body = Vec<OrganizationSummary>),
        (status = 401, description = "No identity", body = ErrorBody),
    ),
    tag = "Organizations"
)]
pub async fn list_organizations<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .organization_service()
        .list_organizations(&auth)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Get an organization with its members
#[utoipa::path(
    get,
    path = "/organizations/{id}",
    params(
        ("id" = i32, Path, description = "Organization ID"),
    ),
    responses(
        (status = 200, description = "Organization found", body = OrganizationDetail),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Organization not found", body = ErrorBody),
    ),
    tag = "Organizations"
)]
pub async fn get_organization<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .organization_service()
        .get_organization(&auth, id)
        .await
        .map(Json)
        .map_err(map_error)
}
