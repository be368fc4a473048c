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
use crate::services::{
    CreateServiceRequest, PatchServiceRequest, ServiceDetail, ServiceListItem, ServiceResponse,
    UpdateServiceRequest, UpdateServiceStatusRequest,
};
use crate::state::StatusPageAppState;

/// Create a service
#[utoipa::path(
    post,
    path = "/organizations/{organization_id}/services",
    request_body = CreateServiceRequest,
    params(
        ("organization_id" = i32, Path, description = "Organization ID"),
    ),
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Missing name or invalid status", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Organization not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn create_service<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(organization_id): Path<i32>,
    ApiJson(request): ApiJson<CreateServiceRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .create_service(&auth, organization_id, request)
        .await
        .map(|service| (StatusCode::CREATED, Json(service)))
        .map_err(map_error)
}

/// List services in display order
#[utoipa::path(
    get,
    path = "/organizations/{organization_id}/services",
    params(
        ("organization_id" = i32, Path, description = "Organization ID"),
    ),
    responses(
        (status = 200, description = "Services with open incident counts", body = Vec<ServiceListItem>),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Organization not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn list_services<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(organization_id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .list_services(&auth, organization_id)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Get a service with its open incidents
#[utoipa::path(
    get,
    path = "/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID"),
    ),
    responses(
        (status = 200, description = "Service found", body = ServiceDetail),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn get_service<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .get_service(&auth, id)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Replace a service
#[utoipa::path(
    put,
    path = "/services/{id}",
    request_body = UpdateServiceRequest,
    params(
        ("id" = i32, Path, description = "Service ID"),
    ),
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, description = "Missing name or invalid status", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn update_service<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<UpdateServiceRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .update_service(&auth, id, request)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Update only the fields present in the body
#[utoipa::path(
    patch,
    path = "/services/{id}",
    request_body = PatchServiceRequest,
    params(
        ("id" = i32, Path, description = "Service ID"),
    ),
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, description = "Invalid field value", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn patch_service<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<PatchServiceRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .patch_service(&auth, id, request)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Set a service's status
#[utoipa::path(
    patch,
    path = "/services/{id}/status",
    request_body = UpdateServiceStatusRequest,
    params(
        ("id" = i32, Path, description = "Service ID"),
    ),
    responses(
        (status = 200, description = "Status changed", body = ServiceResponse),
        (status = 400, description = "Missing or invalid status", body = ErrorBody),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn update_service_status<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<UpdateServiceStatusRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .update_service_status(&auth, id, request)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Delete a service and its incidents
#[utoipa::path(
    delete,
    path = "/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID"),
    ),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    tag = "Services"
)]
pub async fn delete_service<T>(
    State(app_state): State<Arc<T>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .service_registry()
        .delete_service(&auth, id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(map_error)
}
