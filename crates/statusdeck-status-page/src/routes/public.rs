use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use statusdeck_core::{ErrorBody, Problem};

use super::map_error;
use crate::services::{IncidentDetail, PublicStatusResponse};
use crate::state::StatusPageAppState;

/// Kept as a string so a bad value yields the API's own 400.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

/// Public status page of an organization
#[utoipa::path(
    get,
    path = "/public/status/{slug}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
    ),
    responses(
        (status = 200, description = "Current status", body = PublicStatusResponse),
        (status = 404, description = "Status page not found", body = ErrorBody),
    ),
    tag = "Public"
)]
pub async fn get_public_status<T>(
    State(app_state): State<Arc<T>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .public_status_service()
        .get_public_status(&slug)
        .await
        .map(Json)
        .map_err(map_error)
}

/// Recently resolved incidents
#[utoipa::path(
    get,
    path = "/public/status/{slug}/history",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("limit" = Option<u64>, Query, description = "Maximum incidents to return (default 10, at most 100)"),
    ),
    responses(
        (status = 200, description = "Resolved incidents, latest first", body = Vec<IncidentDetail>),
        (status = 400, description = "Invalid limit", body = ErrorBody),
        (status = 404, description = "Status page not found", body = ErrorBody),
    ),
    tag = "Public"
)]
pub async fn get_public_history<T>(
    State(app_state): State<Arc<T>>,
    Path(slug): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, Problem>
where
    T: StatusPageAppState,
{
    app_state
        .public_status_service()
        .get_public_history(&slug, query.limit.as_deref())
        .await
        .map(Json)
        .map_err(map_error)
}
