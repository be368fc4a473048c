use serde::{Deserialize, Serialize};
use statusdeck_auth::AccessError;
use statusdeck_core::{deserialize_present, UtcDateTime};
use statusdeck_entities::types::{IncidentImpact, IncidentStatus, MemberRole, ServiceStatus};
use statusdeck_entities::{incident_updates, incidents, members, organizations, services};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum StatusPageError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    /// A value outside an enumerated set; `key` names the list of allowed values.
    #[error("{error}")]
    InvalidValue {
        error: String,
        key: &'static str,
        allowed: Vec<&'static str>,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("Access denied")]
    Forbidden,
}

impl From<AccessError> for StatusPageError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotMember { .. } => StatusPageError::Forbidden,
            AccessError::Database(e) => StatusPageError::Database(e),
        }
    }
}

pub fn parse_service_status(value: &str) -> Result<ServiceStatus, StatusPageError> {
    value.parse::<ServiceStatus>().map_err(|_| StatusPageError::InvalidValue {
        error: "Invalid status".to_string(),
        key: "validStatuses",
        allowed: ServiceStatus::names(),
    })
}

pub fn parse_incident_status(value: &str) -> Result<IncidentStatus, StatusPageError> {
    value.parse::<IncidentStatus>().map_err(|_| StatusPageError::InvalidValue {
        error: "Invalid status".to_string(),
        key: "validStatuses",
        allowed: IncidentStatus::names(),
    })
}

pub fn parse_incident_impact(value: &str) -> Result<IncidentImpact, StatusPageError> {
    value.parse::<IncidentImpact>().map_err(|_| StatusPageError::InvalidValue {
        error: "Invalid impact".to_string(),
        key: "validImpacts",
        allowed: IncidentImpact::names(),
    })
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: UtcDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: i32,
    pub user_id: String,
    pub email: String,
    pub role: MemberRole,
    pub organization_id: i32,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: UtcDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrganizationCounts {
    pub services: u64,
    pub incidents: u64,
}

/// Organization as seen by one of its members.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub role: MemberRole,
    pub counts: OrganizationCounts,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetail {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub members: Vec<MemberResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<OrganizationCounts>,
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

/// Full replacement of a service (PUT).
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

/// Partial update of a service (PATCH). Absent fields are left alone and an
/// explicit `null` description clears it.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PatchServiceRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateServiceStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: ServiceStatus,
    pub order: i32,
    pub organization_id: i32,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: UtcDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListItem {
    #[serde(flatten)]
    pub service: ServiceResponse,
    /// Incidents of this service that are not resolved
    pub open_incident_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenIncidentSummary {
    #[serde(flatten)]
    pub incident: IncidentResponse,
    pub latest_update: Option<IncidentUpdateResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: ServiceResponse,
    pub incidents: Vec<OpenIncidentSummary>,
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    pub title: Option<String>,
    pub service_id: Option<i32>,
    pub impact: Option<String>,
    pub status: Option<String>,
    /// Recorded as the first update when present
    pub message: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PatchIncidentRequest {
    pub status: Option<String>,
    pub title: Option<String>,
    pub impact: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateIncidentUpdateRequest {
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentResponse {
    pub id: i32,
    pub title: String,
    pub status: IncidentStatus,
    pub impact: IncidentImpact,
    pub service_id: i32,
    pub organization_id: i32,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub resolved_at: Option<UtcDateTime>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: UtcDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdateResponse {
    pub id: i32,
    pub incident_id: i32,
    pub message: String,
    pub status: IncidentStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: UtcDateTime,
}

/// Incident with its service and updates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDetail {
    #[serde(flatten)]
    pub incident: IncidentResponse,
    pub service: ServiceResponse,
    pub updates: Vec<IncidentUpdateResponse>,
}

// ---------------------------------------------------------------------------
// Public status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicOrganization {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicStatusResponse {
    pub organization: PublicOrganization,
    /// One of "All Systems Operational", "Under Maintenance",
    /// "Degraded Performance", "Major Outage"
    pub overall_status: String,
    pub services: Vec<ServiceResponse>,
    pub active_incidents: Vec<IncidentDetail>,
    #[schema(value_type = String, format = "date-time")]
    pub last_updated: UtcDateTime,
}

// From implementations
impl From<organizations::Model> for OrganizationResponse {
    fn from(model: organizations::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<organizations::Model> for PublicOrganization {
    fn from(model: organizations::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
        }
    }
}

impl From<members::Model> for MemberResponse {
    fn from(model: members::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            role: model.role,
            organization_id: model.organization_id,
            created_at: model.created_at,
        }
    }
}

impl From<services::Model> for ServiceResponse {
    fn from(model: services::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            status: model.status,
            order: model.order,
            organization_id: model.organization_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<incidents::Model> for IncidentResponse {
    fn from(model: incidents::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            status: model.status,
            impact: model.impact,
            service_id: model.service_id,
            organization_id: model.organization_id,
            resolved_at: model.resolved_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<incident_updates::Model> for IncidentUpdateResponse {
    fn from(model: incident_updates::Model) -> Self {
        Self {
            id: model.id,
            incident_id: model.incident_id,
            message: model.message,
            status: model.status,
            created_at: model.created_at,
        }
    }
}
