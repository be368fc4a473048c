use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// A wire name that matches no variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn find_variant<T: Copy>(
    kind: &'static str,
    variants: &[T],
    name: impl Fn(&T) -> &'static str,
    s: &str,
) -> Result<T, UnknownVariant> {
    variants
        .iter()
        .copied()
        .find(|v| name(v) == s)
        .ok_or_else(|| UnknownVariant {
            kind,
            value: s.to_string(),
        })
}

/// Operational state of a service as shown on the status page.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    #[sea_orm(string_value = "OPERATIONAL")]
    Operational,
    #[sea_orm(string_value = "DEGRADED_PERFORMANCE")]
    DegradedPerformance,
    #[sea_orm(string_value = "PARTIAL_OUTAGE")]
    PartialOutage,
    #[sea_orm(string_value = "MAJOR_OUTAGE")]
    MajorOutage,
    #[sea_orm(string_value = "UNDER_MAINTENANCE")]
    UnderMaintenance,
}

impl FromStr for ServiceStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_variant("service status", &Self::ALL, ServiceStatus::as_str, s)
    }
}

impl Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 5] = [
        ServiceStatus::Operational,
        ServiceStatus::DegradedPerformance,
        ServiceStatus::PartialOutage,
        ServiceStatus::MajorOutage,
        ServiceStatus::UnderMaintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "OPERATIONAL",
            ServiceStatus::DegradedPerformance => "DEGRADED_PERFORMANCE",
            ServiceStatus::PartialOutage => "PARTIAL_OUTAGE",
            ServiceStatus::MajorOutage => "MAJOR_OUTAGE",
            ServiceStatus::UnderMaintenance => "UNDER_MAINTENANCE",
        }
    }


    /// Wire names of every status, used in validation errors.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

/// Lifecycle stage of an incident. Any stage may follow any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    #[sea_orm(string_value = "INVESTIGATING")]
    Investigating,
    #[sea_orm(string_value = "IDENTIFIED")]
    Identified,
    #[sea_orm(string_value = "MONITORING")]
    Monitoring,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
}

impl FromStr for IncidentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_variant("incident status", &Self::ALL, IncidentStatus::as_str, s)
    }
}

impl Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        IncidentStatus::Investigating,
        IncidentStatus::Identified,
        IncidentStatus::Monitoring,
        IncidentStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "INVESTIGATING",
            IncidentStatus::Identified => "IDENTIFIED",
            IncidentStatus::Monitoring => "MONITORING",
            IncidentStatus::Resolved => "RESOLVED",
        }
    }


    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, IncidentStatus::Resolved)
    }
}

/// How badly an incident affects its service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentImpact {
    #[sea_orm(string_value = "MINOR")]
    Minor,
    #[sea_orm(string_value = "MAJOR")]
    Major,
    #[sea_orm(string_value = "CRITICAL")]
    Critical,
}

impl FromStr for IncidentImpact {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_variant("incident impact", &Self::ALL, IncidentImpact::as_str, s)
    }
}

impl Display for IncidentImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl IncidentImpact {
    pub const ALL: [IncidentImpact; 3] = [
        IncidentImpact::Minor,
        IncidentImpact::Major,
        IncidentImpact::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentImpact::Minor => "MINOR",
            IncidentImpact::Major => "MAJOR",
            IncidentImpact::Critical => "CRITICAL",
        }
    }


    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }

    /// Service status implied by an open incident of this impact.
    pub fn service_status(&self) -> ServiceStatus {
        match self {
            IncidentImpact::Critical => ServiceStatus::MajorOutage,
            IncidentImpact::Major => ServiceStatus::PartialOutage,
            IncidentImpact::Minor => ServiceStatus::DegradedPerformance,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "MEMBER")]
    Member,
}

impl FromStr for MemberRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_variant(
            "member role",
            &[MemberRole::Admin, MemberRole::Member],
            MemberRole::as_str,
            s,
        )
    }
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "ADMIN",
            MemberRole::Member => "MEMBER",
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_round_trip_names() {
        for status in ServiceStatus::ALL {
            assert_eq!(status.as_str().parse::<ServiceStatus>(), Ok(status));
        }
        let err = "operational".parse::<ServiceStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown service status 'operational'");
        assert_eq!("MEMBER".parse::<MemberRole>(), Ok(MemberRole::Member));
        assert!("OWNER".parse::<MemberRole>().is_err());
        assert_eq!(ServiceStatus::names().len(), 5);
    }

    #[test]
    fn test_impact_maps_to_service_status() {
        assert_eq!(
            IncidentImpact::Critical.service_status(),
            ServiceStatus::MajorOutage
        );
        assert_eq!(
            IncidentImpact::Major.service_status(),
            ServiceStatus::PartialOutage
        );
        assert_eq!(
            IncidentImpact::Minor.service_status(),
            ServiceStatus::DegradedPerformance
        );
    }

    #[test]
    fn test_impact_ordering() {
        assert!(IncidentImpact::Critical > IncidentImpact::Major);
        assert!(IncidentImpact::Major > IncidentImpact::Minor);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ServiceStatus::UnderMaintenance).unwrap();
        assert_eq!(json, "\"UNDER_MAINTENANCE\"");

        let status: IncidentStatus = serde_json::from_str("\"MONITORING\"").unwrap();
        assert_eq!(status, IncidentStatus::Monitoring);
        assert!(IncidentStatus::Resolved.is_resolved());
    }
}
