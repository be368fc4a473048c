pub use super::incident_updates::Entity as IncidentUpdates;
pub use super::incidents::Entity as Incidents;
pub use super::members::Entity as Members;
pub use super::organizations::Entity as Organizations;
pub use super::services::Entity as Services;
