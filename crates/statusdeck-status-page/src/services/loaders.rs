//! Query helpers shared by the services.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use statusdeck_entities::types::{IncidentImpact, IncidentStatus, ServiceStatus};
use statusdeck_entities::{incident_updates, incidents, organizations, services};
use std::collections::HashMap;

use super::types::{
    IncidentDetail, IncidentUpdateResponse, OrganizationCounts, ServiceResponse, StatusPageError,
};

/// Order in which updates are attached to an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrder {
    OldestFirst,
    NewestFirst,
}

pub async fn find_organization<C: ConnectionTrait>(
    conn: &C,
    organization_id: i32,
) -> Result<organizations::Model, StatusPageError> {
    organizations::Entity::find_by_id(organization_id)
        .one(conn)
        .await?
        .ok_or_else(|| StatusPageError::NotFound("Organization not found".to_string()))
}

pub async fn organization_counts<C: ConnectionTrait>(
    conn: &C,
    organization_id: i32,
) -> Result<OrganizationCounts, DbErr> {
    let services = services::Entity::find()
        .filter(services::Column::OrganizationId.eq(organization_id))
        .count(conn)
        .await?;
    let incidents = incidents::Entity::find()
        .filter(incidents::Column::OrganizationId.eq(organization_id))
        .count(conn)
        .await?;

    Ok(OrganizationCounts {
        services,
        incidents,
    })
}

/// Services of an organization in display order: `order` ascending, newest first on ties.
pub async fn ordered_services<C: ConnectionTrait>(
    conn: &C,
    organization_id: i32,
) -> Result<Vec<services::Model>, DbErr> {
    services::Entity::find()
        .filter(services::Column::OrganizationId.eq(organization_id))
        .order_by_asc(services::Column::Order)
        .order_by_desc(services::Column::CreatedAt)
        .order_by_desc(services::Column::Id)
        .all(conn)
        .await
}

/// Updates of the given incidents grouped by incident, oldest first.
pub async fn updates_by_incident<C: ConnectionTrait>(
    conn: &C,
    incident_ids: &[i32],
) -> Result<HashMap<i32, Vec<incident_updates::Model>>, DbErr> {
    let mut grouped: HashMap<i32, Vec<incident_updates::Model>> = HashMap::new();
    if incident_ids.is_empty() {
        return Ok(grouped);
    }

    let updates = incident_updates::Entity::find()
        .filter(incident_updates::Column::IncidentId.is_in(incident_ids.iter().copied()))
        .order_by_asc(incident_updates::Column::CreatedAt)
        .order_by_asc(incident_updates::Column::Id)
        .all(conn)
        .await?;

    for update in updates {
        grouped.entry(update.incident_id).or_default().push(update);
    }
    Ok(grouped)
}

/// Attach service and updates to each incident, keeping the incident order.
///
/// `limit` caps the number of updates per incident after ordering.
pub async fn incident_details<C: ConnectionTrait>(
    conn: &C,
    incidents: Vec<incidents::Model>,
    order: UpdateOrder,
    limit: Option<usize>,
) -> Result<Vec<IncidentDetail>, DbErr> {
    if incidents.is_empty() {
        return Ok(Vec::new());
    }

    let incident_ids: Vec<i32> = incidents.iter().map(|i| i.id).collect();
    let mut service_ids: Vec<i32> = incidents.iter().map(|i| i.service_id).collect();
    service_ids.sort_unstable();
    service_ids.dedup();

    let services: HashMap<i32, services::Model> = services::Entity::find()
        .filter(services::Column::Id.is_in(service_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let mut updates = updates_by_incident(conn, &incident_ids).await?;

    incidents
        .into_iter()
        .map(|incident| {
            let service = services.get(&incident.service_id).cloned().ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Service {} of incident {}",
                    incident.service_id, incident.id
                ))
            })?;

            let mut incident_updates = updates.remove(&incident.id).unwrap_or_default();
            if order == UpdateOrder::NewestFirst {
                incident_updates.reverse();
            }
            if let Some(limit) = limit {
                incident_updates.truncate(limit);
            }

            Ok(IncidentDetail {
                incident: incident.into(),
                service: ServiceResponse::from(service),
                updates: incident_updates
                    .into_iter()
                    .map(IncidentUpdateResponse::from)
                    .collect(),
            })
        })
        .collect()
}

pub async fn incident_detail<C: ConnectionTrait>(
    conn: &C,
    incident: incidents::Model,
    order: UpdateOrder,
) -> Result<IncidentDetail, DbErr> {
    let id = incident.id;
    incident_details(conn, vec![incident], order, None)
        .await?
        .pop()
        .ok_or_else(|| DbErr::RecordNotFound(format!("Incident {id}")))
}

/// Service status implied by the impacts of its open incidents.
pub fn status_for_open_impacts<I>(impacts: I) -> ServiceStatus
where
    I: IntoIterator<Item = IncidentImpact>,
{
    impacts
        .into_iter()
        .max()
        .map(|impact| impact.service_status())
        .unwrap_or(ServiceStatus::Operational)
}

pub async fn recompute_service_status<C: ConnectionTrait>(
    conn: &C,
    service_id: i32,
) -> Result<ServiceStatus, DbErr> {
    let open = incidents::Entity::find()
        .filter(incidents::Column::ServiceId.eq(service_id))
        .filter(incidents::Column::Status.ne(IncidentStatus::Resolved))
        .all(conn)
        .await?;

    Ok(status_for_open_impacts(open.into_iter().map(|i| i.impact)))
}

pub async fn set_service_status<C: ConnectionTrait>(
    conn: &C,
    service: services::Model,
    status: ServiceStatus,
) -> Result<services::Model, DbErr> {
    let mut active: services::ActiveModel = service.into();
    active.status = Set(status);
    active.update(conn).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_open_incidents_is_operational() {
        assert_eq!(status_for_open_impacts([]), ServiceStatus::Operational);
    }

    #[test]
    fn test_worst_open_impact_wins() {
        assert_eq!(
            status_for_open_impacts([IncidentImpact::Minor, IncidentImpact::Major]),
            ServiceStatus::PartialOutage
        );
        assert_eq!(
            status_for_open_impacts([
                IncidentImpact::Critical,
                IncidentImpact::Minor,
                IncidentImpact::Major
            ]),
            ServiceStatus::MajorOutage
        );
        assert_eq!(
            status_for_open_impacts([IncidentImpact::Minor]),
            ServiceStatus::DegradedPerformance
        );
    }
}
