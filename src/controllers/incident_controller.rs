use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{active_driver, active_incident, active_trip, parse_optional_uuid};
use crate::dto::common_dto::ApiResponse;
use crate::dto::incident_dto::{CreateIncidentRequest, IncidentListQuery};
use crate::models::common::{Audit, Lifecycle};
use crate::models::safety_incident::{IncidentFilter, SafetyIncident, Severity};
use crate::models::snapshot::{DriverSnapshot, TripSnapshot};
use crate::repositories::FleetStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct IncidentController {
    store: Arc<dyn FleetStore>,
}

impl IncidentController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Registra un incidente; afecta a la puntuación de seguridad del conductor
    pub async fn create(
        &self,
        actor: Option<Uuid>,
        request: CreateIncidentRequest,
    ) -> AppResult<ApiResponse<SafetyIncident>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();

        let driver = active_driver(tx.as_mut(), request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found or inactive".to_string()))?;
        let trip = match request.trip_id {
            Some(trip_id) => Some(
                active_trip(tx.as_mut(), trip_id)
                    .await?
                    .map(|trip| TripSnapshot::from(&trip))
                    .ok_or_else(|| not_found_error("Trip"))?,
            ),
            None => None,
        };

        let incident = SafetyIncident {
            id: Uuid::new_v4(),
            driver: DriverSnapshot::from(&driver),
            trip,
            incident_date: request.incident_date.unwrap_or(now),
            incident_type: request.incident_type,
            description: request.description.trim().to_string(),
            severity: request.severity.unwrap_or(Severity::Minor),
            actions_taken: request.actions_taken.unwrap_or_default(),
            active: Lifecycle::Active,
            audit: Audit::new(actor, now),
        };
        tx.insert_safety_incident(&incident).await?;
        tx.commit().await?;

        tracing::warn!(
            "⚠️ Incidente {:?} registrado para {}",
            incident.incident_type,
            driver.employee_id
        );
        Ok(ApiResponse::success_with_message(incident, "Safety incident recorded successfully"))
    }

    pub async fn list(&self, query: IncidentListQuery) -> AppResult<ApiResponse<Vec<SafetyIncident>>> {
        let filter = IncidentFilter {
            driver_id: parse_optional_uuid(query.driver_id.as_deref(), "driver_id")?,
            include_archived: false,
        };
        let mut tx = self.store.begin().await?;
        let incidents = tx.safety_incidents(&filter).await?;
        Ok(ApiResponse::success_with_message(incidents, "Safety incidents retrieved successfully"))
    }

    pub async fn delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.store.begin().await?;
        let mut incident = active_incident(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Safety incident"))?;

        incident.active = Lifecycle::Archived;
        incident.audit.touch(actor, Utc::now());
        tx.update_safety_incident(&incident).await?;
        tx.commit().await?;
        Ok(ApiResponse::message_only("Safety incident deleted successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::tests::sample_driver;
    use crate::models::driver::DriverStatus;
    use crate::models::reference::LicenseCategory;
    use crate::models::safety_incident::IncidentType;
    use crate::repositories::MemoryFleetStore;

    fn request(driver_id: Uuid) -> CreateIncidentRequest {
        CreateIncidentRequest {
            driver_id,
            trip_id: None,
            incident_date: None,
            incident_type: IncidentType::NearMiss,
            description: "Hard braking at roundabout".to_string(),
            severity: None,
            actions_taken: None,
        }
    }

    #[tokio::test]
    async fn test_incident_lifecycle() {
        let store: Arc<dyn FleetStore> = Arc::new(MemoryFleetStore::new());
        let driver = sample_driver(LicenseCategory::B, DriverStatus::OnDuty);
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_driver(&driver).await.unwrap();
            tx.commit().await.unwrap();
        }
        let controller = IncidentController::new(store);

        let incident = controller.create(None, request(driver.id)).await.unwrap().data.unwrap();
        assert_eq!(incident.severity, Severity::Minor);
        assert_eq!(incident.driver.employee_id, driver.employee_id);

        let listed = controller
            .list(IncidentListQuery { driver_id: Some(driver.id.to_string()) })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(listed.len(), 1);

        controller.delete(None, incident.id).await.unwrap();
        let listed = controller.list(IncidentListQuery::default()).await.unwrap().data.unwrap();
        assert!(listed.is_empty());
        assert!(controller.delete(None, incident.id).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_driver_or_trip() {
        let store: Arc<dyn FleetStore> = Arc::new(MemoryFleetStore::new());
        let driver = sample_driver(LicenseCategory::B, DriverStatus::OnDuty);
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_driver(&driver).await.unwrap();
            tx.commit().await.unwrap();
        }
        let controller = IncidentController::new(store);

        let err = controller.create(None, request(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Driver not found or inactive"));

        let mut with_trip = request(driver.id);
        with_trip.trip_id = Some(Uuid::new_v4());
        assert!(matches!(
            controller.create(None, with_trip).await,
            Err(AppError::NotFound(_))
        ));
    }
}
