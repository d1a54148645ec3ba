use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{active_driver, non_blank, parse_optional_uuid, region_snapshot};
use crate::dto::common_dto::{parse_pagination, ApiResponse};
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverListQuery, DriverStatusRequest, SuspendDriverRequest,
    SuspensionResponse, TrainingRecordRequest, UpdateDriverRequest,
};
use crate::models::analytics::{DriverPerformance, Page};
use crate::models::common::{Audit, Lifecycle};
use crate::models::driver::{
    ComplianceFilter, Driver, DriverFilter, DriverMetrics, DriverStatus, DriverView, TrainingRecord,
};
use crate::models::reference::LicenseCategory;
use crate::models::safety_incident::IncidentFilter;
use crate::models::trip::TripFilter;
use crate::repositories::{FleetStore, FleetTx};
use crate::services::performance_service::driver_performance;
use crate::services::side_effects::cancel_dispatched_trips_for_driver;
use crate::services::status_machine::DriverEvent;
use crate::utils::errors::{bad_request_error, not_found_error, transition_error, AppError, AppResult};
use crate::utils::validation::{local_today, normalize_code, parse_csv, parse_uuid, require_text};

const MANUAL_STATUS_ERROR: &str =
    "Status must be one of: on_duty, off_duty. Use /suspend for suspension.";
const EXPIRED_LICENSE_ERROR: &str =
    "License expiry date must be in the future when creating a driver";

pub struct DriverController {
    store: Arc<dyn FleetStore>,
}

impl DriverController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        actor: Option<Uuid>,
        request: CreateDriverRequest,
    ) -> AppResult<ApiResponse<DriverView>> {
        let status = match request.status {
            None => DriverStatus::OffDuty,
            Some(status @ (DriverStatus::OnDuty | DriverStatus::OffDuty)) => status,
            Some(_) => return Err(bad_request_error(MANUAL_STATUS_ERROR)),
        };

        let now = Utc::now();
        if request.license_expiry <= local_today(now) {
            return Err(bad_request_error(EXPIRED_LICENSE_ERROR));
        }

        let mut tx = self.store.begin().await?;

        // 1. Identificadores únicos
        let employee_id = normalize_code(&request.employee_id);
        let license_number = normalize_code(&request.license_number);
        if tx.employee_id_taken(&employee_id, None).await? {
            return Err(AppError::Conflict(format!(
                "Employee ID '{}' is already in use",
                employee_id
            )));
        }
        ensure_license_free(tx.as_mut(), &license_number, None).await?;

        // 2. Región opcional
        let region = match request.region_id {
            Some(region_id) => Some(region_snapshot(tx.as_mut(), region_id).await?),
            None => None,
        };

        // 3. Alta
        let driver = Driver {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            employee_id,
            license_number,
            license_category: request.license_category,
            license_expiry: request.license_expiry,
            date_of_joining: request.date_of_joining,
            status,
            region,
            medical_cert_expiry: request.medical_cert_expiry,
            contact: request.contact.unwrap_or_default(),
            metrics: DriverMetrics::default(),
            training_records: Vec::new(),
            active: Lifecycle::Active,
            audit: Audit::new(actor, now),
        };
        tx.insert_driver(&driver).await?;
        tx.commit().await?;

        tracing::info!("🧑‍✈️ Conductor {} dado de alta", driver.employee_id);
        Ok(ApiResponse::success_with_message(
            DriverView::new(driver, local_today(now)),
            "Driver created successfully",
        ))
    }

    pub async fn list(&self, query: DriverListQuery) -> AppResult<ApiResponse<Page<DriverView>>> {
        let (page, limit) = parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
        let filter = DriverFilter {
            statuses: match query.status.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(raw) => Some(parse_csv(raw).map_err(|invalid| {
                    bad_request_error(format!("Invalid status value(s): {}", invalid.join(", ")))
                })?),
                None => None,
            },
            region_id: parse_optional_uuid(query.region_id.as_deref(), "region_id")?,
            license_category: non_blank(query.license_category.as_deref())
                .map(|v| v.parse::<LicenseCategory>().map_err(bad_request_error))
                .transpose()?,
            compliance: non_blank(query.compliance.as_deref())
                .map(|v| v.parse::<ComplianceFilter>().map_err(bad_request_error))
                .transpose()?,
            expiring_within_days: non_blank(query.expiring.as_deref())
                .map(|v| {
                    v.parse::<i64>()
                        .ok()
                        .filter(|days| *days >= 0)
                        .ok_or_else(|| bad_request_error("expiring must be a number of days"))
                })
                .transpose()?,
            include_archived: false,
        };

        let today = local_today(Utc::now());
        let mut tx = self.store.begin().await?;
        let drivers = tx.drivers(&filter, today).await?;
        let views = drivers.into_iter().map(|d| DriverView::new(d, today)).collect();
        Ok(ApiResponse::success_with_message(
            Page::from_sorted(views, page, limit),
            "Drivers fetched successfully",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ApiResponse<DriverView>> {
        let mut tx = self.store.begin().await?;
        let driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;
        Ok(ApiResponse::success_with_message(
            DriverView::new(driver, local_today(Utc::now())),
            "Driver fetched successfully",
        ))
    }

    pub async fn update(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: UpdateDriverRequest,
    ) -> AppResult<ApiResponse<DriverView>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;

        if let Some(name) = request.name {
            driver.name = name.trim().to_string();
        }
        if let Some(number) = request.license_number {
            let number = normalize_code(&number);
            ensure_license_free(tx.as_mut(), &number, Some(driver.id)).await?;
            driver.license_number = number;
        }
        if let Some(category) = request.license_category {
            driver.license_category = category;
        }
        if let Some(expiry) = request.license_expiry {
            driver.license_expiry = expiry;
        }
        if let Some(joined) = request.date_of_joining {
            driver.date_of_joining = joined;
        }
        if let Some(raw) = request.region_id {
            driver.region = match raw.trim() {
                "" => None,
                value => Some(region_snapshot(tx.as_mut(), parse_uuid(value, "region_id")?).await?),
            };
        }
        if let Some(contact) = request.contact {
            if let Some(phone) = contact.phone {
                driver.contact.phone = phone;
            }
            if let Some(email) = contact.email {
                driver.contact.email = email;
            }
        }
        if let Some(expiry) = request.medical_cert_expiry {
            driver.medical_cert_expiry = Some(expiry);
        }

        driver.audit.touch(actor, now);
        tx.update_driver(&driver).await?;
        tx.commit().await?;
        Ok(ApiResponse::success_with_message(
            DriverView::new(driver, local_today(now)),
            "Driver updated successfully",
        ))
    }

    /// Cambio manual entre `on_duty` y `off_duty`
    pub async fn update_status(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: DriverStatusRequest,
    ) -> AppResult<ApiResponse<DriverView>> {
        let event = match request.status.as_deref().map(str::trim) {
            Some("on_duty") => DriverEvent::GoOnDuty,
            Some("off_duty") => DriverEvent::GoOffDuty,
            _ => return Err(bad_request_error(MANUAL_STATUS_ERROR)),
        };

        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;

        driver.status = event.apply(driver.status)?;
        driver.audit.touch(actor, now);
        tx.update_driver(&driver).await?;
        tx.commit().await?;

        let message = format!("Driver status updated to {}", driver.status);
        Ok(ApiResponse::success_with_message(
            DriverView::new(driver, local_today(now)),
            message,
        ))
    }

    /// Suspende al conductor y cancela sus viajes `dispatched`
    pub async fn suspend(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: SuspendDriverRequest,
    ) -> AppResult<ApiResponse<SuspensionResponse>> {
        let reason = require_text(request.reason.as_deref(), "A reason is required to suspend a driver")?;

        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;

        // 1. Transición y guardado del conductor
        driver.status = DriverEvent::Suspend.apply(driver.status)?;
        driver.audit.touch(actor, now);
        tx.update_driver(&driver).await?;

        // 2. Cascada sobre los viajes despachados
        let cancelled = cancel_dispatched_trips_for_driver(
            tx.as_mut(),
            driver.id,
            &format!("Driver suspended: {}", reason),
            actor,
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::warn!(
            "⛔ Conductor {} suspendido, {} viaje(s) cancelado(s)",
            driver.employee_id,
            cancelled
        );
        Ok(ApiResponse::success_with_message(
            SuspensionResponse {
                driver: DriverView::new(driver, local_today(now)),
                trips_auto_cancel: cancelled,
            },
            format!("Driver suspended. {} dispatched trip(s) cancelled.", cancelled),
        ))
    }

    pub async fn delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.store.begin().await?;
        let mut driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;

        if driver.status == DriverStatus::OnTrip {
            return Err(transition_error("Cannot delete a driver who is currently on a trip"));
        }

        driver.active = Lifecycle::Archived;
        driver.audit.touch(actor, Utc::now());
        tx.update_driver(&driver).await?;
        tx.commit().await?;
        Ok(ApiResponse::message_only("Driver deleted successfully"))
    }

    /// Informe de rendimiento; cachea las métricas si cambiaron
    pub async fn performance(&self, id: Uuid) -> AppResult<ApiResponse<DriverPerformance>> {
        let mut tx = self.store.begin().await?;
        let mut driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;

        let trips = tx
            .trips(&TripFilter {
                driver_id: Some(driver.id),
                ..Default::default()
            })
            .await?;
        let incidents = tx.safety_incidents(&IncidentFilter::for_driver(driver.id)).await?;

        let (report, changed) = driver_performance(&driver, &trips, &incidents);
        if let Some(metrics) = changed {
            driver.metrics = metrics;
            tx.update_driver(&driver).await?;
            tx.commit().await?;
        }

        Ok(ApiResponse::success_with_message(
            report,
            "Driver performance fetched successfully",
        ))
    }

    pub async fn add_training(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: TrainingRecordRequest,
    ) -> AppResult<ApiResponse<Vec<TrainingRecord>>> {
        let (training_type, completion_date) = match (request.training_type, request.completion_date) {
            (Some(t), Some(d)) => (t, d),
            _ => return Err(bad_request_error("training_type and completion_date are required")),
        };

        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut driver = active_driver(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Driver"))?;

        driver.training_records.push(TrainingRecord {
            id: Uuid::new_v4(),
            training_type,
            completion_date,
            expiry_date: request.expiry_date,
            certificate_number: request.certificate_number.unwrap_or_default(),
            active: Lifecycle::Active,
            created_at: now,
        });
        driver.audit.touch(actor, now);
        tx.update_driver(&driver).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            driver.training_records,
            "Training record added successfully",
        ))
    }
}

async fn ensure_license_free(tx: &mut dyn FleetTx, number: &str, except: Option<Uuid>) -> AppResult<()> {
    if tx.license_number_taken(number, except).await? {
        return Err(AppError::Conflict(format!(
            "License number '{}' is already in use",
            number
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::tests::sample_driver;
    use crate::models::trip::tests::sample_trip;
    use crate::models::trip::TripStatus;
    use crate::models::snapshot::{DriverSnapshot, VehicleSnapshot};
    use crate::models::vehicle::tests::sample_vehicle;
    use crate::models::vehicle::VehicleStatus;
    use crate::repositories::MemoryFleetStore;
    use chrono::NaiveDate;

    fn create_request(employee_id: &str, license_number: &str) -> CreateDriverRequest {
        CreateDriverRequest {
            name: "Ana Ruiz".to_string(),
            employee_id: employee_id.to_string(),
            license_number: license_number.to_string(),
            license_category: LicenseCategory::C,
            license_expiry: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            date_of_joining: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            status: None,
            region_id: None,
            contact: None,
            medical_cert_expiry: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_off_duty_and_rejects_duplicates() {
        let controller = DriverController::new(Arc::new(MemoryFleetStore::new()));
        let view = controller
            .create(None, create_request("emp-7", "lic-7"))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(view.driver.status, DriverStatus::OffDuty);
        assert_eq!(view.driver.employee_id, "EMP-7");

        let err = controller
            .create(None, create_request("EMP-7", "LIC-8"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("Employee ID")));
        let err = controller
            .create(None, create_request("EMP-8", "LIC-7"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("License number")));
    }

    #[tokio::test]
    async fn test_create_rejects_expired_or_expiring_today_license() {
        let controller = DriverController::new(Arc::new(MemoryFleetStore::new()));

        let mut expired = create_request("EMP-1", "LIC-1");
        expired.license_expiry = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let err = controller.create(None, expired).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == EXPIRED_LICENSE_ERROR));

        let mut today = create_request("EMP-1", "LIC-1");
        today.license_expiry = local_today(Utc::now());
        assert!(matches!(
            controller.create(None, today).await,
            Err(AppError::BadRequest(_))
        ));

        // Nada se guardó: los mismos identificadores siguen libres
        assert!(controller.create(None, create_request("EMP-1", "LIC-1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_suspended_status() {
        let controller = DriverController::new(Arc::new(MemoryFleetStore::new()));
        let mut request = create_request("EMP-1", "LIC-1");
        request.status = Some(DriverStatus::Suspended);
        assert!(matches!(
            controller.create(None, request).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_manual_status_only_accepts_duty_states() {
        let controller = DriverController::new(Arc::new(MemoryFleetStore::new()));
        let id = controller
            .create(None, create_request("EMP-1", "LIC-1"))
            .await
            .unwrap()
            .data
            .unwrap()
            .driver
            .id;

        let response = controller
            .update_status(None, id, DriverStatusRequest { status: Some("on_duty".into()) })
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("Driver status updated to on_duty"));

        let err = controller
            .update_status(None, id, DriverStatusRequest { status: Some("suspended".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == MANUAL_STATUS_ERROR));
    }

    #[tokio::test]
    async fn test_suspend_cancels_dispatched_trips() {
        let store: Arc<dyn FleetStore> = Arc::new(MemoryFleetStore::new());
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnTrip);
        let mut tx = store.begin().await.unwrap();
        tx.insert_driver(&driver).await.unwrap();

        // Dos viajes despachados, cada uno con su propio vehículo
        let mut seeded = Vec::new();
        for plate in ["TRK-0001", "TRK-0002"] {
            let mut vehicle = sample_vehicle();
            vehicle.license_plate = plate.to_string();
            vehicle.status = VehicleStatus::OnTrip;
            let mut trip = sample_trip(VehicleSnapshot::from(&vehicle));
            trip.status = TripStatus::Dispatched;
            trip.driver = Some(DriverSnapshot::from(&driver));
            tx.insert_vehicle(&vehicle).await.unwrap();
            tx.insert_trip(&trip).await.unwrap();
            seeded.push((vehicle.id, trip.id));
        }
        tx.commit().await.unwrap();

        let controller = DriverController::new(store.clone());
        let err = controller
            .suspend(None, driver.id, SuspendDriverRequest { reason: Some("  ".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let response = controller
            .suspend(None, driver.id, SuspendDriverRequest { reason: Some("Failed test".into()) })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(response.trips_auto_cancel, 2);
        assert_eq!(response.driver.driver.status, DriverStatus::Suspended);

        let mut tx = store.begin().await.unwrap();
        for (vehicle_id, trip_id) in seeded {
            let trip = tx.trip(trip_id).await.unwrap().unwrap();
            assert_eq!(trip.status, TripStatus::Cancelled);
            assert_eq!(trip.cancellation_reason, "Driver suspended: Failed test");
            let vehicle = tx.vehicle(vehicle_id).await.unwrap().unwrap();
            assert_eq!(vehicle.status, VehicleStatus::Available);
        }
    }

    #[tokio::test]
    async fn test_training_requires_type_and_date() {
        let controller = DriverController::new(Arc::new(MemoryFleetStore::new()));
        let id = controller
            .create(None, create_request("EMP-1", "LIC-1"))
            .await
            .unwrap()
            .data
            .unwrap()
            .driver
            .id;

        let missing = TrainingRecordRequest {
            training_type: None,
            completion_date: None,
            expiry_date: None,
            certificate_number: None,
        };
        assert!(controller.add_training(None, id, missing).await.is_err());
    }
}
