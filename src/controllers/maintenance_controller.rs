use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::{active_maintenance_log, non_blank, parse_optional_uuid};
use crate::dto::common_dto::{parse_pagination, query_flag, ApiResponse};
use crate::dto::maintenance_dto::{
    build_parts, CreateMaintenanceRequest, MaintenanceListQuery, MaintenanceResponse,
    UpdateMaintenanceRequest,
};
use crate::models::analytics::Page;
use crate::models::common::{Audit, Lifecycle};
use crate::models::maintenance::{
    MaintenanceDates, MaintenanceFilter, MaintenanceLog, MaintenanceStatus,
};
use crate::models::snapshot::VehicleSnapshot;
use crate::models::vehicle::VehicleStatus;
use crate::repositories::{FleetStore, FleetTx};
use crate::services::side_effects::apply_maintenance_side_effects;
use crate::services::status_machine::check_maintenance_transition;
use crate::utils::errors::{bad_request_error, not_found_error, transition_error, AppResult};
use crate::utils::validation::{parse_csv, parse_datetime};

pub struct MaintenanceController {
    store: Arc<dyn FleetStore>,
}

impl MaintenanceController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Registra una orden; si nace `in_progress` el vehículo entra en taller
    pub async fn create(
        &self,
        actor: Option<Uuid>,
        request: CreateMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceResponse>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();

        // 1. Vehículo
        let mut vehicle = tx
            .vehicle(request.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        if !vehicle.is_active() {
            return Err(bad_request_error(
                "Cannot schedule maintenance for an inactive vehicle",
            ));
        }
        if vehicle.status == VehicleStatus::OutOfService {
            return Err(bad_request_error(
                "Cannot schedule maintenance for a vehicle that is out of service",
            ));
        }

        // 2. Orden
        let scheduled = parse_datetime(&request.scheduled_date, "scheduled_date")?;
        let mut log = MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle: VehicleSnapshot::from(&vehicle),
            service_type: request.service_type,
            description: request.description.unwrap_or_default().trim().to_string(),
            dates: MaintenanceDates {
                scheduled: Some(scheduled),
                ..Default::default()
            },
            odometer_at_service: request
                .odometer_at_service
                .unwrap_or(vehicle.current_odometer),
            cost: request.cost.unwrap_or(Decimal::ZERO),
            service_provider: request.service_provider.unwrap_or_default(),
            previous_vehicle_status: vehicle.status,
            status: request.status.unwrap_or(MaintenanceStatus::Scheduled),
            next_service_due_km: request.next_service_due_km,
            parts: build_parts(request.parts, now)?,
            active: Lifecycle::Active,
            audit: Audit::new(actor, now),
        };
        log.stamp_dates(now);
        log.recompute_part_totals();
        tx.insert_maintenance_log(&log).await?;

        // 3. Efectos sobre el vehículo
        let cancelled =
            apply_maintenance_side_effects(tx.as_mut(), &log, &mut vehicle, None, actor, now)
                .await?;
        tx.commit().await?;

        tracing::info!(
            "🛠️ Orden de mantenimiento {} ({}) para {}",
            log.id,
            log.status,
            vehicle.license_plate
        );
        Ok(ApiResponse::success_with_message(
            MaintenanceResponse {
                log,
                trips_auto_cancel: cancelled,
            },
            "Maintenance log created successfully",
        ))
    }

    /// Por defecto sólo órdenes abiertas (`scheduled`, `in_progress`)
    pub async fn list(
        &self,
        query: MaintenanceListQuery,
    ) -> AppResult<ApiResponse<Page<MaintenanceLog>>> {
        let (page, limit) = parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
        let statuses = match non_blank(query.status.as_deref()) {
            Some(raw) => parse_csv(raw).map_err(|invalid| {
                bad_request_error(format!("Invalid status value(s): {}", invalid.join(", ")))
            })?,
            None => MaintenanceStatus::OPEN.to_vec(),
        };
        let filter = MaintenanceFilter {
            vehicle_id: parse_optional_uuid(query.vehicle_id.as_deref(), "vehicle_id")?,
            statuses: Some(statuses),
            upcoming: query_flag(query.upcoming.as_deref()),
            overdue: query_flag(query.overdue.as_deref()),
            include_archived: false,
        };

        let mut tx = self.store.begin().await?;
        let logs = tx.maintenance_logs(&filter).await?;
        Ok(ApiResponse::success_with_message(
            Page::from_sorted(logs, page, limit),
            "Maintenance logs retrieved successfully",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ApiResponse<MaintenanceLog>> {
        let mut tx = self.store.begin().await?;
        let log = load_log(tx.as_mut(), id).await?;
        Ok(ApiResponse::success_with_message(log, "Maintenance log fetched successfully"))
    }

    /// Edita la orden. La orden se guarda antes de propagar el cambio de
    /// estado al vehículo y a sus viajes.
    pub async fn update(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: UpdateMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceResponse>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut log = load_log(tx.as_mut(), id).await?;
        let previous = log.status;

        // 1. Transición
        if let Some(next) = request.status {
            check_maintenance_transition(previous, next)?;
            log.status = next;
        }

        // 2. Campos
        if let Some(service_type) = request.service_type {
            log.service_type = service_type;
        }
        if let Some(description) = request.description {
            log.description = description.trim().to_string();
        }
        if let Some(raw) = request.scheduled_date.as_deref() {
            log.dates.scheduled = Some(parse_datetime(raw, "scheduled_date")?);
        }
        if let Some(odometer) = request.odometer_at_service {
            log.odometer_at_service = odometer;
        }
        if let Some(cost) = request.cost {
            log.cost = cost;
        }
        if let Some(provider) = request.service_provider {
            log.service_provider = provider;
        }
        if let Some(next_due) = request.next_service_due_km {
            log.next_service_due_km = Some(next_due);
        }
        if let Some(parts) = request.parts {
            log.parts = build_parts(parts, now)?;
        }

        log.stamp_dates(now);
        log.recompute_part_totals();
        log.audit.touch(actor, now);
        tx.update_maintenance_log(&log).await?;

        // 3. Efectos
        let mut cancelled = 0;
        if log.status != previous {
            let mut vehicle = tx
                .vehicle(log.vehicle.id)
                .await?
                .ok_or_else(|| not_found_error("Vehicle"))?;
            cancelled = apply_maintenance_side_effects(
                tx.as_mut(),
                &log,
                &mut vehicle,
                Some(previous),
                actor,
                now,
            )
            .await?;
            tracing::info!("🔁 Orden {}: {} -> {}", log.id, previous, log.status);
        }
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            MaintenanceResponse {
                log,
                trips_auto_cancel: cancelled,
            },
            "Maintenance log updated successfully",
        ))
    }

    pub async fn delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.store.begin().await?;
        let mut log = load_log(tx.as_mut(), id).await?;

        if log.status == MaintenanceStatus::InProgress {
            return Err(transition_error(
                "Cannot delete an in-progress maintenance log. Complete or cancel it first.",
            ));
        }

        log.active = Lifecycle::Archived;
        log.audit.touch(actor, Utc::now());
        tx.update_maintenance_log(&log).await?;
        tx.commit().await?;
        Ok(ApiResponse::message_only("Maintenance log deleted successfully"))
    }
}

async fn load_log(tx: &mut dyn FleetTx, id: Uuid) -> AppResult<MaintenanceLog> {
    active_maintenance_log(tx, id)
        .await?
        .ok_or_else(|| not_found_error("Maintenance log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::tests::sample_driver;
    use crate::models::driver::DriverStatus;
    use crate::models::maintenance::ServiceType;
    use crate::models::reference::LicenseCategory;
    use crate::models::snapshot::DriverSnapshot;
    use crate::models::trip::tests::sample_trip;
    use crate::models::trip::TripStatus;
    use crate::models::vehicle::tests::sample_vehicle;
    use crate::models::vehicle::Vehicle;
    use crate::repositories::MemoryFleetStore;
    use crate::utils::errors::AppError;

    async fn seed(vehicle: &Vehicle) -> Arc<dyn FleetStore> {
        let store: Arc<dyn FleetStore> = Arc::new(MemoryFleetStore::new());
        let mut tx = store.begin().await.unwrap();
        tx.insert_vehicle(vehicle).await.unwrap();
        tx.commit().await.unwrap();
        store
    }

    fn request(vehicle_id: Uuid, status: Option<MaintenanceStatus>) -> CreateMaintenanceRequest {
        CreateMaintenanceRequest {
            vehicle_id,
            service_type: ServiceType::OilChange,
            description: None,
            scheduled_date: "2026-05-04".to_string(),
            odometer_at_service: None,
            cost: None,
            service_provider: Some("Taller Norte".to_string()),
            status,
            next_service_due_km: None,
            parts: Vec::new(),
        }
    }

    fn status_update(status: MaintenanceStatus, cost: Option<Decimal>) -> UpdateMaintenanceRequest {
        UpdateMaintenanceRequest {
            status: Some(status),
            service_type: None,
            description: None,
            scheduled_date: None,
            odometer_at_service: None,
            cost,
            service_provider: None,
            next_service_due_km: None,
            parts: None,
        }
    }

    async fn vehicle_status(store: &Arc<dyn FleetStore>, id: Uuid) -> VehicleStatus {
        let mut tx = store.begin().await.unwrap();
        tx.vehicle(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_create_defaults_odometer_and_cost() {
        let vehicle = sample_vehicle();
        let controller = MaintenanceController::new(seed(&vehicle).await);

        let response = controller.create(None, request(vehicle.id, None)).await.unwrap();
        let created = response.data.unwrap();
        assert_eq!(created.log.odometer_at_service, vehicle.current_odometer);
        assert_eq!(created.log.cost, Decimal::ZERO);
        assert_eq!(created.log.previous_vehicle_status, VehicleStatus::Available);
        assert_eq!(created.trips_auto_cancel, 0);
    }

    #[tokio::test]
    async fn test_out_of_service_vehicle_is_rejected() {
        let mut vehicle = sample_vehicle();
        vehicle.status = VehicleStatus::OutOfService;
        let controller = MaintenanceController::new(seed(&vehicle).await);

        let err = controller.create(None, request(vehicle.id, None)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("out of service")));
    }

    #[tokio::test]
    async fn test_shop_cycle_cancels_dispatched_trips_and_restores_vehicle() {
        let vehicle = sample_vehicle();
        let store = seed(&vehicle).await;

        // Viaje despachado con su conductor en ruta
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnTrip);
        let mut trip = sample_trip(VehicleSnapshot::from(&vehicle));
        trip.status = TripStatus::Dispatched;
        trip.driver = Some(DriverSnapshot::from(&driver));
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_driver(&driver).await.unwrap();
            tx.insert_trip(&trip).await.unwrap();
            tx.commit().await.unwrap();
        }

        let controller = MaintenanceController::new(store.clone());
        let created = controller
            .create(None, request(vehicle.id, None))
            .await
            .unwrap()
            .data
            .unwrap();

        let started = controller
            .update(None, created.log.id, status_update(MaintenanceStatus::InProgress, None))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(started.trips_auto_cancel, 1);
        assert!(started.log.dates.start.is_some());
        assert_eq!(vehicle_status(&store, vehicle.id).await, VehicleStatus::InShop);

        {
            let mut tx = store.begin().await.unwrap();
            let cancelled = tx.trip(trip.id).await.unwrap().unwrap();
            assert_eq!(cancelled.status, TripStatus::Cancelled);
            assert_eq!(
                cancelled.cancellation_reason,
                "Vehicle sent to maintenance shop: oil change"
            );
            assert_eq!(tx.driver(driver.id).await.unwrap().unwrap().status, DriverStatus::OnDuty);
        }

        // No se puede borrar mientras está en curso
        assert!(controller.delete(None, created.log.id).await.is_err());

        // Completar exige coste
        assert!(controller
            .update(None, created.log.id, status_update(MaintenanceStatus::Completed, None))
            .await
            .is_err());
        assert_eq!(vehicle_status(&store, vehicle.id).await, VehicleStatus::InShop);

        controller
            .update(
                None,
                created.log.id,
                status_update(MaintenanceStatus::Completed, Some(Decimal::new(120, 0))),
            )
            .await
            .unwrap();
        assert_eq!(vehicle_status(&store, vehicle.id).await, VehicleStatus::Available);

        controller.delete(None, created.log.id).await.unwrap();
        assert!(matches!(
            controller.get_by_id(created.log.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_transition_is_rejected() {
        let vehicle = sample_vehicle();
        let controller = MaintenanceController::new(seed(&vehicle).await);
        let created = controller
            .create(None, request(vehicle.id, None))
            .await
            .unwrap()
            .data
            .unwrap();

        let err = controller
            .update(None, created.log.id, status_update(MaintenanceStatus::Completed, Some(Decimal::ONE)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_list_defaults_to_open_orders() {
        let vehicle = sample_vehicle();
        let controller = MaintenanceController::new(seed(&vehicle).await);
        controller.create(None, request(vehicle.id, None)).await.unwrap();
        let cancelled = controller
            .create(None, request(vehicle.id, None))
            .await
            .unwrap()
            .data
            .unwrap();
        controller
            .update(None, cancelled.log.id, status_update(MaintenanceStatus::Cancelled, None))
            .await
            .unwrap();

        let page = controller
            .list(MaintenanceListQuery::default())
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(page.total, 1);

        let all = controller
            .list(MaintenanceListQuery {
                status: Some("scheduled,cancelled".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(all.total, 2);

        assert!(controller
            .list(MaintenanceListQuery {
                status: Some("broken".to_string()),
                ..Default::default()
            })
            .await
            .is_err());
    }
}
