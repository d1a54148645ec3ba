use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{active_vehicle, active_vehicle_type, parse_optional_uuid, region_snapshot};
use crate::dto::common_dto::{query_flag, ApiResponse};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleListQuery};
use crate::models::common::{Audit, Lifecycle};
use crate::models::snapshot::VehicleTypeSnapshot;
use crate::models::vehicle::{Vehicle, VehicleFilter, VehicleStatus};
use crate::repositories::{FleetStore, FleetTx};
use crate::services::status_machine::VehicleEvent;
use crate::utils::errors::{bad_request_error, not_found_error, transition_error, AppError, AppResult};
use crate::utils::validation::{normalize_code, parse_csv, parse_uuid};

pub struct VehicleController {
    store: Arc<dyn FleetStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        actor: Option<Uuid>,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();

        // 1. Datos de referencia
        let vehicle_type = active_vehicle_type(tx.as_mut(), request.vehicle_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle type not found or inactive".to_string()))?;
        let region = match request.region_id {
            Some(region_id) => Some(region_snapshot(tx.as_mut(), region_id).await?),
            None => None,
        };

        // 2. Matrícula única
        let license_plate = normalize_code(&request.license_plate);
        ensure_plate_free(tx.as_mut(), &license_plate, None).await?;

        // 3. Alta, siempre disponible
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            license_plate,
            name: request.name.trim().to_string(),
            vehicle_type: VehicleTypeSnapshot::from(&vehicle_type),
            max_load_kg: request.max_load_kg,
            current_odometer: request.current_odometer.unwrap_or(0.0),
            acquisition_date: request.acquisition_date,
            acquisition_cost: request.acquisition_cost,
            status: VehicleStatus::Available,
            region,
            notes: request.notes.unwrap_or_default(),
            active: Lifecycle::Active,
            audit: Audit::new(actor, now),
        };
        tx.insert_vehicle(&vehicle).await?;
        tx.commit().await?;

        tracing::info!("🚚 Vehículo {} registrado", vehicle.license_plate);
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle created successfully"))
    }

    pub async fn list(&self, query: VehicleListQuery) -> AppResult<ApiResponse<Vec<Vehicle>>> {
        let filter = VehicleFilter {
            statuses: match query.status.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(raw) => Some(parse_csv(raw).map_err(|invalid| {
                    bad_request_error(format!("Invalid status value(s): {}", invalid.join(", ")))
                })?),
                None => None,
            },
            region_id: parse_optional_uuid(query.region_id.as_deref(), "region_id")?,
            vehicle_type_id: parse_optional_uuid(query.vehicle_type_id.as_deref(), "vehicle_type_id")?,
            include_archived: query_flag(query.include_archived.as_deref()),
        };

        let mut tx = self.store.begin().await?;
        let vehicles = tx.vehicles(&filter).await?;
        Ok(ApiResponse::success_with_message(vehicles, "Vehicles retrieved successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ApiResponse<Vehicle>> {
        let mut tx = self.store.begin().await?;
        let vehicle = active_vehicle(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle retrieved successfully"))
    }

    pub async fn update(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut vehicle = active_vehicle(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;

        if let Some(plate) = request.license_plate {
            let plate = normalize_code(&plate);
            ensure_plate_free(tx.as_mut(), &plate, Some(vehicle.id)).await?;
            vehicle.license_plate = plate;
        }
        if let Some(name) = request.name {
            vehicle.name = name.trim().to_string();
        }
        if let Some(type_id) = request.vehicle_type_id {
            let vehicle_type = active_vehicle_type(tx.as_mut(), type_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehicle type not found or inactive".to_string()))?;
            vehicle.vehicle_type = VehicleTypeSnapshot::from(&vehicle_type);
        }
        if let Some(max_load) = request.max_load_kg {
            vehicle.max_load_kg = max_load;
        }
        if let Some(odometer) = request.current_odometer {
            if odometer < vehicle.current_odometer {
                return Err(bad_request_error(format!(
                    "Odometer cannot go backwards (current: {}, new: {})",
                    vehicle.current_odometer, odometer
                )));
            }
            vehicle.current_odometer = odometer;
        }
        if let Some(date) = request.acquisition_date {
            vehicle.acquisition_date = date;
        }
        if let Some(cost) = request.acquisition_cost {
            vehicle.acquisition_cost = cost;
        }
        if let Some(raw) = request.region_id {
            vehicle.region = match raw.trim() {
                "" => None,
                value => Some(region_snapshot(tx.as_mut(), parse_uuid(value, "region_id")?).await?),
            };
        }
        if let Some(notes) = request.notes {
            vehicle.notes = notes;
        }

        vehicle.audit.touch(actor, now);
        tx.update_vehicle(&vehicle).await?;
        tx.commit().await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle updated successfully"))
    }

    /// Archiva el vehículo; uno en ruta no se puede archivar
    pub async fn delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<Vehicle>> {
        let mut tx = self.store.begin().await?;
        let mut vehicle = active_vehicle(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;

        if vehicle.status == VehicleStatus::OnTrip {
            return Err(transition_error("Cannot delete a vehicle that is currently on a trip"));
        }

        vehicle.active = Lifecycle::Archived;
        vehicle.audit.touch(actor, Utc::now());
        tx.update_vehicle(&vehicle).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Vehículo {} archivado", vehicle.license_plate);
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle deleted successfully"))
    }

    pub async fn retire(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<Vehicle>> {
        self.apply_event(actor, id, VehicleEvent::Retire, "Vehicle retired successfully")
            .await
    }

    pub async fn reinstate(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<Vehicle>> {
        self.apply_event(actor, id, VehicleEvent::Reinstate, "Vehicle reinstated successfully")
            .await
    }

    async fn apply_event(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        event: VehicleEvent,
        message: &str,
    ) -> AppResult<ApiResponse<Vehicle>> {
        let mut tx = self.store.begin().await?;
        let mut vehicle = active_vehicle(tx.as_mut(), id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;

        let from = vehicle.status;
        vehicle.status = event.apply(from)?;
        vehicle.audit.touch(actor, Utc::now());
        tx.update_vehicle(&vehicle).await?;
        tx.commit().await?;

        tracing::info!("🔄 Vehículo {}: {} -> {}", vehicle.license_plate, from, vehicle.status);
        Ok(ApiResponse::success_with_message(vehicle, message))
    }
}

async fn ensure_plate_free(tx: &mut dyn FleetTx, plate: &str, except: Option<Uuid>) -> AppResult<()> {
    if tx.license_plate_taken(plate, except).await? {
        return Err(AppError::Conflict(format!(
            "License plate '{}' is already registered",
            plate
        )));
    }
    Ok(())
}
