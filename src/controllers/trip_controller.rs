use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::{active_driver, active_trip, active_vehicle, non_blank, parse_optional_uuid};
use crate::dto::common_dto::{query_flag, ApiResponse};
use crate::dto::trip_dto::{
    AddExpenseRequest, CancelTripRequest, CompleteTripRequest, CreateTripRequest, TripListQuery,
    UpdateTripRequest,
};
use crate::models::common::{Audit, Lifecycle};
use crate::models::driver::DriverStatus;
use crate::models::snapshot::{DriverSnapshot, VehicleSnapshot};
use crate::models::trip::{
    Cargo, Expense, ExpenseType, FuelDetails, Odometer, Schedule, Trip, TripFilter, TripPriority,
    TripStatus,
};
use crate::models::vehicle::VehicleStatus;
use crate::repositories::{FleetStore, FleetTx};
use crate::services::status_machine::{DriverEvent, TripEvent, VehicleEvent};
use crate::utils::errors::{bad_request_error, not_found_error, transition_error, AppError, AppResult};
use crate::utils::validation::{local_today, parse_csv, require_text};

pub struct TripController {
    store: Arc<dyn FleetStore>,
}

impl TripController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Crea un viaje en borrador con los snapshots de vehículo, conductor y región
    pub async fn create(
        &self,
        actor: Option<Uuid>,
        request: CreateTripRequest,
    ) -> AppResult<ApiResponse<Trip>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();

        // 1. Vehículo activo y disponible
        let vehicle = active_vehicle(tx.as_mut(), request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found or inactive".to_string()))?;
        VehicleEvent::Dispatch.apply(vehicle.status)?;

        // 2. Capacidad
        let weight = request.cargo_weight_kg.unwrap_or(0.0);
        check_capacity(weight, vehicle.max_load_kg)?;

        // 3. Conductor opcional, ya validado para este vehículo
        let driver = match request.driver_id {
            Some(driver_id) => {
                let driver = active_driver(tx.as_mut(), driver_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Driver not found or inactive".to_string()))?;
                let required = vehicle.vehicle_type.required_license_category;
                if let Some(blocker) = driver.assignment_blocker(required, local_today(now)) {
                    return Err(bad_request_error(blocker));
                }
                Some(DriverSnapshot::from(&driver))
            }
            None => None,
        };

        // 4. Alta
        let id = Uuid::new_v4();
        let trip = Trip {
            id,
            trip_reference: Trip::reference_for(id, now.date_naive()),
            origin: request.origin.trim().to_string(),
            destination: request.destination.trim().to_string(),
            cargo: Cargo {
                description: request.cargo_description.unwrap_or_default(),
                weight_kg: weight,
            },
            schedule: Schedule {
                scheduled_departure: request.scheduled_departure,
                estimated_arrival: request.estimated_arrival,
                ..Default::default()
            },
            priority: request.priority.unwrap_or_default(),
            vehicle: VehicleSnapshot::from(&vehicle),
            driver,
            status: TripStatus::Draft,
            odometer: Odometer {
                start: vehicle.current_odometer,
                end: None,
            },
            cancellation_reason: String::new(),
            expenses: Vec::new(),
            region: vehicle.region.clone(),
            active: Lifecycle::Active,
            audit: Audit::new(actor, now),
        };
        tx.insert_trip(&trip).await?;
        tx.commit().await?;

        tracing::info!("📝 Viaje {} creado para {}", trip.trip_reference, vehicle.license_plate);
        Ok(ApiResponse::success_with_message(trip, "Trip created successfully"))
    }

    pub async fn list(&self, query: TripListQuery) -> AppResult<ApiResponse<Vec<Trip>>> {
        let filter = TripFilter {
            statuses: match non_blank(query.status.as_deref()) {
                Some(raw) => Some(parse_csv(raw).map_err(|invalid| {
                    bad_request_error(format!("Invalid status value(s): {}", invalid.join(", ")))
                })?),
                None => None,
            },
            vehicle_id: parse_optional_uuid(query.vehicle_id.as_deref(), "vehicle_id")?,
            driver_id: parse_optional_uuid(query.driver_id.as_deref(), "driver_id")?,
            region_id: parse_optional_uuid(query.region_id.as_deref(), "region_id")?,
            vehicle_type_id: None,
            priority: non_blank(query.priority.as_deref())
                .map(|v| v.to_lowercase().parse::<TripPriority>().map_err(bad_request_error))
                .transpose()?,
            include_archived: query_flag(query.include_archived.as_deref()),
        };

        let mut tx = self.store.begin().await?;
        let trips = tx.trips(&filter).await?;
        Ok(ApiResponse::success_with_message(trips, "Trips retrieved successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ApiResponse<Trip>> {
        let mut tx = self.store.begin().await?;
        let trip = load_trip(tx.as_mut(), id).await?;
        Ok(ApiResponse::success_with_message(trip, "Trip retrieved successfully"))
    }

    /// Edición de ruta, carga, horario y prioridad mientras no ha salido
    pub async fn update(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: UpdateTripRequest,
    ) -> AppResult<ApiResponse<Trip>> {
        let mut tx = self.store.begin().await?;
        let mut trip = load_trip(tx.as_mut(), id).await?;

        if !matches!(trip.status, TripStatus::Draft | TripStatus::Dispatched) {
            return Err(transition_error(format!(
                "Cannot update trip with status: {}",
                trip.status
            )));
        }

        if let Some(origin) = request.origin {
            trip.origin = origin.trim().to_string();
        }
        if let Some(destination) = request.destination {
            trip.destination = destination.trim().to_string();
        }
        if let Some(description) = request.cargo_description {
            trip.cargo.description = description;
        }
        if let Some(weight) = request.cargo_weight_kg {
            let vehicle = tx
                .vehicle(trip.vehicle.id)
                .await?
                .ok_or_else(|| not_found_error("Vehicle"))?;
            check_capacity(weight, vehicle.max_load_kg)?;
            trip.cargo.weight_kg = weight;
        }
        if let Some(departure) = request.scheduled_departure {
            trip.schedule.scheduled_departure = Some(departure);
        }
        if let Some(arrival) = request.estimated_arrival {
            trip.schedule.estimated_arrival = Some(arrival);
        }
        if let Some(priority) = request.priority {
            trip.priority = priority;
        }

        trip.audit.touch(actor, Utc::now());
        tx.update_trip(&trip).await?;
        tx.commit().await?;
        Ok(ApiResponse::success_with_message(trip, "Trip updated successfully"))
    }

    /// draft -> dispatched: reclama vehículo y conductor
    pub async fn dispatch(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<Trip>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut trip = load_trip(tx.as_mut(), id).await?;

        // 1. Guardas del viaje
        let next = TripEvent::Dispatch.apply(trip.status)?;
        let driver_id = trip
            .driver
            .as_ref()
            .map(|d| d.id)
            .ok_or_else(|| bad_request_error("Cannot dispatch trip without a driver"))?;

        // 2. Vehículo todavía disponible
        let mut vehicle = active_vehicle(tx.as_mut(), trip.vehicle.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found or inactive".to_string()))?;
        vehicle.status = VehicleEvent::Dispatch.apply(vehicle.status)?;

        // 3. Conductor todavía asignable
        let mut driver = active_driver(tx.as_mut(), driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found or inactive".to_string()))?;
        let required = vehicle.vehicle_type.required_license_category;
        if let Some(blocker) = driver.assignment_blocker(required, local_today(now)) {
            return Err(transition_error(blocker));
        }
        driver.status = DriverEvent::Dispatch.apply(driver.status)?;

        // 4. Guardar todo en la misma unidad de trabajo
        trip.status = next;
        trip.schedule.actual_departure = Some(now);
        trip.audit.touch(actor, now);
        vehicle.audit.touch(actor, now);
        driver.audit.touch(actor, now);
        tx.update_trip(&trip).await?;
        tx.update_vehicle(&vehicle).await?;
        tx.update_driver(&driver).await?;
        tx.commit().await?;

        tracing::info!(
            "🚀 Viaje {} despachado ({} / {})",
            trip.trip_reference,
            vehicle.license_plate,
            driver.employee_id
        );
        Ok(ApiResponse::success_with_message(trip, "Trip dispatched successfully"))
    }

    pub async fn start(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<ApiResponse<Trip>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut trip = load_trip(tx.as_mut(), id).await?;

        trip.status = TripEvent::Start.apply(trip.status)?;
        if trip.schedule.actual_departure.is_none() {
            trip.schedule.actual_departure = Some(now);
        }
        trip.audit.touch(actor, now);
        tx.update_trip(&trip).await?;
        tx.commit().await?;
        Ok(ApiResponse::success_with_message(trip, "Trip started successfully"))
    }

    /// Cierra el viaje, avanza el odómetro y libera vehículo y conductor
    pub async fn complete(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: CompleteTripRequest,
    ) -> AppResult<ApiResponse<Trip>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut trip = load_trip(tx.as_mut(), id).await?;

        let next = TripEvent::Complete.apply(trip.status)?;
        let odometer_end = request
            .odometer_end
            .ok_or_else(|| bad_request_error("odometer_end is required"))?;
        if odometer_end <= trip.odometer.start {
            return Err(bad_request_error(format!(
                "End odometer ({}) must be greater than start odometer ({})",
                odometer_end, trip.odometer.start
            )));
        }

        if let Some(mut vehicle) = tx.vehicle(trip.vehicle.id).await? {
            let mut changed = vehicle.advance_odometer(odometer_end);
            if vehicle.status == VehicleStatus::OnTrip {
                vehicle.status = VehicleEvent::Release.apply(vehicle.status)?;
                changed = true;
            }
            if changed {
                vehicle.audit.touch(actor, now);
                tx.update_vehicle(&vehicle).await?;
            }
        }
        release_driver(tx.as_mut(), trip.driver.as_ref(), actor, now).await?;

        trip.status = next;
        trip.odometer.end = Some(odometer_end);
        trip.schedule.actual_arrival = Some(now);
        trip.audit.touch(actor, now);
        tx.update_trip(&trip).await?;
        tx.commit().await?;

        tracing::info!(
            "🏁 Viaje {} completado, {} km",
            trip.trip_reference,
            trip.distance_km().unwrap_or_default()
        );
        Ok(ApiResponse::success_with_message(trip, "Trip completed successfully"))
    }

    pub async fn cancel(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: CancelTripRequest,
    ) -> AppResult<ApiResponse<Trip>> {
        let reason = require_text(request.cancellation_reason.as_deref(), "Cancellation reason is required")?;

        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut trip = load_trip(tx.as_mut(), id).await?;

        TripEvent::Cancel.apply(trip.status)?;
        if trip.status.holds_resources() {
            if let Some(mut vehicle) = tx.vehicle(trip.vehicle.id).await? {
                if vehicle.status == VehicleStatus::OnTrip {
                    vehicle.status = VehicleEvent::Release.apply(vehicle.status)?;
                    vehicle.audit.touch(actor, now);
                    tx.update_vehicle(&vehicle).await?;
                }
            }
            release_driver(tx.as_mut(), trip.driver.as_ref(), actor, now).await?;
        }

        trip.cancel(&reason);
        trip.audit.touch(actor, now);
        tx.update_trip(&trip).await?;
        tx.commit().await?;

        tracing::info!("❌ Viaje {} cancelado: {}", trip.trip_reference, reason);
        Ok(ApiResponse::success_with_message(trip, "Trip cancelled successfully"))
    }

    pub async fn add_expense(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        request: AddExpenseRequest,
    ) -> AppResult<ApiResponse<Expense>> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();
        let mut trip = load_trip(tx.as_mut(), id).await?;

        if !trip.status.accepts_expenses() {
            return Err(bad_request_error(format!(
                "Cannot add expenses to a trip with status \"{}\". Trip must be draft, dispatched, or in transit.",
                trip.status
            )));
        }

        let fuel_details = match request.expense_type {
            ExpenseType::Fuel => match (request.fuel_quantity, request.fuel_type) {
                (Some(quantity), Some(fuel_type)) if quantity > 0.0 => Some(FuelDetails {
                    quantity,
                    unit_price: request.fuel_unit_price.unwrap_or_default(),
                    fuel_type,
                    station_name: request.station_name.unwrap_or_default(),
                    odometer_reading: request.odometer_reading.unwrap_or(0.0),
                }),
                _ => {
                    return Err(bad_request_error(
                        "Fuel quantity (> 0) and fuel type are required for fuel expenses",
                    ))
                }
            },
            _ => None,
        };

        let expense = Expense {
            id: Uuid::new_v4(),
            expense_type: request.expense_type,
            expense_date: request.expense_date.unwrap_or(now),
            amount: request.amount,
            fuel_details,
            notes: request.notes.unwrap_or_default(),
            active: Lifecycle::Active,
            created_by: actor,
            created_at: now,
        };
        expense.check().map_err(bad_request_error)?;

        trip.expenses.push(expense.clone());
        trip.audit.touch(actor, now);
        tx.update_trip(&trip).await?;
        tx.commit().await?;

        tracing::info!(
            "💶 Gasto {} de {} en viaje {}",
            expense.expense_type.as_str(),
            expense.amount,
            trip.trip_reference
        );
        Ok(ApiResponse::success_with_message(expense, "Expense added successfully"))
    }

    pub async fn list_expenses(&self, id: Uuid) -> AppResult<ApiResponse<Vec<Expense>>> {
        let mut tx = self.store.begin().await?;
        let trip = load_trip(tx.as_mut(), id).await?;
        let expenses = trip.active_expenses().cloned().collect();
        Ok(ApiResponse::success_with_message(expenses, "Expenses retrieved successfully"))
    }

    pub async fn delete_expense(
        &self,
        actor: Option<Uuid>,
        id: Uuid,
        expense_id: Uuid,
    ) -> AppResult<ApiResponse<()>> {
        let mut tx = self.store.begin().await?;
        let mut trip = load_trip(tx.as_mut(), id).await?;

        let expense = trip
            .expenses
            .iter_mut()
            .find(|e| e.id == expense_id && e.is_active())
            .ok_or_else(|| not_found_error("Expense"))?;
        expense.active = Lifecycle::Archived;

        trip.audit.touch(actor, Utc::now());
        tx.update_trip(&trip).await?;
        tx.commit().await?;
        Ok(ApiResponse::message_only("Expense deleted successfully"))
    }
}

async fn load_trip(tx: &mut dyn FleetTx, id: Uuid) -> AppResult<Trip> {
    active_trip(tx, id).await?.ok_or_else(|| not_found_error("Trip"))
}

fn check_capacity(weight: f64, max_load: f64) -> AppResult<()> {
    if weight > max_load {
        return Err(bad_request_error(format!(
            "Cargo weight ({}kg) exceeds vehicle max load capacity ({}kg)",
            weight, max_load
        )));
    }
    Ok(())
}

/// Devuelve al conductor a `on_duty` si seguía en ruta
async fn release_driver(
    tx: &mut dyn FleetTx,
    snapshot: Option<&DriverSnapshot>,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let Some(snapshot) = snapshot else {
        return Ok(());
    };
    if let Some(mut driver) = tx.driver(snapshot.id).await? {
        if driver.status == DriverStatus::OnTrip {
            driver.status = DriverEvent::Release.apply(driver.status)?;
            driver.audit.touch(actor, now);
            tx.update_driver(&driver).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::tests::sample_driver;
    use crate::models::driver::Driver;
    use crate::models::reference::LicenseCategory;
    use crate::models::trip::FuelType;
    use crate::models::vehicle::tests::sample_vehicle;
    use crate::models::vehicle::Vehicle;
    use crate::repositories::MemoryFleetStore;
    use rust_decimal::Decimal;

    async fn seed(vehicle: &Vehicle, driver: &Driver) -> Arc<dyn FleetStore> {
        let store: Arc<dyn FleetStore> = Arc::new(MemoryFleetStore::new());
        let mut tx = store.begin().await.unwrap();
        tx.insert_vehicle(vehicle).await.unwrap();
        tx.insert_driver(driver).await.unwrap();
        tx.commit().await.unwrap();
        store
    }

    fn create_request(vehicle_id: Uuid, driver_id: Option<Uuid>, weight: f64) -> CreateTripRequest {
        CreateTripRequest {
            vehicle_id,
            driver_id,
            origin: "Madrid".to_string(),
            destination: "Valencia".to_string(),
            cargo_description: Some("Pallets".to_string()),
            cargo_weight_kg: Some(weight),
            scheduled_departure: None,
            estimated_arrival: None,
            priority: None,
        }
    }

    async fn status_of(store: &Arc<dyn FleetStore>, vehicle_id: Uuid, driver_id: Uuid) -> (VehicleStatus, DriverStatus) {
        let mut tx = store.begin().await.unwrap();
        let vehicle = tx.vehicle(vehicle_id).await.unwrap().unwrap();
        let driver = tx.driver(driver_id).await.unwrap().unwrap();
        (vehicle.status, driver.status)
    }

    #[tokio::test]
    async fn test_full_lifecycle_releases_resources() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        let store = seed(&vehicle, &driver).await;
        let controller = TripController::new(store.clone());

        let trip = controller
            .create(None, create_request(vehicle.id, Some(driver.id), 800.0))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(trip.status, TripStatus::Draft);
        assert_eq!(trip.odometer.start, vehicle.current_odometer);
        assert!(trip.trip_reference.starts_with("TRIP-"));

        controller.dispatch(None, trip.id).await.unwrap();
        assert_eq!(
            status_of(&store, vehicle.id, driver.id).await,
            (VehicleStatus::OnTrip, DriverStatus::OnTrip)
        );

        controller.start(None, trip.id).await.unwrap();
        let done = controller
            .complete(None, trip.id, CompleteTripRequest { odometer_end: Some(12_350.0) })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(done.status, TripStatus::Completed);
        assert_eq!(done.distance_km(), Some(350.0));
        assert_eq!(
            status_of(&store, vehicle.id, driver.id).await,
            (VehicleStatus::Available, DriverStatus::OnDuty)
        );

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.vehicle(vehicle.id).await.unwrap().unwrap().current_odometer, 12_350.0);
    }

    #[tokio::test]
    async fn test_overweight_cargo_is_rejected() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        let controller = TripController::new(seed(&vehicle, &driver).await);

        let err = controller
            .create(None, create_request(vehicle.id, None, 1500.0))
            .await
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(
                msg,
                "Cargo weight (1500kg) exceeds vehicle max load capacity (1000kg)"
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_license_category_mismatch_blocks_assignment() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::B, DriverStatus::OnDuty);
        let controller = TripController::new(seed(&vehicle, &driver).await);

        let err = controller
            .create(None, create_request(vehicle.id, Some(driver.id), 100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("license category")));
    }

    #[tokio::test]
    async fn test_dispatch_without_driver_fails() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        let controller = TripController::new(seed(&vehicle, &driver).await);

        let trip = controller
            .create(None, create_request(vehicle.id, None, 100.0))
            .await
            .unwrap()
            .data
            .unwrap();
        let err = controller.dispatch(None, trip.id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Cannot dispatch trip without a driver"));
    }

    #[tokio::test]
    async fn test_complete_requires_forward_odometer() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        let store = seed(&vehicle, &driver).await;
        let controller = TripController::new(store.clone());
        let trip = controller
            .create(None, create_request(vehicle.id, Some(driver.id), 100.0))
            .await
            .unwrap()
            .data
            .unwrap();
        controller.dispatch(None, trip.id).await.unwrap();

        let err = controller
            .complete(None, trip.id, CompleteTripRequest { odometer_end: Some(11_000.0) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        // Nada cambió
        assert_eq!(
            status_of(&store, vehicle.id, driver.id).await,
            (VehicleStatus::OnTrip, DriverStatus::OnTrip)
        );
    }

    #[tokio::test]
    async fn test_cancel_dispatched_trip_releases_resources() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OffDuty);
        let store = seed(&vehicle, &driver).await;
        let controller = TripController::new(store.clone());
        let trip = controller
            .create(None, create_request(vehicle.id, Some(driver.id), 100.0))
            .await
            .unwrap()
            .data
            .unwrap();
        controller.dispatch(None, trip.id).await.unwrap();

        let missing = CancelTripRequest { cancellation_reason: Some(" ".into()) };
        assert!(controller.cancel(None, trip.id, missing).await.is_err());

        let cancelled = controller
            .cancel(None, trip.id, CancelTripRequest { cancellation_reason: Some("Road closed".into()) })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(cancelled.cancellation_reason, "Road closed");
        assert_eq!(
            status_of(&store, vehicle.id, driver.id).await,
            (VehicleStatus::Available, DriverStatus::OnDuty)
        );
        assert!(controller
            .cancel(None, trip.id, CancelTripRequest { cancellation_reason: Some("again".into()) })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_fuel_expense_requires_quantity_and_type() {
        let vehicle = sample_vehicle();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        let controller = TripController::new(seed(&vehicle, &driver).await);
        let trip = controller
            .create(None, create_request(vehicle.id, None, 100.0))
            .await
            .unwrap()
            .data
            .unwrap();

        assert!(controller.add_expense(None, trip.id, fuel_request(None)).await.is_err());

        let expense = controller
            .add_expense(None, trip.id, fuel_request(Some(60.0)))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(expense.fuel_details.unwrap().quantity, 60.0);

        controller.delete_expense(None, trip.id, expense.id).await.unwrap();
        let remaining = controller.list_expenses(trip.id).await.unwrap().data.unwrap();
        assert!(remaining.is_empty());
        assert!(matches!(
            controller.delete_expense(None, trip.id, expense.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    fn fuel_request(quantity: Option<f64>) -> AddExpenseRequest {
        AddExpenseRequest {
            expense_type: ExpenseType::Fuel,
            amount: Decimal::new(9000, 2),
            expense_date: None,
            fuel_quantity: quantity,
            fuel_unit_price: None,
            fuel_type: Some(FuelType::Diesel),
            station_name: None,
            odometer_reading: None,
            notes: None,
        }
    }
}
