//! Coordinador de efectos secundarios
//!
//! Consecuencias de una transición sobre las entidades relacionadas. Todas
//! las funciones reciben la unidad de trabajo abierta por el controlador:
//! si algo falla, el controlador no confirma y no queda nada a medias.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::driver::DriverStatus;
use crate::models::maintenance::{MaintenanceLog, MaintenanceStatus};
use crate::models::trip::TripFilter;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::FleetTx;
use crate::services::status_machine::{DriverEvent, VehicleEvent};
use crate::utils::errors::AppResult;

/// Aplica los efectos de una orden de mantenimiento sobre su vehículo.
///
/// `previous` es el estado anterior de la orden (`None` al crearla). Si no
/// hubo cambio de estado no se toca nada. Devuelve el número de viajes
/// cancelados automáticamente.
pub async fn apply_maintenance_side_effects(
    tx: &mut dyn FleetTx,
    log: &MaintenanceLog,
    vehicle: &mut Vehicle,
    previous: Option<MaintenanceStatus>,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<usize> {
    if previous == Some(log.status) {
        return Ok(0);
    }

    match log.status {
        MaintenanceStatus::InProgress => {
            vehicle.status = VehicleEvent::EnterShop.apply(vehicle.status)?;
            vehicle.audit.touch(actor, now);
            tx.update_vehicle(vehicle).await?;

            let reason = format!(
                "Vehicle sent to maintenance shop: {}",
                log.service_type.label()
            );
            let cancelled =
                cancel_dispatched_trips_for_vehicle(tx, vehicle.id, &reason, actor, now).await?;
            tracing::info!(
                "🔧 Vehículo {} en taller, {} viaje(s) cancelado(s)",
                vehicle.license_plate,
                cancelled
            );
            Ok(cancelled)
        }
        MaintenanceStatus::Completed => {
            let mut changed = false;
            if vehicle.status == VehicleStatus::InShop {
                vehicle.status = VehicleEvent::LeaveShop.apply(vehicle.status)?;
                changed = true;
            }
            changed |= vehicle.advance_odometer(log.odometer_at_service);
            if changed {
                vehicle.audit.touch(actor, now);
                tx.update_vehicle(vehicle).await?;
            }
            Ok(0)
        }
        MaintenanceStatus::Cancelled => {
            // Sólo se deshace lo que esta orden provocó
            if vehicle.status == VehicleStatus::InShop {
                vehicle.status =
                    VehicleEvent::Restore(log.previous_vehicle_status).apply(vehicle.status)?;
                vehicle.audit.touch(actor, now);
                tx.update_vehicle(vehicle).await?;
            }
            Ok(0)
        }
        MaintenanceStatus::Scheduled => Ok(0),
    }
}

/// Cancela los viajes `dispatched` de un vehículo y libera a sus conductores
pub async fn cancel_dispatched_trips_for_vehicle(
    tx: &mut dyn FleetTx,
    vehicle_id: Uuid,
    reason: &str,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<usize> {
    let trips = tx.trips(&TripFilter::dispatched_for_vehicle(vehicle_id)).await?;
    let count = trips.len();

    for mut trip in trips {
        trip.cancel(reason);
        trip.audit.touch(actor, now);
        tx.update_trip(&trip).await?;

        if let Some(snapshot) = &trip.driver {
            if let Some(mut driver) = tx.driver(snapshot.id).await? {
                if driver.status == DriverStatus::OnTrip {
                    driver.status = DriverEvent::Release.apply(driver.status)?;
                    driver.audit.touch(actor, now);
                    tx.update_driver(&driver).await?;
                }
            }
        }
    }

    Ok(count)
}

/// Cancela los viajes `dispatched` de un conductor y libera sus vehículos
pub async fn cancel_dispatched_trips_for_driver(
    tx: &mut dyn FleetTx,
    driver_id: Uuid,
    reason: &str,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<usize> {
    let trips = tx.trips(&TripFilter::dispatched_for_driver(driver_id)).await?;
    let count = trips.len();

    for mut trip in trips {
        trip.cancel(reason);
        trip.audit.touch(actor, now);
        tx.update_trip(&trip).await?;

        if let Some(mut vehicle) = tx.vehicle(trip.vehicle.id).await? {
            if vehicle.status == VehicleStatus::OnTrip {
                vehicle.status = VehicleEvent::Release.apply(vehicle.status)?;
                vehicle.audit.touch(actor, now);
                tx.update_vehicle(&vehicle).await?;
            }
        }
    }

    Ok(count)
}
