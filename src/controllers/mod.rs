//! Controladores
//!
//! Cada operación abre una unidad de trabajo, comprueba las guardas, aplica
//! la transición y sus efectos secundarios y confirma al final. Cualquier
//! `?` antes del `commit` descarta todo.

pub mod analytics_controller;
pub mod driver_controller;
pub mod incident_controller;
pub mod maintenance_controller;
pub mod meta_controller;
pub mod trip_controller;
pub mod vehicle_controller;

use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::maintenance::MaintenanceLog;
use crate::models::reference::{Region, VehicleType};
use crate::models::snapshot::RegionSnapshot;
use crate::models::safety_incident::SafetyIncident;
use crate::models::trip::Trip;
use crate::models::vehicle::Vehicle;
use crate::repositories::FleetTx;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::parse_uuid;

// Lecturas que sólo devuelven registros activos

pub(crate) async fn active_vehicle(tx: &mut dyn FleetTx, id: Uuid) -> AppResult<Option<Vehicle>> {
    Ok(tx.vehicle(id).await?.filter(Vehicle::is_active))
}

pub(crate) async fn active_driver(tx: &mut dyn FleetTx, id: Uuid) -> AppResult<Option<Driver>> {
    Ok(tx.driver(id).await?.filter(Driver::is_active))
}

pub(crate) async fn active_trip(tx: &mut dyn FleetTx, id: Uuid) -> AppResult<Option<Trip>> {
    Ok(tx.trip(id).await?.filter(|t| t.active.is_active()))
}

pub(crate) async fn active_maintenance_log(
    tx: &mut dyn FleetTx,
    id: Uuid,
) -> AppResult<Option<MaintenanceLog>> {
    Ok(tx.maintenance_log(id).await?.filter(MaintenanceLog::is_active))
}

pub(crate) async fn active_incident(
    tx: &mut dyn FleetTx,
    id: Uuid,
) -> AppResult<Option<SafetyIncident>> {
    Ok(tx.safety_incident(id).await?.filter(|i| i.active.is_active()))
}

pub(crate) async fn active_vehicle_type(
    tx: &mut dyn FleetTx,
    id: Uuid,
) -> AppResult<Option<VehicleType>> {
    Ok(tx.vehicle_type(id).await?.filter(|t| t.active.is_active()))
}

pub(crate) async fn active_region(tx: &mut dyn FleetTx, id: Uuid) -> AppResult<Option<Region>> {
    Ok(tx.region(id).await?.filter(|r| r.active.is_active()))
}

pub(crate) async fn region_snapshot(tx: &mut dyn FleetTx, region_id: Uuid) -> AppResult<RegionSnapshot> {
    active_region(tx, region_id)
        .await?
        .map(|region| RegionSnapshot::from(&region))
        .ok_or_else(|| AppError::NotFound("Region not found or inactive".to_string()))
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// UUID opcional de una query; vacío equivale a ausente
pub(crate) fn parse_optional_uuid(value: Option<&str>, field: &str) -> AppResult<Option<Uuid>> {
    non_blank(value).map(|v| parse_uuid(v, field)).transpose()
}
