//! Repositorios
//!
//! `FleetStore` abre unidades de trabajo (`FleetTx`). Cada transición de
//! estado y todos sus efectos secundarios se ejecutan dentro de una única
//! unidad de trabajo: o se confirma todo con `commit`, o nada (al soltar la
//! transacción sin confirmar se descarta).

pub mod memory_store;
pub mod postgres_store;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::driver::{Driver, DriverFilter};
use crate::models::maintenance::{MaintenanceFilter, MaintenanceLog};
use crate::models::reference::{Region, VehicleType};
use crate::models::safety_incident::{IncidentFilter, SafetyIncident};
use crate::models::trip::{Trip, TripFilter};
use crate::models::vehicle::{Vehicle, VehicleFilter};
use crate::utils::errors::AppResult;

pub use memory_store::MemoryFleetStore;
pub use postgres_store::PgFleetStore;

#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn FleetTx>>;

    /// Nombre del backend para logs y health check
    fn backend(&self) -> &'static str;
}

/// Unidad de trabajo. Las lecturas por id bloquean la fila hasta el final
/// de la transacción en los backends que lo soportan.
#[async_trait]
pub trait FleetTx: Send {
    // Vehículos
    async fn vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>>;
    /// Lectura sin bloqueo de fila, para informes
    async fn read_vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn vehicles(&mut self, filter: &VehicleFilter) -> AppResult<Vec<Vehicle>>;
    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<()>;
    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<()>;
    async fn license_plate_taken(&mut self, plate: &str, except: Option<Uuid>) -> AppResult<bool>;

    // Conductores
    async fn driver(&mut self, id: Uuid) -> AppResult<Option<Driver>>;
    async fn drivers(&mut self, filter: &DriverFilter, today: NaiveDate) -> AppResult<Vec<Driver>>;
    async fn insert_driver(&mut self, driver: &Driver) -> AppResult<()>;
    async fn update_driver(&mut self, driver: &Driver) -> AppResult<()>;
    async fn employee_id_taken(&mut self, employee_id: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn license_number_taken(&mut self, license_number: &str, except: Option<Uuid>) -> AppResult<bool>;

    // Viajes
    async fn trip(&mut self, id: Uuid) -> AppResult<Option<Trip>>;
    /// Ordenados del más reciente al más antiguo
    async fn trips(&mut self, filter: &TripFilter) -> AppResult<Vec<Trip>>;
    async fn insert_trip(&mut self, trip: &Trip) -> AppResult<()>;
    async fn update_trip(&mut self, trip: &Trip) -> AppResult<()>;

    // Mantenimiento
    async fn maintenance_log(&mut self, id: Uuid) -> AppResult<Option<MaintenanceLog>>;
    async fn maintenance_logs(&mut self, filter: &MaintenanceFilter) -> AppResult<Vec<MaintenanceLog>>;
    async fn insert_maintenance_log(&mut self, log: &MaintenanceLog) -> AppResult<()>;
    async fn update_maintenance_log(&mut self, log: &MaintenanceLog) -> AppResult<()>;

    // Incidentes
    async fn safety_incident(&mut self, id: Uuid) -> AppResult<Option<SafetyIncident>>;
    async fn safety_incidents(&mut self, filter: &IncidentFilter) -> AppResult<Vec<SafetyIncident>>;
    async fn insert_safety_incident(&mut self, incident: &SafetyIncident) -> AppResult<()>;
    async fn update_safety_incident(&mut self, incident: &SafetyIncident) -> AppResult<()>;

    // Datos de referencia
    async fn vehicle_type(&mut self, id: Uuid) -> AppResult<Option<VehicleType>>;
    async fn vehicle_types(&mut self) -> AppResult<Vec<VehicleType>>;
    async fn insert_vehicle_type(&mut self, vehicle_type: &VehicleType) -> AppResult<()>;
    async fn region(&mut self, id: Uuid) -> AppResult<Option<Region>>;
    async fn regions(&mut self) -> AppResult<Vec<Region>>;
    async fn insert_region(&mut self, region: &Region) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
