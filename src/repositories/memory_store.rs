//! Almacén en memoria
//!
//! Se usa cuando no hay `DATABASE_URL` y en los tests. Las unidades de
//! trabajo se serializan detrás de un mutex asíncrono. Las lecturas van
//! directamente contra los datos publicados; la primera escritura copia el
//! estado completo y esa copia sólo se publica en `commit`.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{FleetStore, FleetTx};
use crate::models::driver::{Driver, DriverFilter};
use crate::models::maintenance::{MaintenanceFilter, MaintenanceLog};
use crate::models::reference::{Region, VehicleType};
use crate::models::safety_incident::{IncidentFilter, SafetyIncident};
use crate::models::trip::{Trip, TripFilter};
use crate::models::vehicle::{Vehicle, VehicleFilter};
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

#[derive(Debug, Default, Clone)]
struct FleetData {
    vehicles: HashMap<Uuid, Vehicle>,
    drivers: HashMap<Uuid, Driver>,
    trips: HashMap<Uuid, Trip>,
    maintenance_logs: HashMap<Uuid, MaintenanceLog>,
    safety_incidents: HashMap<Uuid, SafetyIncident>,
    vehicle_types: HashMap<Uuid, VehicleType>,
    regions: HashMap<Uuid, Region>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFleetStore {
    data: Arc<Mutex<FleetData>>,
}

impl MemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for MemoryFleetStore {
    async fn begin(&self) -> AppResult<Box<dyn FleetTx>> {
        let guard = self.data.clone().lock_owned().await;
        Ok(Box::new(MemoryFleetTx { guard, working: None }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

struct MemoryFleetTx {
    guard: OwnedMutexGuard<FleetData>,
    /// Copia de trabajo, creada en la primera escritura
    working: Option<FleetData>,
}

impl MemoryFleetTx {
    fn data(&self) -> &FleetData {
        match &self.working {
            Some(working) => working,
            None => &*self.guard,
        }
    }

    fn data_mut(&mut self) -> &mut FleetData {
        let published = &self.guard;
        self.working.get_or_insert_with(|| FleetData::clone(published))
    }
}

fn replace<T: Clone>(
    map: &mut HashMap<Uuid, T>,
    id: Uuid,
    value: &T,
    entity: &str,
) -> AppResult<()> {
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(not_found_error(entity)),
    }
}

fn conflict(message: String) -> AppError {
    AppError::Conflict(message)
}

#[async_trait]
impl FleetTx for MemoryFleetTx {
    async fn vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.data().vehicles.get(&id).cloned())
    }

    async fn read_vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>> {
        self.vehicle(id).await
    }

    async fn vehicles(&mut self, filter: &VehicleFilter) -> AppResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .data()
            .vehicles
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.audit.created_at.cmp(&a.audit.created_at));
        Ok(vehicles)
    }

    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<()> {
        if self.license_plate_taken(&vehicle.license_plate, None).await? {
            return Err(conflict(format!(
                "License plate '{}' is already registered",
                vehicle.license_plate
            )));
        }
        self.data_mut().vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<()> {
        if self.license_plate_taken(&vehicle.license_plate, Some(vehicle.id)).await? {
            return Err(conflict(format!(
                "License plate '{}' is already registered",
                vehicle.license_plate
            )));
        }
        replace(&mut self.data_mut().vehicles, vehicle.id, vehicle, "Vehicle")
    }

    async fn license_plate_taken(&mut self, plate: &str, except: Option<Uuid>) -> AppResult<bool> {
        Ok(self
            .data()
            .vehicles
            .values()
            .any(|v| v.license_plate == plate && Some(v.id) != except))
    }

    async fn driver(&mut self, id: Uuid) -> AppResult<Option<Driver>> {
        Ok(self.data().drivers.get(&id).cloned())
    }

    async fn drivers(&mut self, filter: &DriverFilter, today: NaiveDate) -> AppResult<Vec<Driver>> {
        let mut drivers: Vec<Driver> = self
            .data()
            .drivers
            .values()
            .filter(|d| filter.matches(d, today))
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }

    async fn insert_driver(&mut self, driver: &Driver) -> AppResult<()> {
        if self.employee_id_taken(&driver.employee_id, None).await? {
            return Err(conflict(format!(
                "Employee ID '{}' is already in use",
                driver.employee_id
            )));
        }
        if self.license_number_taken(&driver.license_number, None).await? {
            return Err(conflict(format!(
                "License number '{}' is already in use",
                driver.license_number
            )));
        }
        self.data_mut().drivers.insert(driver.id, driver.clone());
        Ok(())
    }

    async fn update_driver(&mut self, driver: &Driver) -> AppResult<()> {
        if self.license_number_taken(&driver.license_number, Some(driver.id)).await? {
            return Err(conflict(format!(
                "License number '{}' is already in use",
                driver.license_number
            )));
        }
        replace(&mut self.data_mut().drivers, driver.id, driver, "Driver")
    }

    async fn employee_id_taken(&mut self, employee_id: &str, except: Option<Uuid>) -> AppResult<bool> {
        Ok(self
            .data()
            .drivers
            .values()
            .any(|d| d.employee_id == employee_id && Some(d.id) != except))
    }

    async fn license_number_taken(&mut self, license_number: &str, except: Option<Uuid>) -> AppResult<bool> {
        Ok(self
            .data()
            .drivers
            .values()
            .any(|d| d.license_number == license_number && Some(d.id) != except))
    }

    async fn trip(&mut self, id: Uuid) -> AppResult<Option<Trip>> {
        Ok(self.data().trips.get(&id).cloned())
    }

    async fn trips(&mut self, filter: &TripFilter) -> AppResult<Vec<Trip>> {
        let mut trips: Vec<Trip> = self
            .data()
            .trips
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.audit.created_at.cmp(&a.audit.created_at));
        Ok(trips)
    }

    async fn insert_trip(&mut self, trip: &Trip) -> AppResult<()> {
        trip.check().map_err(bad_request_error)?;
        if self
            .data()
            .trips
            .values()
            .any(|t| t.trip_reference == trip.trip_reference)
        {
            return Err(conflict(format!(
                "Trip reference '{}' already exists",
                trip.trip_reference
            )));
        }
        self.data_mut().trips.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn update_trip(&mut self, trip: &Trip) -> AppResult<()> {
        trip.check().map_err(bad_request_error)?;
        replace(&mut self.data_mut().trips, trip.id, trip, "Trip")
    }

    async fn maintenance_log(&mut self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        Ok(self.data().maintenance_logs.get(&id).cloned())
    }

    async fn maintenance_logs(&mut self, filter: &MaintenanceFilter) -> AppResult<Vec<MaintenanceLog>> {
        let now = chrono::Utc::now();
        let mut logs: Vec<MaintenanceLog> = self
            .data()
            .maintenance_logs
            .values()
            .filter(|l| filter.matches(l, now))
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.dates.scheduled.cmp(&b.dates.scheduled));
        Ok(logs)
    }

    async fn insert_maintenance_log(&mut self, log: &MaintenanceLog) -> AppResult<()> {
        log.check().map_err(bad_request_error)?;
        self.data_mut().maintenance_logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn update_maintenance_log(&mut self, log: &MaintenanceLog) -> AppResult<()> {
        log.check().map_err(bad_request_error)?;
        replace(&mut self.data_mut().maintenance_logs, log.id, log, "Maintenance log")
    }

    async fn safety_incident(&mut self, id: Uuid) -> AppResult<Option<SafetyIncident>> {
        Ok(self.data().safety_incidents.get(&id).cloned())
    }

    async fn safety_incidents(&mut self, filter: &IncidentFilter) -> AppResult<Vec<SafetyIncident>> {
        let mut incidents: Vec<SafetyIncident> = self
            .data()
            .safety_incidents
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        incidents.sort_by(|a, b| b.incident_date.cmp(&a.incident_date));
        Ok(incidents)
    }

    async fn insert_safety_incident(&mut self, incident: &SafetyIncident) -> AppResult<()> {
        self.data_mut().safety_incidents.insert(incident.id, incident.clone());
        Ok(())
    }

    async fn update_safety_incident(&mut self, incident: &SafetyIncident) -> AppResult<()> {
        replace(&mut self.data_mut().safety_incidents, incident.id, incident, "Safety incident")
    }

    async fn vehicle_type(&mut self, id: Uuid) -> AppResult<Option<VehicleType>> {
        Ok(self.data().vehicle_types.get(&id).cloned())
    }

    async fn vehicle_types(&mut self) -> AppResult<Vec<VehicleType>> {
        let mut types: Vec<VehicleType> = self
            .data()
            .vehicle_types
            .values()
            .filter(|t| t.active.is_active())
            .cloned()
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn insert_vehicle_type(&mut self, vehicle_type: &VehicleType) -> AppResult<()> {
        if self
            .data()
            .vehicle_types
            .values()
            .any(|t| t.name.eq_ignore_ascii_case(&vehicle_type.name))
        {
            return Err(conflict(format!(
                "Vehicle type '{}' already exists",
                vehicle_type.name
            )));
        }
        self.data_mut()
            .vehicle_types
            .insert(vehicle_type.id, vehicle_type.clone());
        Ok(())
    }

    async fn region(&mut self, id: Uuid) -> AppResult<Option<Region>> {
        Ok(self.data().regions.get(&id).cloned())
    }

    async fn regions(&mut self) -> AppResult<Vec<Region>> {
        let mut regions: Vec<Region> = self
            .data()
            .regions
            .values()
            .filter(|r| r.active.is_active())
            .cloned()
            .collect();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(regions)
    }

    async fn insert_region(&mut self, region: &Region) -> AppResult<()> {
        if self
            .data()
            .regions
            .values()
            .any(|r| r.name.eq_ignore_ascii_case(&region.name) || r.code == region.code)
        {
            return Err(conflict(format!(
                "Region '{}' ({}) already exists",
                region.name, region.code
            )));
        }
        self.data_mut().regions.insert(region.id, region.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryFleetTx { mut guard, working } = *self;
        if let Some(working) = working {
            *guard = working;
        }
        Ok(())
    }
}
