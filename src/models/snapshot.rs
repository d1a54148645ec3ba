//! Snapshots embebidos
//!
//! Copias superficiales de los campos de presentación de una entidad
//! referenciada, tomadas en el momento de la escritura. No se refrescan
//! cuando cambia el origen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::driver::Driver;
use super::reference::{LicenseCategory, Region, VehicleType};
use super::trip::Trip;
use super::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeSnapshot {
    pub id: Uuid,
    pub name: String,
    pub required_license_category: Option<LicenseCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

/// Vehículo tal como se embebe en viajes y órdenes de mantenimiento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: Uuid,
    pub license_plate: String,
    pub name: String,
    pub vehicle_type_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSnapshot {
    pub id: Uuid,
    pub name: String,
    pub employee_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub id: Uuid,
    pub trip_reference: String,
}

impl From<&VehicleType> for VehicleTypeSnapshot {
    fn from(vehicle_type: &VehicleType) -> Self {
        Self {
            id: vehicle_type.id,
            name: vehicle_type.name.clone(),
            required_license_category: Some(vehicle_type.required_license_category),
        }
    }
}

impl From<&Region> for RegionSnapshot {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id,
            name: region.name.clone(),
            code: region.code.clone(),
        }
    }
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            license_plate: vehicle.license_plate.clone(),
            name: vehicle.name.clone(),
            vehicle_type_id: vehicle.vehicle_type.id,
        }
    }
}

impl From<&Driver> for DriverSnapshot {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name.clone(),
            employee_id: driver.employee_id.clone(),
        }
    }
}

impl From<&Trip> for TripSnapshot {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id,
            trip_reference: trip.trip_reference.clone(),
        }
    }
}
