//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, su estado operativo y el filtro
//! de listados. El estado sólo cambia a través de la máquina de estados.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::common::{Audit, Lifecycle};
use super::snapshot::{RegionSnapshot, VehicleTypeSnapshot};

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    OnTrip,
    InShop,
    OutOfService,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        Self::Available,
        Self::OnTrip,
        Self::InShop,
        Self::OutOfService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnTrip => "on_trip",
            Self::InShop => "in_shop",
            Self::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid vehicle status: {}", s))
    }
}

/// Vehicle principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,
    pub name: String,
    pub vehicle_type: VehicleTypeSnapshot,
    pub max_load_kg: f64,
    pub current_odometer: f64,
    pub acquisition_date: NaiveDate,
    pub acquisition_cost: Decimal,
    pub status: VehicleStatus,
    pub region: Option<RegionSnapshot>,
    pub notes: String,
    pub active: Lifecycle,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Vehicle {
    /// Avanza el odómetro sólo si la lectura es mayor; nunca retrocede.
    /// Devuelve `true` si hubo cambio.
    pub fn advance_odometer(&mut self, reading: f64) -> bool {
        if reading > self.current_odometer {
            self.current_odometer = reading;
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }
}

/// Filtro de listado de vehículos
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub statuses: Option<Vec<VehicleStatus>>,
    pub region_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    /// Por defecto sólo se listan los activos
    pub include_archived: bool,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if !self.include_archived && !vehicle.is_active() {
            return false;
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&vehicle.status) {
                return false;
            }
        }
        if let Some(region_id) = self.region_id {
            if vehicle.region.as_ref().map(|r| r.id) != Some(region_id) {
                return false;
            }
        }
        if let Some(type_id) = self.vehicle_type_id {
            if vehicle.vehicle_type.id != type_id {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::reference::LicenseCategory;
    use chrono::Utc;

    pub(crate) fn sample_vehicle() -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            license_plate: "TRK-0001".to_string(),
            name: "Volvo FH".to_string(),
            vehicle_type: VehicleTypeSnapshot {
                id: Uuid::new_v4(),
                name: "Truck".to_string(),
                required_license_category: Some(LicenseCategory::C),
            },
            max_load_kg: 1000.0,
            current_odometer: 12_000.0,
            acquisition_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            acquisition_cost: Decimal::new(85_000, 0),
            status: VehicleStatus::Available,
            region: None,
            notes: String::new(),
            active: Lifecycle::Active,
            audit: Audit::new(None, Utc::now()),
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in VehicleStatus::ALL {
            assert_eq!(status.as_str().parse::<VehicleStatus>().unwrap(), status);
        }
        assert!("retired".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn test_odometer_never_regresses() {
        let mut vehicle = sample_vehicle();
        assert!(!vehicle.advance_odometer(11_000.0));
        assert_eq!(vehicle.current_odometer, 12_000.0);
        assert!(vehicle.advance_odometer(12_500.0));
        assert_eq!(vehicle.current_odometer, 12_500.0);
    }

    #[test]
    fn test_filter_excludes_archived_and_other_regions() {
        let mut vehicle = sample_vehicle();
        let filter = VehicleFilter {
            region_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!filter.matches(&vehicle));

        assert!(VehicleFilter::default().matches(&vehicle));
        vehicle.active = Lifecycle::Archived;
        assert!(!VehicleFilter::default().matches(&vehicle));
        let with_archived = VehicleFilter {
            include_archived: true,
            ..Default::default()
        };
        assert!(with_archived.matches(&vehicle));
    }

    #[test]
    fn test_serialized_vehicle_uses_snake_case_status() {
        let mut vehicle = sample_vehicle();
        vehicle.status = VehicleStatus::OutOfService;
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["status"], "out_of_service");
        assert_eq!(json["active"], true);
        assert!(json.get("created_at").is_some());
    }
}
