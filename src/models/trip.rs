//! Modelo de Trip
//!
//! Viajes con sus gastos embebidos. El vehículo, el conductor y la región
//! se guardan como snapshots tomados al crear el viaje.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::common::{Audit, Lifecycle};
use super::snapshot::{DriverSnapshot, RegionSnapshot, VehicleSnapshot};

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Draft,
    Dispatched,
    InTransit,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 5] = [
        Self::Draft,
        Self::Dispatched,
        Self::InTransit,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Dispatched => "dispatched",
            Self::InTransit => "in_transit",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Sólo se registran gastos en viajes abiertos
    pub fn accepts_expenses(&self) -> bool {
        matches!(self, Self::Draft | Self::Dispatched | Self::InTransit)
    }

    /// Viaje que ya reclamó vehículo y conductor
    pub fn holds_resources(&self) -> bool {
        matches!(self, Self::Dispatched | Self::InTransit)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid trip status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, Default)]
#[sqlx(type_name = "trip_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl FromStr for TripPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("Invalid priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Fuel,
    Toll,
    Parking,
    Fine,
    Other,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Toll => "toll",
            Self::Parking => "parking",
            Self::Fine => "fine",
            Self::Other => "other",
        }
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Fuel, Self::Toll, Self::Parking, Self::Fine, Self::Other]
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid expense type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Diesel,
    Petrol,
    Electric,
    Cng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelDetails {
    pub quantity: f64,
    pub unit_price: Decimal,
    pub fuel_type: FuelType,
    pub station_name: String,
    pub odometer_reading: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub expense_type: ExpenseType,
    pub expense_date: DateTime<Utc>,
    pub amount: Decimal,
    pub fuel_details: Option<FuelDetails>,
    pub notes: String,
    pub active: Lifecycle,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    /// Reglas del documento de gasto
    pub fn check(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("Amount must be greater than 0".to_string());
        }
        match (&self.expense_type, &self.fuel_details) {
            (ExpenseType::Fuel, None) => {
                Err("Fuel details are required for fuel expenses".to_string())
            }
            (ExpenseType::Fuel, Some(details)) if details.quantity <= 0.0 => {
                Err("Fuel quantity must be greater than 0".to_string())
            }
            (ExpenseType::Fuel, Some(details))
                if details.unit_price < Decimal::ZERO || details.odometer_reading < 0.0 =>
            {
                Err("Fuel unit price and odometer reading cannot be negative".to_string())
            }
            (ExpenseType::Fuel, Some(_)) => Ok(()),
            (_, Some(_)) => Err("Fuel details are only allowed on fuel expenses".to_string()),
            (_, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cargo {
    pub description: String,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Odometer {
    pub start: f64,
    pub end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub trip_reference: String,
    pub origin: String,
    pub destination: String,
    pub cargo: Cargo,
    pub schedule: Schedule,
    pub priority: TripPriority,
    pub vehicle: VehicleSnapshot,
    pub driver: Option<DriverSnapshot>,
    pub status: TripStatus,
    pub odometer: Odometer,
    pub cancellation_reason: String,
    pub expenses: Vec<Expense>,
    pub region: Option<RegionSnapshot>,
    pub active: Lifecycle,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Trip {
    /// `TRIP-<YYYYMMDD>-<últimos 6 hex del id en mayúsculas>`
    pub fn reference_for(id: Uuid, date: NaiveDate) -> String {
        let hex = id.simple().to_string();
        format!(
            "TRIP-{}-{}",
            date.format("%Y%m%d"),
            hex[hex.len() - 6..].to_uppercase()
        )
    }

    /// Distancia recorrida, disponible una vez completado
    pub fn distance_km(&self) -> Option<f64> {
        self.odometer.end.map(|end| end - self.odometer.start)
    }

    pub fn active_expenses(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(|e| e.is_active())
    }

    pub fn cancel(&mut self, reason: &str) {
        self.status = TripStatus::Cancelled;
        self.cancellation_reason = reason.trim().to_string();
    }

    /// Invariantes permanentes del documento
    pub fn check(&self) -> Result<(), String> {
        let has_reason = !self.cancellation_reason.trim().is_empty();
        match (self.status, has_reason) {
            (TripStatus::Cancelled, false) => {
                Err("Cancellation reason is required for cancelled trips".to_string())
            }
            (status, true) if status != TripStatus::Cancelled => {
                Err("Only cancelled trips can carry a cancellation reason".to_string())
            }
            _ if self.cargo.weight_kg < 0.0 => Err("Cargo weight cannot be negative".to_string()),
            _ => Ok(()),
        }
    }
}

/// Filtro de listado de viajes
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub statuses: Option<Vec<TripStatus>>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    pub priority: Option<TripPriority>,
    pub include_archived: bool,
}

impl TripFilter {
    pub fn dispatched_for_vehicle(vehicle_id: Uuid) -> Self {
        Self {
            statuses: Some(vec![TripStatus::Dispatched]),
            vehicle_id: Some(vehicle_id),
            ..Default::default()
        }
    }

    pub fn dispatched_for_driver(driver_id: Uuid) -> Self {
        Self {
            statuses: Some(vec![TripStatus::Dispatched]),
            driver_id: Some(driver_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        if !self.include_archived && !trip.active.is_active() {
            return false;
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&trip.status) {
                return false;
            }
        }
        if let Some(vehicle_id) = self.vehicle_id {
            if trip.vehicle.id != vehicle_id {
                return false;
            }
        }
        if let Some(driver_id) = self.driver_id {
            if trip.driver.as_ref().map(|d| d.id) != Some(driver_id) {
                return false;
            }
        }
        if let Some(region_id) = self.region_id {
            if trip.region.as_ref().map(|r| r.id) != Some(region_id) {
                return false;
            }
        }
        if let Some(type_id) = self.vehicle_type_id {
            if trip.vehicle.vehicle_type_id != type_id {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if trip.priority != priority {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_trip(vehicle: VehicleSnapshot) -> Trip {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Trip {
            id,
            trip_reference: Trip::reference_for(id, now.date_naive()),
            origin: "Depot A".to_string(),
            destination: "Warehouse B".to_string(),
            cargo: Cargo {
                description: "Pallets".to_string(),
                weight_kg: 400.0,
            },
            schedule: Schedule::default(),
            priority: TripPriority::Medium,
            vehicle,
            driver: None,
            status: TripStatus::Draft,
            odometer: Odometer {
                start: 1000.0,
                end: None,
            },
            cancellation_reason: String::new(),
            expenses: Vec::new(),
            region: None,
            active: Lifecycle::Active,
            audit: Audit::new(None, now),
        }
    }

    fn snapshot() -> VehicleSnapshot {
        VehicleSnapshot {
            id: Uuid::new_v4(),
            license_plate: "TRK-0001".to_string(),
            name: "Volvo FH".to_string(),
            vehicle_type_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_reference_format() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655abcdef").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(Trip::reference_for(id, date), "TRIP-20260115-ABCDEF");
    }

    #[test]
    fn test_cancelled_trip_requires_reason() {
        let mut trip = sample_trip(snapshot());
        assert!(trip.check().is_ok());
        trip.status = TripStatus::Cancelled;
        assert!(trip.check().is_err());
        trip.cancel("Customer withdrew order");
        assert!(trip.check().is_ok());
    }

    #[test]
    fn test_reason_only_on_cancelled_trips() {
        let mut trip = sample_trip(snapshot());
        trip.cancellation_reason = "stale".to_string();
        assert!(trip.check().is_err());
    }

    #[test]
    fn test_expense_rules() {
        let now = Utc::now();
        let mut expense = Expense {
            id: Uuid::new_v4(),
            expense_type: ExpenseType::Fuel,
            expense_date: now,
            amount: Decimal::new(120, 0),
            fuel_details: None,
            notes: String::new(),
            active: Lifecycle::Active,
            created_by: None,
            created_at: now,
        };
        assert!(expense.check().is_err());

        expense.fuel_details = Some(FuelDetails {
            quantity: 40.0,
            unit_price: Decimal::new(3, 0),
            fuel_type: FuelType::Diesel,
            station_name: String::new(),
            odometer_reading: 1200.0,
        });
        assert!(expense.check().is_ok());

        expense.expense_type = ExpenseType::Toll;
        assert!(expense.check().is_err());
        expense.fuel_details = None;
        assert!(expense.check().is_ok());

        expense.amount = Decimal::ZERO;
        assert!(expense.check().is_err());
    }

    #[test]
    fn test_filter_dispatched_for_driver() {
        let mut trip = sample_trip(snapshot());
        let driver_id = Uuid::new_v4();
        trip.driver = Some(DriverSnapshot {
            id: driver_id,
            name: "Alex".to_string(),
            employee_id: "EMP-1".to_string(),
        });
        let filter = TripFilter::dispatched_for_driver(driver_id);
        assert!(!filter.matches(&trip));
        trip.status = TripStatus::Dispatched;
        assert!(filter.matches(&trip));
    }

    #[test]
    fn test_distance_after_completion() {
        let mut trip = sample_trip(snapshot());
        assert_eq!(trip.distance_km(), None);
        trip.odometer.end = Some(1250.0);
        assert_eq!(trip.distance_km(), Some(250.0));
    }
}
