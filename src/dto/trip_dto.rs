use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::{ExpenseType, FuelType, TripPriority};
use crate::utils::validation::{
    non_negative_amount, non_negative_f64, positive_amount, validate_not_empty,
};

// Request para crear un viaje en borrador
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,
    #[validate(custom = "validate_not_empty")]
    pub origin: String,
    #[validate(custom = "validate_not_empty")]
    pub destination: String,
    pub cargo_description: Option<String>,
    #[validate(custom = "non_negative_f64")]
    pub cargo_weight_kg: Option<f64>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub priority: Option<TripPriority>,
}

// Campos editables mientras el viaje está en draft o dispatched
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTripRequest {
    #[validate(custom = "validate_not_empty")]
    pub origin: Option<String>,
    #[validate(custom = "validate_not_empty")]
    pub destination: Option<String>,
    pub cargo_description: Option<String>,
    #[validate(custom = "non_negative_f64")]
    pub cargo_weight_kg: Option<f64>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub priority: Option<TripPriority>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTripRequest {
    pub odometer_end: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CancelTripRequest {
    pub cancellation_reason: Option<String>,
}

// Request para registrar un gasto
#[derive(Debug, Deserialize, Validate)]
pub struct AddExpenseRequest {
    pub expense_type: ExpenseType,
    #[validate(custom = "positive_amount")]
    pub amount: Decimal,
    pub expense_date: Option<DateTime<Utc>>,
    pub fuel_quantity: Option<f64>,
    #[validate(custom = "non_negative_amount")]
    pub fuel_unit_price: Option<Decimal>,
    pub fuel_type: Option<FuelType>,
    pub station_name: Option<String>,
    #[validate(custom = "non_negative_f64")]
    pub odometer_reading: Option<f64>,
    pub notes: Option<String>,
}

// Query del listado de viajes
#[derive(Debug, Default, Deserialize)]
pub struct TripListQuery {
    pub status: Option<String>,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
    pub region_id: Option<String>,
    pub priority: Option<String>,
    pub include_archived: Option<String>,
}
