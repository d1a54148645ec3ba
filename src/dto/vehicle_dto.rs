use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{
    non_negative_f64, positive_amount, positive_f64, validate_license_plate, validate_not_empty,
};

// Request para crear un vehículo (siempre nace `available`)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(custom = "validate_not_empty")]
    pub name: String,
    pub vehicle_type_id: Uuid,
    #[validate(custom = "positive_f64")]
    pub max_load_kg: f64,
    #[validate(custom = "non_negative_f64")]
    pub current_odometer: Option<f64>,
    pub acquisition_date: NaiveDate,
    #[validate(custom = "positive_amount")]
    pub acquisition_cost: Decimal,
    pub region_id: Option<Uuid>,
    pub notes: Option<String>,
}

// Request para actualizar un vehículo. `status` y `active` tienen sus
// propias operaciones y se rechazan aquí.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateVehicleRequest {
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(custom = "validate_not_empty")]
    pub name: Option<String>,
    pub vehicle_type_id: Option<Uuid>,
    #[validate(custom = "positive_f64")]
    pub max_load_kg: Option<f64>,
    #[validate(custom = "non_negative_f64")]
    pub current_odometer: Option<f64>,
    pub acquisition_date: Option<NaiveDate>,
    #[validate(custom = "positive_amount")]
    pub acquisition_cost: Option<Decimal>,
    /// Cadena vacía para quitar la región
    pub region_id: Option<String>,
    pub notes: Option<String>,
}

// Query del listado de vehículos
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    pub status: Option<String>,
    pub region_id: Option<String>,
    pub vehicle_type_id: Option<String>,
    pub include_archived: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_rejects_status_and_active() {
        let status: Result<UpdateVehicleRequest, _> = serde_json::from_value(json!({ "status": "available" }));
        assert!(status.is_err());
        let active: Result<UpdateVehicleRequest, _> = serde_json::from_value(json!({ "active": false }));
        assert!(active.is_err());
        let ok: UpdateVehicleRequest = serde_json::from_value(json!({ "notes": "new tyres" })).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_create_validation() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "license_plate": "ab 12",
            "name": "",
            "vehicle_type_id": Uuid::new_v4(),
            "max_load_kg": 0.0,
            "acquisition_date": "2024-03-01",
            "acquisition_cost": 0
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("license_plate"));
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("max_load_kg"));
        assert!(fields.contains_key("acquisition_cost"));
    }
}
