use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::driver::{Contact, DriverStatus, DriverView, TrainingType};
use crate::models::reference::LicenseCategory;
use crate::utils::validation::validate_not_empty;

// Request para dar de alta un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: String,
    #[validate(custom = "validate_not_empty")]
    pub employee_id: String,
    #[validate(custom = "validate_not_empty")]
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expiry: NaiveDate,
    pub date_of_joining: NaiveDate,
    /// Sólo `on_duty` u `off_duty`; por defecto `off_duty`
    pub status: Option<DriverStatus>,
    pub region_id: Option<Uuid>,
    pub contact: Option<Contact>,
    pub medical_cert_expiry: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactPatch {
    pub phone: Option<String>,
    pub email: Option<String>,
}

// Request para actualizar un conductor (sin estado ni ciclo de vida)
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateDriverRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: Option<String>,
    #[validate(custom = "validate_not_empty")]
    pub license_number: Option<String>,
    pub license_category: Option<LicenseCategory>,
    pub license_expiry: Option<NaiveDate>,
    pub date_of_joining: Option<NaiveDate>,
    /// Cadena vacía para quitar la región
    pub region_id: Option<String>,
    pub contact: Option<ContactPatch>,
    pub medical_cert_expiry: Option<NaiveDate>,
}

// Cambio manual on_duty / off_duty
#[derive(Debug, Deserialize)]
pub struct DriverStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuspendDriverRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrainingRecordRequest {
    pub training_type: Option<TrainingType>,
    pub completion_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub certificate_number: Option<String>,
}

// Query del listado de conductores
#[derive(Debug, Default, Deserialize)]
pub struct DriverListQuery {
    pub status: Option<String>,
    pub region_id: Option<String>,
    pub license_category: Option<String>,
    pub compliance: Option<String>,
    pub expiring: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

// Resultado de una suspensión con los viajes cancelados en cascada
#[derive(Debug, Serialize)]
pub struct SuspensionResponse {
    pub driver: DriverView,
    #[serde(rename = "tripsAutoCancel")]
    pub trips_auto_cancel: usize,
}
