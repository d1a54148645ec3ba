use serde::Deserialize;
use validator::Validate;

use crate::models::reference::LicenseCategory;
use crate::utils::validation::{positive_f64, validate_not_empty};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleTypeRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: String,
    #[validate(custom = "positive_f64")]
    pub default_max_load: f64,
    pub required_license_category: LicenseCategory,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRegionRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: String,
    #[validate(length(min = 1, max = 10, message = "Region code must be 1-10 characters"))]
    pub code: String,
}
