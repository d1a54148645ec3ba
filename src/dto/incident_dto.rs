use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::safety_incident::{IncidentType, Severity};
use crate::utils::validation::validate_not_empty;

// Request para registrar un incidente de seguridad
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIncidentRequest {
    pub driver_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub incident_date: Option<DateTime<Utc>>,
    pub incident_type: IncidentType,
    #[validate(custom = "validate_not_empty")]
    pub description: String,
    pub severity: Option<Severity>,
    pub actions_taken: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IncidentListQuery {
    pub driver_id: Option<String>,
}
