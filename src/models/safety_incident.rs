//! Incidentes de seguridad de los conductores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

use super::common::{Audit, Lifecycle};
use super::snapshot::{DriverSnapshot, TripSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "incident_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Accident,
    Violation,
    NearMiss,
    Complaint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "incident_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyIncident {
    pub id: Uuid,
    pub driver: DriverSnapshot,
    pub trip: Option<TripSnapshot>,
    pub incident_date: DateTime<Utc>,
    pub incident_type: IncidentType,
    pub description: String,
    pub severity: Severity,
    pub actions_taken: String,
    pub active: Lifecycle,
    #[serde(flatten)]
    pub audit: Audit,
}

/// Filtro de incidentes (siempre sólo activos salvo que se indique)
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub driver_id: Option<Uuid>,
    pub include_archived: bool,
}

impl IncidentFilter {
    pub fn for_driver(driver_id: Uuid) -> Self {
        Self {
            driver_id: Some(driver_id),
            include_archived: false,
        }
    }

    pub fn matches(&self, incident: &SafetyIncident) -> bool {
        if !self.include_archived && !incident.active.is_active() {
            return false;
        }
        match self.driver_id {
            Some(driver_id) => incident.driver.id == driver_id,
            None => true,
        }
    }
}
