//! Modelo de Driver
//!
//! Conductores, sus registros de formación y la vista enriquecida con el
//! estado de cumplimiento de la licencia.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::common::{Audit, Lifecycle};
use super::reference::LicenseCategory;
use super::snapshot::RegionSnapshot;

/// Días de antelación para avisar de una licencia a punto de caducar
pub const LICENSE_WARNING_DAYS: i64 = 30;

/// Estado del conductor - mapea al ENUM driver_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    OnDuty,
    OffDuty,
    OnTrip,
    Suspended,
}

impl DriverStatus {
    pub const ALL: [DriverStatus; 4] = [Self::OnDuty, Self::OffDuty, Self::OnTrip, Self::Suspended];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDuty => "on_duty",
            Self::OffDuty => "off_duty",
            Self::OnTrip => "on_trip",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid driver status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingType {
    Safety,
    DefensiveDriving,
    Hazmat,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: Uuid,
    pub training_type: TrainingType,
    pub completion_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub certificate_number: String,
    pub active: Lifecycle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

/// Métricas cacheadas; se recalculan bajo demanda en el informe de rendimiento
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverMetrics {
    pub safety_score: f64,
    pub trip_completion_rate: f64,
}

impl Default for DriverMetrics {
    fn default() -> Self {
        Self {
            safety_score: 100.0,
            trip_completion_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expiry: NaiveDate,
    pub date_of_joining: NaiveDate,
    pub status: DriverStatus,
    pub region: Option<RegionSnapshot>,
    pub medical_cert_expiry: Option<NaiveDate>,
    pub contact: Contact,
    pub metrics: DriverMetrics,
    pub training_records: Vec<TrainingRecord>,
    pub active: Lifecycle,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Driver {
    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    pub fn license_expired(&self, today: NaiveDate) -> bool {
        self.license_expiry < today
    }

    pub fn license_days_remaining(&self, today: NaiveDate) -> i64 {
        (self.license_expiry - today).num_days()
    }

    /// Motivo por el que el conductor no puede asignarse a un viaje con un
    /// vehículo que exige `required` (o `None` si puede)
    pub fn assignment_blocker(
        &self,
        required: Option<LicenseCategory>,
        today: NaiveDate,
    ) -> Option<String> {
        match self.status {
            DriverStatus::OnTrip => return Some("Driver is already on a trip".to_string()),
            DriverStatus::Suspended => return Some("Driver is suspended".to_string()),
            DriverStatus::OnDuty | DriverStatus::OffDuty => {}
        }
        if self.license_expired(today) {
            return Some("Driver's license has expired".to_string());
        }
        match required {
            Some(category) if category != self.license_category => Some(format!(
                "Driver license category ({}) does not match vehicle requirement ({})",
                self.license_category, category
            )),
            _ => None,
        }
    }
}

/// Estado de cumplimiento calculado para los listados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Valid,
    Blocked,
}

/// Conductor con los campos de cumplimiento calculados
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverView {
    #[serde(flatten)]
    pub driver: Driver,
    pub license_days_remaining: i64,
    pub compliance_status: ComplianceStatus,
    pub license_expiry_warning: bool,
}

impl DriverView {
    pub fn new(driver: Driver, today: NaiveDate) -> Self {
        let days = driver.license_days_remaining(today);
        let blocked = days < 0 || driver.status == DriverStatus::Suspended;
        Self {
            license_days_remaining: days,
            compliance_status: if blocked {
                ComplianceStatus::Blocked
            } else {
                ComplianceStatus::Valid
            },
            license_expiry_warning: (0..=LICENSE_WARNING_DAYS).contains(&days),
            driver,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceFilter {
    Expired,
    Valid,
}

impl FromStr for ComplianceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "expired" => Ok(Self::Expired),
            "valid" => Ok(Self::Valid),
            other => Err(format!("Invalid compliance filter: {}", other)),
        }
    }
}

/// Filtro de listado de conductores
#[derive(Debug, Clone, Default)]
pub struct DriverFilter {
    pub statuses: Option<Vec<DriverStatus>>,
    pub region_id: Option<Uuid>,
    pub license_category: Option<LicenseCategory>,
    pub compliance: Option<ComplianceFilter>,
    pub expiring_within_days: Option<i64>,
    pub include_archived: bool,
}

impl DriverFilter {
    pub fn matches(&self, driver: &Driver, today: NaiveDate) -> bool {
        if !self.include_archived && !driver.is_active() {
            return false;
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&driver.status) {
                return false;
            }
        }
        if let Some(region_id) = self.region_id {
            if driver.region.as_ref().map(|r| r.id) != Some(region_id) {
                return false;
            }
        }
        if let Some(category) = self.license_category {
            if driver.license_category != category {
                return false;
            }
        }
        match self.compliance {
            Some(ComplianceFilter::Expired) if !driver.license_expired(today) => return false,
            Some(ComplianceFilter::Valid) if driver.license_expired(today) => return false,
            _ => {}
        }
        if let Some(days) = self.expiring_within_days {
            let remaining = driver.license_days_remaining(today);
            if remaining < 0 || remaining > days {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_driver(category: LicenseCategory, status: DriverStatus) -> Driver {
        let today = Utc::now().date_naive();
        Driver {
            id: Uuid::new_v4(),
            name: "Alex Rivera".to_string(),
            employee_id: "EMP-001".to_string(),
            license_number: "LIC-123456".to_string(),
            license_category: category,
            license_expiry: today + chrono::Duration::days(365),
            date_of_joining: today - chrono::Duration::days(700),
            status,
            region: None,
            medical_cert_expiry: None,
            contact: Contact::default(),
            metrics: DriverMetrics::default(),
            training_records: Vec::new(),
            active: Lifecycle::Active,
            audit: Audit::new(None, Utc::now()),
        }
    }

    #[test]
    fn test_assignment_blockers() {
        let today = Utc::now().date_naive();
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        assert_eq!(driver.assignment_blocker(Some(LicenseCategory::C), today), None);
        assert_eq!(driver.assignment_blocker(None, today), None);
        assert_eq!(
            driver.assignment_blocker(Some(LicenseCategory::D), today).unwrap(),
            "Driver license category (C) does not match vehicle requirement (D)"
        );

        let mut expired = driver.clone();
        expired.license_expiry = today - chrono::Duration::days(1);
        assert_eq!(
            expired.assignment_blocker(None, today).unwrap(),
            "Driver's license has expired"
        );

        let suspended = sample_driver(LicenseCategory::C, DriverStatus::Suspended);
        assert_eq!(suspended.assignment_blocker(None, today).unwrap(), "Driver is suspended");
    }

    #[test]
    fn test_view_flags_expiring_license() {
        let today = Utc::now().date_naive();
        let mut driver = sample_driver(LicenseCategory::B, DriverStatus::OffDuty);
        driver.license_expiry = today + chrono::Duration::days(10);
        let view = DriverView::new(driver, today);
        assert_eq!(view.license_days_remaining, 10);
        assert!(view.license_expiry_warning);
        assert_eq!(view.compliance_status, ComplianceStatus::Valid);
    }

    #[test]
    fn test_view_blocks_expired_license() {
        let today = Utc::now().date_naive();
        let mut driver = sample_driver(LicenseCategory::B, DriverStatus::OnDuty);
        driver.license_expiry = today - chrono::Duration::days(3);
        let view = DriverView::new(driver, today);
        assert_eq!(view.compliance_status, ComplianceStatus::Blocked);
        assert!(!view.license_expiry_warning);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["compliance_status"], "blocked");
        assert_eq!(json["employee_id"], "EMP-001");
    }

    #[test]
    fn test_filter_by_compliance_and_expiry_window() {
        let today = Utc::now().date_naive();
        let mut driver = sample_driver(LicenseCategory::B, DriverStatus::OnDuty);
        driver.license_expiry = today + chrono::Duration::days(20);

        let expiring = DriverFilter {
            expiring_within_days: Some(30),
            ..Default::default()
        };
        assert!(expiring.matches(&driver, today));

        let expired_only = DriverFilter {
            compliance: Some(ComplianceFilter::Expired),
            ..Default::default()
        };
        assert!(!expired_only.matches(&driver, today));
    }
}
