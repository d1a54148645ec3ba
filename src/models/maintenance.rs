//! Modelo de MaintenanceLog
//!
//! Órdenes de mantenimiento con sus piezas. El estado previo del vehículo se
//! captura al crear la orden para poder restaurarlo si se cancela.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::common::{Audit, Lifecycle};
use super::snapshot::VehicleSnapshot;
use super::vehicle::VehicleStatus;

/// Horizonte del filtro `upcoming`
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    OilChange,
    TireReplacement,
    BrakeService,
    EngineRepair,
    BodyWork,
    Inspection,
    Other,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OilChange => "oil_change",
            Self::TireReplacement => "tire_replacement",
            Self::BrakeService => "brake_service",
            Self::EngineRepair => "engine_repair",
            Self::BodyWork => "body_work",
            Self::Inspection => "inspection",
            Self::Other => "other",
        }
    }

    /// Nombre legible: `brake_service` -> `brake service`
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// Estado de la orden - mapea al ENUM maintenance_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "maintenance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub const ALL: [MaintenanceStatus; 4] = [
        Self::Scheduled,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Trabajos abiertos: listado por defecto
    pub const OPEN: [MaintenanceStatus; 2] = [Self::Scheduled, Self::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid maintenance status: {}", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceDates {
    pub scheduled: Option<DateTime<Utc>>,
    pub start: Option<DateTime<Utc>>,
    pub completion: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub part_name: String,
    pub quantity: u32,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub vehicle: VehicleSnapshot,
    pub service_type: ServiceType,
    pub description: String,
    pub dates: MaintenanceDates,
    pub odometer_at_service: f64,
    pub cost: Decimal,
    pub service_provider: String,
    pub previous_vehicle_status: VehicleStatus,
    pub status: MaintenanceStatus,
    pub next_service_due_km: Option<f64>,
    pub parts: Vec<Part>,
    pub active: Lifecycle,
    #[serde(flatten)]
    pub audit: Audit,
}

impl MaintenanceLog {
    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    /// `total_cost = quantity * unit_cost` en cada guardado
    pub fn recompute_part_totals(&mut self) {
        for part in &mut self.parts {
            part.total_cost = part.unit_cost * Decimal::from(part.quantity);
        }
    }

    /// Fija las fechas de inicio/finalización al entrar en cada estado
    pub fn stamp_dates(&mut self, now: DateTime<Utc>) {
        match self.status {
            MaintenanceStatus::InProgress if self.dates.start.is_none() => {
                self.dates.start = Some(now);
            }
            MaintenanceStatus::Completed if self.dates.completion.is_none() => {
                self.dates.completion = Some(now);
            }
            _ => {}
        }
    }

    /// Invariantes del documento; se comprueban antes de guardar
    pub fn check(&self) -> Result<(), String> {
        if self.service_type == ServiceType::Other && self.description.trim().is_empty() {
            return Err("Description is required when service type is 'other'".to_string());
        }
        if self.dates.scheduled.is_none() {
            return Err("Scheduled date is required".to_string());
        }
        if let (Some(start), Some(completion)) = (self.dates.start, self.dates.completion) {
            if completion < start {
                return Err("Completion date cannot be before start date".to_string());
            }
        }
        if self.cost < Decimal::ZERO {
            return Err("Cost cannot be negative".to_string());
        }
        if self.status == MaintenanceStatus::Completed && self.cost <= Decimal::ZERO {
            return Err("Cost must be greater than 0 for completed maintenance".to_string());
        }
        if self.odometer_at_service < 0.0 {
            return Err("Odometer at service cannot be negative".to_string());
        }
        if self.parts.iter().any(|p| p.quantity < 1 || p.unit_cost < Decimal::ZERO) {
            return Err("Parts need a quantity of at least 1 and a non-negative unit cost".to_string());
        }
        Ok(())
    }
}

/// Filtro de listado de órdenes
#[derive(Debug, Clone, Default)]
pub struct MaintenanceFilter {
    pub vehicle_id: Option<Uuid>,
    pub statuses: Option<Vec<MaintenanceStatus>>,
    /// Programadas en los próximos días (ver `UPCOMING_WINDOW_DAYS`)
    pub upcoming: bool,
    /// Programadas en el pasado y aún abiertas
    pub overdue: bool,
    pub include_archived: bool,
}

impl MaintenanceFilter {
    pub fn matches(&self, log: &MaintenanceLog, now: DateTime<Utc>) -> bool {
        if !self.include_archived && !log.is_active() {
            return false;
        }
        if let Some(vehicle_id) = self.vehicle_id {
            if log.vehicle.id != vehicle_id {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&log.status) {
                return false;
            }
        }
        let scheduled = log.dates.scheduled;
        if self.upcoming {
            let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
            let in_window = scheduled.map(|s| s >= now && s <= horizon).unwrap_or(false);
            if !in_window || log.status != MaintenanceStatus::Scheduled {
                return false;
            }
        }
        if self.overdue {
            let past = scheduled.map(|s| s < now).unwrap_or(false);
            if !past || log.status != MaintenanceStatus::Scheduled {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_log(vehicle: VehicleSnapshot, status: MaintenanceStatus) -> MaintenanceLog {
        let now = Utc::now();
        MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle,
            service_type: ServiceType::BrakeService,
            description: String::new(),
            dates: MaintenanceDates {
                scheduled: Some(now),
                start: None,
                completion: None,
            },
            odometer_at_service: 0.0,
            cost: Decimal::ZERO,
            service_provider: String::new(),
            previous_vehicle_status: VehicleStatus::Available,
            status,
            next_service_due_km: None,
            parts: Vec::new(),
            active: Lifecycle::Active,
            audit: Audit::new(None, now),
        }
    }

    fn snapshot() -> VehicleSnapshot {
        VehicleSnapshot {
            id: Uuid::new_v4(),
            license_plate: "VAN-0001".to_string(),
            name: "Sprinter".to_string(),
            vehicle_type_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_part_totals_are_recomputed() {
        let mut log = sample_log(snapshot(), MaintenanceStatus::Scheduled);
        log.parts.push(Part {
            id: Uuid::new_v4(),
            part_name: "Brake pad".to_string(),
            quantity: 4,
            unit_cost: Decimal::new(2550, 2),
            total_cost: Decimal::ZERO,
            created_at: Utc::now(),
        });
        log.recompute_part_totals();
        assert_eq!(log.parts[0].total_cost, Decimal::new(10200, 2));
    }

    #[test]
    fn test_completed_requires_positive_cost() {
        let mut log = sample_log(snapshot(), MaintenanceStatus::Completed);
        assert!(log.check().is_err());
        log.cost = Decimal::new(450, 0);
        assert!(log.check().is_ok());
    }

    #[test]
    fn test_other_requires_description() {
        let mut log = sample_log(snapshot(), MaintenanceStatus::Scheduled);
        log.service_type = ServiceType::Other;
        assert!(log.check().is_err());
        log.description = "Replace mirror".to_string();
        assert!(log.check().is_ok());
    }

    #[test]
    fn test_completion_not_before_start() {
        let mut log = sample_log(snapshot(), MaintenanceStatus::InProgress);
        let now = Utc::now();
        log.dates.start = Some(now);
        log.dates.completion = Some(now - Duration::hours(1));
        assert!(log.check().is_err());
    }

    #[test]
    fn test_stamp_dates_only_once() {
        let mut log = sample_log(snapshot(), MaintenanceStatus::InProgress);
        let t0 = Utc::now();
        log.stamp_dates(t0);
        log.stamp_dates(t0 + Duration::hours(2));
        assert_eq!(log.dates.start, Some(t0));
    }

    #[test]
    fn test_label_replaces_underscores() {
        assert_eq!(ServiceType::TireReplacement.label(), "tire replacement");
    }

    #[test]
    fn test_upcoming_and_overdue_filters() {
        let now = Utc::now();
        let mut log = sample_log(snapshot(), MaintenanceStatus::Scheduled);
        log.dates.scheduled = Some(now + Duration::days(3));
        let upcoming = MaintenanceFilter {
            upcoming: true,
            ..Default::default()
        };
        let overdue = MaintenanceFilter {
            overdue: true,
            ..Default::default()
        };
        assert!(upcoming.matches(&log, now));
        assert!(!overdue.matches(&log, now));

        log.dates.scheduled = Some(now - Duration::days(1));
        assert!(!upcoming.matches(&log, now));
        assert!(overdue.matches(&log, now));
    }
}
