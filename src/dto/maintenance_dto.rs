use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::maintenance::{MaintenanceLog, MaintenanceStatus, Part, ServiceType};
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::validation::{non_negative_amount, non_negative_f64};

// Pieza tal como llega en el body
#[derive(Debug, Clone, Deserialize)]
pub struct PartInput {
    pub part_name: String,
    pub quantity: u32,
    pub unit_cost: Decimal,
}

/// Convierte las piezas recibidas; `total_cost` se recalcula al guardar
pub fn build_parts(inputs: Vec<PartInput>, now: DateTime<Utc>) -> AppResult<Vec<Part>> {
    inputs
        .into_iter()
        .map(|input| {
            let part_name = input.part_name.trim().to_string();
            if part_name.is_empty() {
                return Err(bad_request_error("Part name is required"));
            }
            if input.quantity < 1 {
                return Err(bad_request_error("Part quantity must be at least 1"));
            }
            if input.unit_cost < Decimal::ZERO {
                return Err(bad_request_error("Part unit cost cannot be negative"));
            }
            Ok(Part {
                id: Uuid::new_v4(),
                part_name,
                quantity: input.quantity,
                unit_cost: input.unit_cost,
                total_cost: input.unit_cost * Decimal::from(input.quantity),
                created_at: now,
            })
        })
        .collect()
}

// Request para crear una orden de mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub vehicle_id: Uuid,
    pub service_type: ServiceType,
    pub description: Option<String>,
    /// Fecha (`YYYY-MM-DD`) o datetime RFC 3339
    pub scheduled_date: String,
    #[validate(custom = "non_negative_f64")]
    pub odometer_at_service: Option<f64>,
    #[validate(custom = "non_negative_amount")]
    pub cost: Option<Decimal>,
    pub service_provider: Option<String>,
    pub status: Option<MaintenanceStatus>,
    #[validate(custom = "non_negative_f64")]
    pub next_service_due_km: Option<f64>,
    #[serde(default)]
    pub parts: Vec<PartInput>,
}

// Request de actualización; el cambio de `status` dispara los efectos
// secundarios sobre el vehículo
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateMaintenanceRequest {
    pub status: Option<MaintenanceStatus>,
    pub service_type: Option<ServiceType>,
    pub description: Option<String>,
    pub scheduled_date: Option<String>,
    #[validate(custom = "non_negative_f64")]
    pub odometer_at_service: Option<f64>,
    #[validate(custom = "non_negative_amount")]
    pub cost: Option<Decimal>,
    pub service_provider: Option<String>,
    #[validate(custom = "non_negative_f64")]
    pub next_service_due_km: Option<f64>,
    pub parts: Option<Vec<PartInput>>,
}

// Query del listado
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceListQuery {
    pub vehicle_id: Option<String>,
    pub status: Option<String>,
    pub upcoming: Option<String>,
    pub overdue: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

// Orden guardada más los viajes cancelados en cascada
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub log: MaintenanceLog,
    #[serde(rename = "tripsAutoCancel")]
    pub trips_auto_cancel: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, quantity: u32, unit_cost: i64) -> PartInput {
        PartInput {
            part_name: name.to_string(),
            quantity,
            unit_cost: Decimal::new(unit_cost, 0),
        }
    }

    #[test]
    fn test_build_parts_computes_totals() {
        let parts = build_parts(vec![input("Oil filter", 2, 15)], Utc::now()).unwrap();
        assert_eq!(parts[0].total_cost, Decimal::new(30, 0));
    }

    #[test]
    fn test_build_parts_rejects_bad_rows() {
        assert!(build_parts(vec![input("  ", 1, 5)], Utc::now()).is_err());
        assert!(build_parts(vec![input("Pad", 0, 5)], Utc::now()).is_err());
        assert!(build_parts(vec![input("Pad", 1, -5)], Utc::now()).is_err());
    }
}
