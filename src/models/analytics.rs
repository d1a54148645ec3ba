//! Modelos de Analytics
//!
//! Este módulo contiene los modelos de salida del dashboard, los informes
//! de costes y el rendimiento de conductores. Todo es de sólo lectura.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::snapshot::{DriverSnapshot, VehicleSnapshot};
use super::trip::{Expense, ExpenseType};
use super::vehicle::VehicleStatus;

/// Resumen para dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub kpis: FleetKpis,
    pub charts: DashboardCharts,
    pub meta: DashboardMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetKpis {
    pub active_fleet: usize,
    pub maintenance_alerts: usize,
    pub pending_cargo: usize,
    pub utilization_rate: f64,
    pub total_active_vehicles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub fleet_status_breakdown: Vec<StatusCount>,
    pub weekly_trip_volume: Vec<DailyTripCount>,
    pub fuel_spend_trend: Vec<MonthlyAmount>,
    pub top_vehicles_by_distance: Vec<VehicleDistance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: VehicleStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTripCount {
    /// `YYYY-MM-DD`
    pub date: String,
    pub trips: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAmount {
    /// `YYYY-MM`
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDistance {
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub name: String,
    pub total_distance: f64,
    pub trip_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub generated_at: DateTime<Utc>,
    pub filters: AppliedFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Eco de los filtros aplicados
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub region_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    pub status: Option<Vec<VehicleStatus>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Coste operativo de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalCost {
    pub vehicle_id: Uuid,
    pub fuel_cost: f64,
    pub fuel_liters: f64,
    pub other_expenses: f64,
    pub maintenance_cost: f64,
    pub maintenance_services: usize,
    pub total_operational_cost: f64,
    pub total_distance_km: f64,
    pub completed_trips: usize,
    pub cost_per_km: Option<f64>,
    pub fuel_efficiency_km_per_liter: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub expense_type: ExpenseType,
    pub amount: f64,
}

/// Gasto mensual: gastos de viaje + mantenimiento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRateMonth {
    pub month: String,
    pub trip_expenses: f64,
    pub maintenance: f64,
    pub total: f64,
    pub breakdown: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEfficiencyPoint {
    pub expense_id: Uuid,
    pub trip_reference: String,
    pub date: DateTime<Utc>,
    pub odometer_reading: f64,
    pub quantity: f64,
    pub amount: f64,
    pub efficiency_km_per_liter: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEfficiencyReport {
    pub vehicle_id: Uuid,
    pub points: Vec<FuelEfficiencyPoint>,
    pub average_km_per_liter: Option<f64>,
}

/// Gasto de un viaje en el listado global de gastos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub trip_id: Uuid,
    pub trip_reference: String,
    pub vehicle: VehicleSnapshot,
    #[serde(flatten)]
    pub expense: Expense,
}

/// Página de resultados
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    /// Corta una colección ya ordenada; `page` empieza en 1
    pub fn from_sorted(items: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, 200);
        let total = items.len();
        let items = items.into_iter().skip((page - 1) * limit).take(limit).collect();
        Self {
            items,
            total,
            page,
            limit,
        }
    }
}

/// Banda de color de la puntuación de seguridad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripStats {
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub completion_rate: f64,
    pub on_time: usize,
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentCounts {
    pub accident: usize,
    pub violation: usize,
    pub near_miss: usize,
    pub complaint: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyStats {
    pub score: f64,
    pub color: ScoreBand,
    pub incidents: IncidentCounts,
}

/// Informe de rendimiento de un conductor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverPerformance {
    pub driver: DriverSnapshot,
    pub trips: TripStats,
    pub safety: SafetyStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slices_and_reports_total() {
        let page = Page::from_sorted((1..=25).collect::<Vec<_>>(), 2, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());

        let last = Page::from_sorted((1..=25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(last.items.len(), 5);
    }

    #[test]
    fn test_kpis_serialize_camel_case() {
        let kpis = FleetKpis {
            active_fleet: 1,
            maintenance_alerts: 0,
            pending_cargo: 2,
            utilization_rate: 50.0,
            total_active_vehicles: 2,
        };
        let json = serde_json::to_value(&kpis).unwrap();
        assert_eq!(json["activeFleet"], 1);
        assert_eq!(json["utilizationRate"], 50.0);
    }
}
