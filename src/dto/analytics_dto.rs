use serde::{Deserialize, Serialize};

use crate::models::analytics::{BurnRateMonth, OperationalCost};
use crate::models::snapshot::VehicleSnapshot;

// Query del dashboard
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub region_id: Option<String>,
    pub vehicle_type_id: Option<String>,
    /// Lista separada por comas
    pub status: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

// Query del listado global de gastos
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    pub vehicle_id: Option<String>,
    pub expense_type: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BurnRateQuery {
    pub vehicle_id: Option<String>,
    pub months: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BurnRateResponse {
    #[serde(rename = "burnRate")]
    pub burn_rate: Vec<BurnRateMonth>,
    pub months: u32,
}

// Coste operativo junto a los datos actuales del vehículo
#[derive(Debug, Serialize)]
pub struct VehicleCostResponse {
    pub vehicle: VehicleSnapshot,
    pub current_odometer: f64,
    pub costs: OperationalCost,
}
