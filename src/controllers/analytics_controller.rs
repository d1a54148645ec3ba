//! Dashboard, costes y gastos
//!
//! Sólo lectura: cada operación carga los registros en una unidad de trabajo
//! que nunca se confirma y delega el cálculo en `analytics_service`.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::analytics_dto::{
    BurnRateQuery, BurnRateResponse, DashboardQuery, DateRangeQuery, ExpenseListQuery,
    VehicleCostResponse,
};
use crate::dto::common_dto::{parse_pagination, ApiResponse};
use crate::models::analytics::{DashboardSummary, ExpenseRecord, FuelEfficiencyReport, Page};
use crate::models::maintenance::MaintenanceFilter;
use crate::models::snapshot::VehicleSnapshot;
use crate::models::trip::TripFilter;
use crate::models::vehicle::VehicleFilter;
use crate::repositories::FleetStore;
use crate::services::analytics_service::{
    dashboard_summary, fuel_efficiency, list_expenses, monthly_burn_rate, operational_cost,
    parse_months, DashboardFilters, DateRange, ExpenseFilter,
};
use crate::utils::errors::{not_found_error, AppResult};

use super::parse_optional_uuid;

pub struct AnalyticsController {
    store: Arc<dyn FleetStore>,
}

impl AnalyticsController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self, query: DashboardQuery) -> AppResult<ApiResponse<DashboardSummary>> {
        let filters = DashboardFilters::parse(
            query.region_id.as_deref(),
            query.vehicle_type_id.as_deref(),
            query.status.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;

        let mut tx = self.store.begin().await?;
        let vehicles = tx.vehicles(&VehicleFilter::default()).await?;
        let trips = tx.trips(&TripFilter::default()).await?;

        let summary = dashboard_summary(&vehicles, &trips, &filters, Utc::now());
        tracing::debug!(
            "📊 Dashboard: {} vehículos, {} viajes",
            vehicles.len(),
            trips.len()
        );
        Ok(ApiResponse::success_with_message(summary, "Dashboard data retrieved successfully"))
    }

    pub async fn list_expenses(
        &self,
        query: ExpenseListQuery,
    ) -> AppResult<ApiResponse<Page<ExpenseRecord>>> {
        let (page, limit) = parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
        let filter = ExpenseFilter::parse(
            query.vehicle_id.as_deref(),
            query.expense_type.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;

        let mut tx = self.store.begin().await?;
        let trips = tx
            .trips(&TripFilter {
                vehicle_id: filter.vehicle_id,
                ..Default::default()
            })
            .await?;
        Ok(ApiResponse::success_with_message(
            list_expenses(&trips, &filter, page, limit),
            "Expenses retrieved successfully",
        ))
    }

    pub async fn burn_rate(&self, query: BurnRateQuery) -> AppResult<ApiResponse<BurnRateResponse>> {
        let vehicle_id = parse_optional_uuid(query.vehicle_id.as_deref(), "vehicle_id")?;
        let months = parse_months(query.months.as_deref())?;

        let mut tx = self.store.begin().await?;
        let trips = tx
            .trips(&TripFilter {
                vehicle_id,
                ..Default::default()
            })
            .await?;
        let logs = tx
            .maintenance_logs(&MaintenanceFilter {
                vehicle_id,
                ..Default::default()
            })
            .await?;

        let burn_rate = monthly_burn_rate(&trips, &logs, vehicle_id, months, Utc::now());
        Ok(ApiResponse::success_with_message(
            BurnRateResponse { burn_rate, months },
            "Monthly burn rate retrieved successfully",
        ))
    }

    /// Coste operativo de un vehículo; los archivados también se informan
    pub async fn vehicle_costs(
        &self,
        vehicle_id: Uuid,
        query: DateRangeQuery,
    ) -> AppResult<ApiResponse<VehicleCostResponse>> {
        let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;

        let mut tx = self.store.begin().await?;
        let vehicle = tx
            .read_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        let trips = tx
            .trips(&TripFilter {
                vehicle_id: Some(vehicle_id),
                ..Default::default()
            })
            .await?;
        let logs = tx
            .maintenance_logs(&MaintenanceFilter {
                vehicle_id: Some(vehicle_id),
                ..Default::default()
            })
            .await?;

        let costs = operational_cost(vehicle_id, &trips, &logs, &range);
        Ok(ApiResponse::success_with_message(
            VehicleCostResponse {
                vehicle: VehicleSnapshot::from(&vehicle),
                current_odometer: vehicle.current_odometer,
                costs,
            },
            "Vehicle operational cost retrieved successfully",
        ))
    }

    pub async fn fuel_efficiency(
        &self,
        vehicle_id: Uuid,
    ) -> AppResult<ApiResponse<FuelEfficiencyReport>> {
        let mut tx = self.store.begin().await?;
        if tx.read_vehicle(vehicle_id).await?.is_none() {
            return Err(not_found_error("Vehicle"));
        }
        let trips = tx
            .trips(&TripFilter {
                vehicle_id: Some(vehicle_id),
                ..Default::default()
            })
            .await?;
        Ok(ApiResponse::success_with_message(
            fuel_efficiency(vehicle_id, &trips),
            "Fuel efficiency retrieved successfully",
        ))
    }
}
