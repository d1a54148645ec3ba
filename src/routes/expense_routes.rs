use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::analytics_controller::AnalyticsController;
use crate::dto::analytics_dto::{
    BurnRateQuery, BurnRateResponse, DateRangeQuery, ExpenseListQuery, VehicleCostResponse,
};
use crate::dto::ApiResponse;
use crate::models::analytics::{ExpenseRecord, FuelEfficiencyReport, Page};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_uuid;

pub fn create_expense_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses))
        .route("/summary/monthly", get(monthly_burn_rate))
        .route("/summary/vehicle/:vehicle_id", get(vehicle_costs))
        .route("/fuel-efficiency/:vehicle_id", get(fuel_efficiency))
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ApiResponse<Page<ExpenseRecord>>>, AppError> {
    let controller = AnalyticsController::new(state.store.clone());
    Ok(Json(controller.list_expenses(query).await?))
}

async fn monthly_burn_rate(
    State(state): State<AppState>,
    Query(query): Query<BurnRateQuery>,
) -> Result<Json<ApiResponse<BurnRateResponse>>, AppError> {
    let controller = AnalyticsController::new(state.store.clone());
    Ok(Json(controller.burn_rate(query).await?))
}

async fn vehicle_costs(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<ApiResponse<VehicleCostResponse>>, AppError> {
    let vehicle_id = parse_uuid(&vehicle_id, "vehicle id")?;
    let controller = AnalyticsController::new(state.store.clone());
    Ok(Json(controller.vehicle_costs(vehicle_id, query).await?))
}

async fn fuel_efficiency(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<ApiResponse<FuelEfficiencyReport>>, AppError> {
    let vehicle_id = parse_uuid(&vehicle_id, "vehicle id")?;
    let controller = AnalyticsController::new(state.store.clone());
    Ok(Json(controller.fuel_efficiency(vehicle_id).await?))
}
