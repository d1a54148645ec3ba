use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::analytics_controller::AnalyticsController;
use crate::dto::analytics_dto::DashboardQuery;
use crate::dto::ApiResponse;
use crate::models::analytics::DashboardSummary;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new().route("/summary", get(dashboard_summary))
}

async fn dashboard_summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let controller = AnalyticsController::new(state.store.clone());
    Ok(Json(controller.dashboard(query).await?))
}
