use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::controllers::meta_controller::MetaController;
use crate::dto::meta_dto::{CreateRegionRequest, CreateVehicleTypeRequest};
use crate::dto::ApiResponse;
use crate::models::reference::{Region, VehicleType};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::ValidatedJson;

pub fn create_meta_router() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicle-types",
            get(list_vehicle_types).post(create_vehicle_type),
        )
        .route("/regions", get(list_regions).post(create_region))
}

async fn list_vehicle_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<VehicleType>>>, AppError> {
    let controller = MetaController::new(state.store.clone());
    Ok(Json(controller.list_vehicle_types().await?))
}

async fn create_vehicle_type(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateVehicleTypeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleType>>), AppError> {
    let controller = MetaController::new(state.store.clone());
    let response = controller.create_vehicle_type(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_regions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Region>>>, AppError> {
    let controller = MetaController::new(state.store.clone());
    Ok(Json(controller.list_regions().await?))
}

async fn create_region(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateRegionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Region>>), AppError> {
    let controller = MetaController::new(state.store.clone());
    let response = controller.create_region(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
