use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverListQuery, DriverStatusRequest, SuspendDriverRequest,
    SuspensionResponse, TrainingRecordRequest, UpdateDriverRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::Actor;
use crate::models::analytics::{DriverPerformance, Page};
use crate::models::driver::{DriverView, TrainingRecord};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{JsonBody, ValidatedJson};
use crate::utils::validation::parse_uuid;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver).get(list_drivers))
        .route(
            "/:id",
            get(get_driver).patch(update_driver).delete(delete_driver),
        )
        .route("/:id/status", patch(update_driver_status))
        .route("/:id/suspend", patch(suspend_driver))
        .route("/:id/performance", get(driver_performance))
        .route("/:id/training", post(add_training_record))
}

async fn create_driver(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    ValidatedJson(request): ValidatedJson<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DriverView>>), AppError> {
    let controller = DriverController::new(state.store.clone());
    let response = controller.create(actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<DriverListQuery>,
) -> Result<Json<ApiResponse<Page<DriverView>>>, AppError> {
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.list(query).await?))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DriverView>>, AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_driver(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverView>>, AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.update(actor, id, request).await?))
}

async fn delete_driver(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.delete(actor, id).await?))
}

async fn update_driver_status(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<DriverStatusRequest>,
) -> Result<Json<ApiResponse<DriverView>>, AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.update_status(actor, id, request).await?))
}

async fn suspend_driver(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<SuspendDriverRequest>,
) -> Result<Json<ApiResponse<SuspensionResponse>>, AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.suspend(actor, id, request).await?))
}

async fn driver_performance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DriverPerformance>>, AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    Ok(Json(controller.performance(id).await?))
}

async fn add_training_record(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<TrainingRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TrainingRecord>>>), AppError> {
    let id = parse_uuid(&id, "driver id")?;
    let controller = DriverController::new(state.store.clone());
    let response = controller.add_training(actor, id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
