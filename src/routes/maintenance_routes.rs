use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::maintenance_controller::MaintenanceController;
use crate::dto::maintenance_dto::{
    CreateMaintenanceRequest, MaintenanceListQuery, MaintenanceResponse, UpdateMaintenanceRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::Actor;
use crate::models::analytics::Page;
use crate::models::maintenance::MaintenanceLog;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::ValidatedJson;
use crate::utils::validation::parse_uuid;

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_log).get(list_logs))
        .route("/:id", get(get_log).patch(update_log).delete(delete_log))
}

async fn create_log(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    ValidatedJson(request): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceResponse>>), AppError> {
    let controller = MaintenanceController::new(state.store.clone());
    let response = controller.create(actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceListQuery>,
) -> Result<Json<ApiResponse<Page<MaintenanceLog>>>, AppError> {
    let controller = MaintenanceController::new(state.store.clone());
    Ok(Json(controller.list(query).await?))
}

async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MaintenanceLog>>, AppError> {
    let id = parse_uuid(&id, "maintenance log id")?;
    let controller = MaintenanceController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_log(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    let id = parse_uuid(&id, "maintenance log id")?;
    let controller = MaintenanceController::new(state.store.clone());
    Ok(Json(controller.update(actor, id, request).await?))
}

async fn delete_log(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_uuid(&id, "maintenance log id")?;
    let controller = MaintenanceController::new(state.store.clone());
    Ok(Json(controller.delete(actor, id).await?))
}
