use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleListQuery};
use crate::dto::ApiResponse;
use crate::middleware::Actor;
use crate::models::vehicle::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::ValidatedJson;
use crate::utils::validation::parse_uuid;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route(
            "/:id",
            get(get_vehicle).patch(update_vehicle).delete(delete_vehicle),
        )
        .route("/retire/:id", patch(retire_vehicle))
        .route("/reinstate/:id", patch(reinstate_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.create(actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.list(query).await?))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid(&id, "vehicle id")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid(&id, "vehicle id")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.update(actor, id, request).await?))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid(&id, "vehicle id")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.delete(actor, id).await?))
}

async fn retire_vehicle(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid(&id, "vehicle id")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.retire(actor, id).await?))
}

async fn reinstate_vehicle(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid(&id, "vehicle id")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.reinstate(actor, id).await?))
}
