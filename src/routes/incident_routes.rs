use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, post},
    Extension, Json, Router,
};

use crate::controllers::incident_controller::IncidentController;
use crate::dto::incident_dto::{CreateIncidentRequest, IncidentListQuery};
use crate::dto::ApiResponse;
use crate::middleware::Actor;
use crate::models::safety_incident::SafetyIncident;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::ValidatedJson;
use crate::utils::validation::parse_uuid;

pub fn create_incident_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_incident).get(list_incidents))
        .route("/:id", delete(delete_incident))
}

async fn create_incident(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    ValidatedJson(request): ValidatedJson<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SafetyIncident>>), AppError> {
    let controller = IncidentController::new(state.store.clone());
    let response = controller.create(actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_incidents(
    State(state): State<AppState>,
    Query(query): Query<IncidentListQuery>,
) -> Result<Json<ApiResponse<Vec<SafetyIncident>>>, AppError> {
    let controller = IncidentController::new(state.store.clone());
    Ok(Json(controller.list(query).await?))
}

async fn delete_incident(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_uuid(&id, "incident id")?;
    let controller = IncidentController::new(state.store.clone());
    Ok(Json(controller.delete(actor, id).await?))
}
