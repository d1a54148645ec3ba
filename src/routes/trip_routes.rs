use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};

use crate::controllers::trip_controller::TripController;
use crate::dto::trip_dto::{
    AddExpenseRequest, CancelTripRequest, CompleteTripRequest, CreateTripRequest, TripListQuery,
    UpdateTripRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::Actor;
use crate::models::trip::{Expense, Trip};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{JsonBody, ValidatedJson};
use crate::utils::validation::parse_uuid;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip).get(list_trips))
        .route("/:id", get(get_trip).patch(update_trip))
        .route("/dispatch/:id", patch(dispatch_trip))
        .route("/start/:id", patch(start_trip))
        .route("/complete/:id", patch(complete_trip))
        .route("/cancel/:id", patch(cancel_trip))
        .route("/:id/expenses", post(add_expense).get(list_trip_expenses))
        .route("/:id/expenses/:expense_id", delete(delete_expense))
}

async fn create_trip(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    ValidatedJson(request): ValidatedJson<CreateTripRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Trip>>), AppError> {
    let controller = TripController::new(state.store.clone());
    let response = controller.create(actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripListQuery>,
) -> Result<Json<ApiResponse<Vec<Trip>>>, AppError> {
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.list(query).await?))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_trip(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTripRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.update(actor, id, request).await?))
}

async fn dispatch_trip(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.dispatch(actor, id).await?))
}

async fn start_trip(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.start(actor, id).await?))
}

async fn complete_trip(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<CompleteTripRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.complete(actor, id, request).await?))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<CancelTripRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.cancel(actor, id, request).await?))
}

async fn add_expense(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    let response = controller.add_expense(actor, id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_trip_expenses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Expense>>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.list_expenses(id).await?))
}

async fn delete_expense(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((id, expense_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_uuid(&id, "trip id")?;
    let expense_id = parse_uuid(&expense_id, "expense id")?;
    let controller = TripController::new(state.store.clone());
    Ok(Json(controller.delete_expense(actor, id, expense_id).await?))
}
