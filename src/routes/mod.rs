//! Rutas HTTP
//!
//! Un router por recurso, todos montados bajo `/api`.

pub mod dashboard_routes;
pub mod driver_routes;
pub mod expense_routes;
pub mod incident_routes;
pub mod maintenance_routes;
pub mod meta_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use axum::{extract::State, middleware::from_fn, routing::get, Json, Router};
use serde_json::json;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{actor_middleware, cors_layer};
use crate::state::AppState;

/// Router completo de la aplicación con sus capas
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/trips", trip_routes::create_trip_router())
        .nest("/maintenance", maintenance_routes::create_maintenance_router())
        .nest("/expenses", expense_routes::create_expense_router())
        .nest("/dashboard", dashboard_routes::create_dashboard_router())
        .nest("/incidents", incident_routes::create_incident_router())
        .nest("/meta", meta_routes::create_meta_router());

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(from_fn(actor_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "fleetflow",
        "backend": state.store.backend(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
