//! FleetFlow: API REST de gestión de flotas
//!
//! Vehículos, conductores, viajes, mantenimiento, gastos e incidentes, con
//! las transiciones de estado y sus efectos secundarios ejecutadas dentro
//! de una unidad de trabajo.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
