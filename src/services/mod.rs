//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: máquinas de
//! estados, efectos secundarios entre entidades y agregaciones de sólo lectura.

pub mod analytics_service;
pub mod performance_service;
pub mod side_effects;
pub mod status_machine;
