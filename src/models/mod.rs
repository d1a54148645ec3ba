//! Modelos del sistema
//!
//! Entidades de la flota, snapshots embebidos y modelos de salida de
//! analytics.

pub mod analytics;
pub mod common;
pub mod driver;
pub mod maintenance;
pub mod reference;
pub mod safety_incident;
pub mod snapshot;
pub mod trip;
pub mod vehicle;
