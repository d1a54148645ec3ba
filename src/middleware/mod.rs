//! Middleware del sistema
//!
//! Identidad del actor y CORS.

pub mod actor;
pub mod cors;

pub use actor::{actor_middleware, Actor};
pub use cors::cors_layer;
