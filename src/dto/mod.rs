//! DTOs de la API
//!
//! Un struct de entrada tipado por operación. Las queries llegan como texto
//! y se validan en el controlador para devolver errores con el formato de la API.

pub mod analytics_dto;
pub mod common_dto;
pub mod driver_dto;
pub mod incident_dto;
pub mod maintenance_dto;
pub mod meta_dto;
pub mod trip_dto;
pub mod vehicle_dto;

pub use common_dto::ApiResponse;
