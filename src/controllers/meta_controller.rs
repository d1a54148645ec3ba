//! Datos de referencia: tipos de vehículo y regiones

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::common_dto::ApiResponse;
use crate::dto::meta_dto::{CreateRegionRequest, CreateVehicleTypeRequest};
use crate::models::common::Lifecycle;
use crate::models::reference::{Region, VehicleType};
use crate::repositories::FleetStore;
use crate::utils::errors::AppResult;
use crate::utils::validation::normalize_code;

pub struct MetaController {
    store: Arc<dyn FleetStore>,
}

impl MetaController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn list_vehicle_types(&self) -> AppResult<ApiResponse<Vec<VehicleType>>> {
        let mut tx = self.store.begin().await?;
        let types = tx.vehicle_types().await?;
        Ok(ApiResponse::success_with_message(types, "Vehicle types retrieved successfully"))
    }

    pub async fn create_vehicle_type(
        &self,
        request: CreateVehicleTypeRequest,
    ) -> AppResult<ApiResponse<VehicleType>> {
        let now = Utc::now();
        let vehicle_type = VehicleType {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            default_max_load: request.default_max_load,
            required_license_category: request.required_license_category,
            active: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_vehicle_type(&vehicle_type).await?;
        tx.commit().await?;

        tracing::info!("🏷️ Tipo de vehículo '{}' creado", vehicle_type.name);
        Ok(ApiResponse::success_with_message(vehicle_type, "Vehicle type created successfully"))
    }

    pub async fn list_regions(&self) -> AppResult<ApiResponse<Vec<Region>>> {
        let mut tx = self.store.begin().await?;
        let regions = tx.regions().await?;
        Ok(ApiResponse::success_with_message(regions, "Regions retrieved successfully"))
    }

    pub async fn create_region(&self, request: CreateRegionRequest) -> AppResult<ApiResponse<Region>> {
        let now = Utc::now();
        let region = Region {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            code: normalize_code(&request.code),
            active: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_region(&region).await?;
        tx.commit().await?;

        tracing::info!("🗺️ Región {} ({}) creada", region.name, region.code);
        Ok(ApiResponse::success_with_message(region, "Region created successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::LicenseCategory;
    use crate::repositories::MemoryFleetStore;
    use crate::utils::errors::AppError;

    #[tokio::test]
    async fn test_regions_are_unique_and_sorted() {
        let controller = MetaController::new(Arc::new(MemoryFleetStore::new()));
        let region = |name: &str, code: &str| CreateRegionRequest {
            name: name.to_string(),
            code: code.to_string(),
        };

        let north = controller.create_region(region("North", "nth")).await.unwrap().data.unwrap();
        assert_eq!(north.code, "NTH");
        controller.create_region(region("East", "est")).await.unwrap();

        let err = controller.create_region(region("Other", "NTH")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let names: Vec<String> = controller
            .list_regions()
            .await
            .unwrap()
            .data
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["East", "North"]);
    }

    #[tokio::test]
    async fn test_duplicate_vehicle_type_name() {
        let controller = MetaController::new(Arc::new(MemoryFleetStore::new()));
        let request = || CreateVehicleTypeRequest {
            name: "Van".to_string(),
            default_max_load: 1200.0,
            required_license_category: LicenseCategory::B,
        };
        controller.create_vehicle_type(request()).await.unwrap();
        assert!(matches!(
            controller.create_vehicle_type(request()).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(controller.list_vehicle_types().await.unwrap().data.unwrap().len(), 1);
    }
}
