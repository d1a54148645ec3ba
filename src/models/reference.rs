//! Datos de referencia: tipos de vehículo y regiones

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::common::Lifecycle;

/// Categoría de licencia de conducir - mapea al ENUM license_category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "license_category")]
pub enum LicenseCategory {
    A,
    B,
    C,
    D,
}

impl LicenseCategory {
    pub const ALL: [LicenseCategory; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            other => Err(format!("Invalid license category: {}", other)),
        }
    }
}

/// Tipo de vehículo (camión, furgoneta...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    pub id: Uuid,
    pub name: String,
    pub default_max_load: f64,
    pub required_license_category: LicenseCategory,
    pub active: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Región operativa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub active: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_category_parsing() {
        assert_eq!("c".parse::<LicenseCategory>().unwrap(), LicenseCategory::C);
        assert!("E".parse::<LicenseCategory>().is_err());
        assert_eq!(LicenseCategory::D.to_string(), "D");
    }
}
