//! Tipos compartidos por todas las entidades
//!
//! Ciclo de vida (activo/archivado) y campos de auditoría.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ciclo de vida de una entidad. Se persiste como el booleano `active`;
/// archivar nunca borra el registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Lifecycle {
    Active,
    Archived,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        matches!(self, Lifecycle::Active)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Active
    }
}

impl From<bool> for Lifecycle {
    fn from(active: bool) -> Self {
        if active {
            Lifecycle::Active
        } else {
            Lifecycle::Archived
        }
    }
}

impl From<Lifecycle> for bool {
    fn from(lifecycle: Lifecycle) -> Self {
        lifecycle.is_active()
    }
}

/// Campos de auditoría: quién y cuándo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    pub fn new(actor: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            created_by: actor,
            updated_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Registrar una modificación
    pub fn touch(&mut self, actor: Option<Uuid>, now: DateTime<Utc>) {
        self.updated_by = actor;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_serializes_as_active_flag() {
        assert_eq!(serde_json::to_value(Lifecycle::Active).unwrap(), serde_json::json!(true));
        assert_eq!(serde_json::to_value(Lifecycle::Archived).unwrap(), serde_json::json!(false));
        let parsed: Lifecycle = serde_json::from_value(serde_json::json!(false)).unwrap();
        assert_eq!(parsed, Lifecycle::Archived);
    }

    #[test]
    fn test_audit_touch_keeps_creator() {
        let creator = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let t0 = Utc::now();
        let mut audit = Audit::new(Some(creator), t0);
        audit.touch(Some(editor), t0 + chrono::Duration::seconds(5));
        assert_eq!(audit.created_by, Some(creator));
        assert_eq!(audit.updated_by, Some(editor));
        assert!(audit.updated_at > audit.created_at);
    }
}
