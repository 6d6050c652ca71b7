//! Superficie tipada del instalador local.
//!
//! Sustituye al despacho por nombre de canal: cada operación es un método
//! con su forma de retorno. Inyectable en tests con un fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// Respuesta `{ status, message?, data? }` de las operaciones de estado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: ReportStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl StatusReport {
    pub fn success() -> Self {
        Self { status: ReportStatus::Success,
               message: None,
               data: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: ReportStatus::Error,
               message: Some(message.into()),
               data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Success
    }

    /// `data` trae elementos por resolver: cualquier valor salvo ausencia,
    /// `null` o una lista vacía.
    pub fn has_pending_items(&self) -> bool {
        match &self.data {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

#[async_trait]
pub trait InstallerClient: Send + Sync {
    /// `None` si no hay problemas; si no, el motivo legible.
    async fn check_system_requirements(&self) -> Result<Option<String>, AdapterError>;
    async fn check_if_installed_locally(&self) -> Result<bool, AdapterError>;
    async fn check_local_version(&self) -> Result<String, AdapterError>;
    /// Instala o actualiza el backend local.
    async fn install_locally(&self) -> Result<(), AdapterError>;
    async fn check_if_runtime_manager_exists(&self) -> Result<bool, AdapterError>;
    async fn install_runtime_manager(&self) -> Result<(), AdapterError>;
    async fn check_if_environment_exists(&self) -> Result<StatusReport, AdapterError>;
    async fn create_environment(&self) -> Result<(), AdapterError>;
    /// `data` lista las dependencias pendientes cuando `status` es error.
    async fn check_dependencies(&self) -> Result<StatusReport, AdapterError>;
    async fn install_dependencies(&self) -> Result<(), AdapterError>;
    async fn start_local_server(&self) -> Result<StatusReport, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_and_full_reports() {
        let minimal: StatusReport = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert_eq!(minimal, StatusReport::success());

        let full: StatusReport =
            serde_json::from_value(json!({"status": "error", "message": "env missing", "data": ["numpy"]})).unwrap();
        assert!(!full.is_success());
        assert_eq!(full.message.as_deref(), Some("env missing"));
        assert_eq!(full.data, Some(json!(["numpy"])));
    }

    #[test]
    fn pending_items_come_from_data_not_status() {
        assert!(!StatusReport::success().has_pending_items());
        assert!(!StatusReport::success().with_data(json!([])).has_pending_items());
        assert!(!StatusReport::success().with_data(Value::Null).has_pending_items());
        assert!(StatusReport::success().with_data(json!(["scipy"])).has_pending_items());
        assert!(StatusReport::error("missing").with_data(json!(["numpy"])).has_pending_items());
    }
}
