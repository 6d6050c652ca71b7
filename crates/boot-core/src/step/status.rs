use serde::{Deserialize, Serialize};

/// Estado observable de un Step.
///
/// Transiciones válidas:
/// - `NotStarted` -> `Pending` -> `Success`
/// - `NotStarted` -> `Pending` -> `Error`
/// - `Error` -> `Pending` (reintento manual del mismo paso)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StepStatus {
    /// Aún no se ha intentado.
    #[default]
    NotStarted,
    /// En ejecución o esperando confirmación.
    Pending,
    /// Finalizó correctamente.
    Success,
    /// Falló; el mensaje se guarda aparte en el estado del orquestador.
    Error,
}

impl StepStatus {
    pub fn is_success(self) -> bool {
        matches!(self, StepStatus::Success)
    }
}
