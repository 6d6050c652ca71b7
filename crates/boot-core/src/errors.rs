//! Errores del core de arranque.
//!
//! Se separan en tres familias:
//! - `StepError`: fallos producidos dentro de un paso (frontera del paso).
//! - `OrchestratorError`: usos inválidos del orquestador (re-entrada, etc.).
//! - `RegistryError`: catálogos de pasos mal formados.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::StepId;

/// Error devuelto por `StepDefinition::run`.
///
/// Cualquier variante se captura en la frontera del paso y se guarda como
/// mensaje del paso; nunca escala más allá del orquestador.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StepError {
    /// Requisitos del sistema no satisfechos. Bloquea antes de instalar nada.
    #[error("{0}")]
    Prerequisite(String),
    /// Una operación del instalador falló o devolvió estado de error.
    #[error("{0}")]
    InstallAction(String),
    /// Fallo de red/transporte hacia un colaborador externo.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Clasificación gruesa de un `StepError` según la política de recuperación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Requiere arreglar algo fuera de la aplicación antes de reintentar.
    Prerequisite,
    /// El usuario puede reintentar el mismo paso sin límite.
    Recoverable,
    /// Fallo transitorio que el paso puede degradar en vez de propagar.
    Degraded,
}

/// Clasifica un error de paso.
pub fn classify(err: &StepError) -> ErrorClass {
    match err {
        StepError::Prerequisite(_) => ErrorClass::Prerequisite,
        StepError::Transport(_) => ErrorClass::Degraded,
        StepError::InstallAction(_) | StepError::Internal(_) => ErrorClass::Recoverable,
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum OrchestratorError {
    #[error("a step is already in flight")]
    Busy,
    #[error("user has not initiated the bootstrap")]
    NotInitiated,
    #[error("bootstrap already completed")]
    Completed,
    #[error("orchestrator has been torn down")]
    TornDown,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegistryError {
    #[error("registry needs at least one step")]
    Empty,
    #[error("step {0} registered twice")]
    Duplicate(StepId),
    #[error("step {0} registered out of order")]
    OutOfOrder(StepId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prerequisite_message_is_verbatim() {
        let err = StepError::Prerequisite("At least 8GB of RAM required".into());
        assert_eq!(err.to_string(), "At least 8GB of RAM required");
        assert_eq!(classify(&err), ErrorClass::Prerequisite);
    }

    #[test]
    fn transport_errors_are_degraded() {
        let err = StepError::Transport("connection refused".into());
        assert_eq!(classify(&err), ErrorClass::Degraded);
        assert_eq!(classify(&StepError::InstallAction("x".into())), ErrorClass::Recoverable);
    }

    #[test]
    fn registry_error_names_the_step() {
        let err = RegistryError::Duplicate(StepId::Version);
        assert_eq!(err.to_string(), "step version registered twice");
    }
}
