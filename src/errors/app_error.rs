use boot_adapters::AdapterError;
use boot_core::{OrchestratorError, RegistryError};
use thiserror::Error;

/// Errores del binario: cableado, configuración y sesión.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error en adapter: {0}")]
    Adapter(#[from] AdapterError),
    #[error("Registro inválido: {0}")]
    Registry(#[from] RegistryError),
    #[error("Orquestador: {0}")]
    Orchestrator(#[from] OrchestratorError),
    /// El paso activo quedó en error; el usuario puede volver a lanzar.
    #[error("Paso {step} fallido: {message}")]
    StepFailed { step: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_variant_format() {
        let err = AppError::Config("puerto inválido".into());
        assert_eq!(err.to_string(), "Error de configuración: puerto inválido");
    }

    #[test]
    fn test_step_failed_format() {
        let err = AppError::StepFailed { step: "environment".into(),
                                         message: "Step was not successful".into() };
        assert_eq!(err.to_string(), "Paso environment fallido: Step was not successful");
    }

    #[test]
    fn test_orchestrator_variant_from() {
        let err: AppError = OrchestratorError::Busy.into();
        assert!(matches!(err, AppError::Orchestrator(OrchestratorError::Busy)));
    }
}
