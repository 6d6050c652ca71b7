//! Errores de los adapters.
//! Mapea fallos de red, de procesos y de serialización a variantes
//! semánticas; en la frontera del paso se convierten a `StepError`.

use boot_core::StepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0} is not configured")]
    NotConfigured(String),
    #[error("{op} failed (exit code {code:?}): {message}")]
    CommandFailed { op: String, code: Option<i32>, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<AdapterError> for StepError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Http(e) => StepError::Transport(e.to_string()),
            AdapterError::Payload(e) => StepError::Internal(format!("invalid payload: {e}")),
            other => StepError::InstallAction(other.to_string()),
        }
    }
}
