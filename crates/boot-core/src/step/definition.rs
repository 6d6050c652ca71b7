use std::future::Future;

use async_trait::async_trait;

use super::{StepId, StepOutcome};
use crate::errors::StepError;

/// Trait que define un Step del arranque.
///
/// El registro no interpreta la semántica de los pasos; el orquestador sólo
/// llama a `run` y aplica el `StepOutcome` resultante.
#[async_trait]
pub trait StepDefinition: Send + Sync {
    /// Identidad tipada del paso.
    fn id(&self) -> StepId;

    /// Título legible para la UI/CLI.
    fn title(&self) -> &str {
        self.id().as_str()
    }

    /// Ejecuta el paso. Un `Err` equivale a una excepción: el orquestador lo
    /// captura y marca el paso como `Error` con el mensaje.
    async fn run(&self) -> Result<StepOutcome, StepError>;
}

/// Paso construido a partir de un closure asíncrono. Útil para pasos
/// triviales y en tests.
pub struct FnStep<F> {
    id: StepId,
    title: String,
    f: F,
}

impl<F, Fut> FnStep<F>
    where F: Fn() -> Fut + Send + Sync,
          Fut: Future<Output = Result<StepOutcome, StepError>> + Send
{
    pub fn new(id: StepId, f: F) -> Self {
        Self { id,
               title: id.as_str().to_string(),
               f }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[async_trait]
impl<F, Fut> StepDefinition for FnStep<F>
    where F: Fn() -> Fut + Send + Sync,
          Fut: Future<Output = Result<StepOutcome, StepError>> + Send
{
    fn id(&self) -> StepId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        (self.f)().await
    }
}
