use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_ATTEMPTS};

/// Resultado de ejecutar un paso.
///
/// Los pasos son heterogéneos: unos se resuelven al instante y otros deben
/// esperar a que un proceso externo converja. `Pending` indica cómo se
/// confirmará el paso sin que el orquestador conozca los detalles.
pub enum StepOutcome {
    Success,
    Pending(Confirmation),
    Error { message: String, detail: Option<String> },
}

impl StepOutcome {
    pub fn poll(spec: PollSpec) -> Self {
        StepOutcome::Pending(Confirmation::Poll(spec))
    }

    pub fn watch(spec: WatchSpec) -> Self {
        StepOutcome::Pending(Confirmation::Watch(spec))
    }

    pub fn error(message: impl Into<String>) -> Self {
        StepOutcome::Error { message: message.into(),
                             detail: None }
    }

    pub fn error_with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        StepOutcome::Error { message: message.into(),
                             detail: Some(detail.into()) }
    }
}

impl fmt::Debug for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Success => f.write_str("Success"),
            StepOutcome::Pending(c) => f.debug_tuple("Pending").field(c).finish(),
            StepOutcome::Error { message, detail } => f.debug_struct("Error")
                                                       .field("message", message)
                                                       .field("detail", detail)
                                                       .finish(),
        }
    }
}

/// Estilo de confirmación de un paso pendiente.
pub enum Confirmation {
    /// El propio paso aporta una comprobación que se sondea de forma acotada.
    Poll(PollSpec),
    /// El paso espera a que un watcher independiente publique `true`.
    Watch(WatchSpec),
}

impl fmt::Debug for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confirmation::Poll(p) => f.debug_tuple("Poll").field(p).finish(),
            Confirmation::Watch(w) => f.debug_tuple("Watch").field(w).finish(),
        }
    }
}

/// Comprobación booleana repetible usada por el sondeo.
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    async fn check(&self) -> bool;
}

/// Adaptador closure -> `ReadinessCheck`.
pub struct FnCheck<F>(F);

#[async_trait]
impl<F, Fut> ReadinessCheck for FnCheck<F>
    where F: Fn() -> Fut + Send + Sync,
          Fut: Future<Output = bool> + Send
{
    async fn check(&self) -> bool {
        (self.0)().await
    }
}

/// Construye una `ReadinessCheck` a partir de un closure asíncrono.
pub fn check_fn<F, Fut>(f: F) -> FnCheck<F>
    where F: Fn() -> Fut + Send + Sync,
          Fut: Future<Output = bool> + Send
{
    FnCheck(f)
}

/// Parámetros de un sondeo acotado de intervalo fijo.
pub struct PollSpec {
    pub check: Box<dyn ReadinessCheck>,
    pub interval: Duration,
    pub max_attempts: u32,
    /// Hook opcional del paso al agotarse los intentos.
    pub on_exhausted: Option<Box<dyn FnOnce() + Send>>,
}

impl PollSpec {
    /// Sondeo con el intervalo e intentos por defecto.
    pub fn new(check: impl ReadinessCheck + 'static) -> Self {
        Self { check: Box::new(check),
               interval: DEFAULT_POLL_INTERVAL,
               max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
               on_exhausted: None }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn on_exhausted(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_exhausted = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for PollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollSpec")
         .field("interval", &self.interval)
         .field("max_attempts", &self.max_attempts)
         .field("on_exhausted", &self.on_exhausted.is_some())
         .finish()
    }
}

/// Espera dirigida por eventos: éxito en cuanto `reachable` vale `true`.
#[derive(Debug)]
pub struct WatchSpec {
    pub reachable: watch::Receiver<bool>,
    /// Cota de la espera; al vencer el paso queda en `Error`.
    pub timeout: Duration,
}

impl WatchSpec {
    pub fn new(reachable: watch::Receiver<bool>, timeout: Duration) -> Self {
        Self { reachable, timeout }
    }
}
