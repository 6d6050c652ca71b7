//! Orquestador del arranque local.
//!
//! Recorre el registro invocando un paso cada vez. Un paso se resuelve al
//! instante (`Success`/`Error`) o devuelve `Pending` con la forma de
//! confirmarse: sondeo acotado o espera sobre el watcher de salud. El
//! orquestador aplica el resultado:
//! - éxito: marca `Success`, avanza `active_ordinal` y libera `busy`;
//! - agotamiento o error: marca `Error` con mensaje, libera `busy` y no
//!   avanza.
//!
//! Re-invocar sobre un paso en `Error` lo reintenta desde cero (nuevo ciclo
//! de sondeo, sin contador entre intentos manuales).

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::constants::STEP_NOT_SUCCESSFUL;
use crate::engine::{OrchestratorBuilder, OrchestratorState};
use crate::errors::OrchestratorError;
use crate::event::{BootEvent, BootEventKind, EventStore};
use crate::finalizer::{Connection, ConnectionFinalizer, LocalEndpoint};
use crate::poller::{BoundedRetryPoller, CancelHandle, PollOutcome};
use crate::registry::StepRegistry;
use crate::step::{Confirmation, StepDefinition, StepId, StepOutcome, StepStatus, WatchSpec};

/// Máquina de estados que secuencia los pasos del arranque.
///
/// Soltar el orquestador equivale a `teardown()`: cualquier paso o sondeo
/// en vuelo se aborta y su timer se libera.
pub struct BootstrapOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    registry: StepRegistry,
    endpoint: LocalEndpoint,
    finalizer: ConnectionFinalizer,
    session_id: Uuid,
    shared: Mutex<Shared>,
}

struct Shared {
    state: OrchestratorState,
    events: Box<dyn EventStore>,
    in_flight: Option<CancelHandle>,
}

impl BootstrapOrchestrator {
    #[inline]
    pub fn builder(registry: StepRegistry) -> OrchestratorBuilder {
        OrchestratorBuilder::new(registry)
    }

    pub(crate) fn from_parts(registry: StepRegistry,
                             endpoint: LocalEndpoint,
                             finalizer: ConnectionFinalizer,
                             events: Box<dyn EventStore>)
                             -> Self {
        let state = OrchestratorState::new(registry.len());
        Self { inner: Arc::new(Inner { registry,
                                       endpoint,
                                       finalizer,
                                       session_id: Uuid::new_v4(),
                                       shared: Mutex::new(Shared { state,
                                                                   events,
                                                                   in_flight: None }) }) }
    }

    /// El usuario expresa su intención de conectar; a partir de aquí el
    /// estado es mutable.
    pub fn begin(&self) {
        let mut shared = self.inner.lock();
        if shared.state.user_initiated {
            return;
        }
        shared.state.user_initiated = true;
        let step_count = self.inner.registry.len();
        self.inner.record_locked(&mut shared, BootEventKind::SessionStarted { step_count });
        info!("bootstrap:begin session={} steps={step_count}", self.inner.session_id);
    }

    /// Lanza el paso activo en segundo plano y devuelve un handle esperable.
    ///
    /// La comprobación de `busy` es síncrona: dos llamadas seguidas nunca
    /// dejan dos pasos en vuelo.
    pub fn dispatch(&self) -> Result<StepRun, OrchestratorError> {
        let mut shared = self.inner.lock();
        if shared.state.connection.is_some() {
            return Err(OrchestratorError::Completed);
        }
        if shared.state.torn_down {
            return Err(OrchestratorError::TornDown);
        }
        if !shared.state.user_initiated {
            return Err(OrchestratorError::NotInitiated);
        }
        if shared.state.busy {
            return Err(OrchestratorError::Busy);
        }
        shared.state.busy = true;
        let inner = self.inner.clone();
        let worker = tokio::spawn(inner.clone().drive());
        // Cancelar aborta sólo al worker; el supervisor ve el JoinError y
        // resuelve el StepRun como desmontado.
        shared.in_flight = Some(CancelHandle::from_abort(worker.abort_handle()));
        let task = tokio::spawn(async move {
            match worker.await {
                Ok(status) => status,
                Err(e) if e.is_panic() => inner.recover_panic(panic_message(e.into_panic())),
                Err(_) => None,
            }
        });
        Ok(StepRun { task })
    }

    /// Ejecuta el paso activo y espera su resultado.
    pub async fn run_active_step(&self) -> Result<StepStatus, OrchestratorError> {
        self.dispatch()?.await
    }

    /// Ejecuta pasos mientras tengan éxito. Devuelve el último estado: `Success`
    /// si se alcanzó la conexión, `Error` si un paso quedó bloqueado.
    pub async fn run_until_blocked(&self) -> Result<StepStatus, OrchestratorError> {
        loop {
            let status = self.run_active_step().await?;
            if status != StepStatus::Success || self.connection().is_some() {
                return Ok(status);
            }
        }
    }

    /// Aborta cualquier paso/sondeo en vuelo y deja el orquestador inerte.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    pub fn current_ordinal(&self) -> usize {
        self.inner.lock().state.active_ordinal
    }

    pub fn status_of(&self, ordinal: usize) -> StepStatus {
        self.inner.lock().state.status_of(ordinal)
    }

    pub fn error_of(&self, ordinal: usize) -> Option<String> {
        self.inner.lock().state.error_messages.get(&ordinal).cloned()
    }

    /// Estado por id de paso; `None` si el paso no está registrado.
    pub fn status_by_id(&self, id: StepId) -> Option<StepStatus> {
        self.inner.registry.index_of(id).map(|k| self.status_of(k))
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().state.busy
    }

    pub fn user_initiated(&self) -> bool {
        self.inner.lock().state.user_initiated
    }

    pub fn connection(&self) -> Option<Connection> {
        self.inner.lock().state.connection.clone()
    }

    pub fn snapshot(&self) -> OrchestratorState {
        self.inner.lock().state.clone()
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.inner.registry
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn events(&self) -> Vec<BootEvent> {
        let shared = self.inner.lock();
        shared.events.list(self.inner.session_id)
    }

    /// Secuencia compacta de variantes de evento (ver `BootEventKind::variant`).
    pub fn event_variants(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.kind.variant()).collect()
    }
}

impl Drop for BootstrapOrchestrator {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl std::fmt::Debug for BootstrapOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapOrchestrator")
         .field("session_id", &self.inner.session_id)
         .field("registry", &self.inner.registry)
         .field("state", &self.snapshot())
         .finish()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_locked(&self, shared: &mut Shared, kind: BootEventKind) {
        shared.events.append_kind(self.session_id, kind);
    }

    fn record(&self, kind: BootEventKind) {
        let mut shared = self.lock();
        self.record_locked(&mut shared, kind);
    }

    fn teardown(&self) {
        let mut shared = self.lock();
        if shared.state.torn_down {
            return;
        }
        if let Some(handle) = shared.in_flight.take() {
            handle.cancel();
        }
        shared.state.busy = false;
        shared.state.torn_down = true;
        self.record_locked(&mut shared, BootEventKind::TornDown);
        debug!("bootstrap:teardown session={}", self.session_id);
    }

    /// Cuerpo de un dispatch: ejecuta el paso activo y, si el siguiente es
    /// `Connect`, continúa con él sin esperar al usuario.
    ///
    /// `None` si hubo teardown mientras el paso corría: su resultado se
    /// descarta y el estado queda como lo dejó el teardown.
    async fn drive(self: Arc<Self>) -> Option<StepStatus> {
        loop {
            let ordinal = self.lock().state.active_ordinal;
            let Some(step) = self.registry.get(ordinal).cloned() else {
                self.release();
                return Some(StepStatus::NotStarted);
            };
            let status = self.run_one(ordinal, step.as_ref()).await?;
            if status != StepStatus::Success {
                self.release();
                return Some(status);
            }
            if self.registry.is_terminal(ordinal) {
                return self.finish().then_some(status);
            }
            if self.registry.id_at(ordinal + 1) != Some(StepId::Connect) {
                self.release();
                return Some(status);
            }
            debug!("bootstrap:auto-run connect ordinal={}", ordinal + 1);
        }
    }

    async fn run_one(&self, ordinal: usize, step: &dyn StepDefinition) -> Option<StepStatus> {
        let step_id = step.id();
        {
            let mut shared = self.lock();
            if shared.state.torn_down {
                return None;
            }
            shared.state.mark_pending(ordinal);
            self.record_locked(&mut shared, BootEventKind::StepStarted { ordinal, step_id });
        }
        info!("step:start ordinal={ordinal} id={step_id} title={:?}", step.title());

        let result = match step.run().await {
            Ok(StepOutcome::Success) => Ok(()),
            Ok(StepOutcome::Pending(Confirmation::Poll(spec))) => {
                self.record(BootEventKind::StepPending { ordinal,
                                                         step_id,
                                                         confirmation: "poll".into() });
                let (poller, on_exhausted) = BoundedRetryPoller::from_spec(spec);
                let outcome = poller.run(|attempt, ok| {
                                        self.record(BootEventKind::PollAttempt { ordinal, attempt, ok })
                                    })
                                    .await;
                match outcome {
                    PollOutcome::Succeeded { .. } => Ok(()),
                    PollOutcome::Exhausted { attempts } => {
                        debug!("step:poll-exhausted ordinal={ordinal} attempts={attempts}");
                        if let Some(hook) = on_exhausted {
                            hook();
                        }
                        Err(STEP_NOT_SUCCESSFUL.to_string())
                    }
                }
            }
            Ok(StepOutcome::Pending(Confirmation::Watch(spec))) => {
                self.record(BootEventKind::StepPending { ordinal,
                                                         step_id,
                                                         confirmation: "watch".into() });
                wait_reachable(spec).await
            }
            Ok(StepOutcome::Error { message, detail }) => {
                if let Some(detail) = detail {
                    debug!("step:error-detail ordinal={ordinal} detail={detail}");
                }
                Err(message)
            }
            Err(e) => Err(e.to_string()),
        };

        let terminal = self.registry.is_terminal(ordinal);
        let mut shared = self.lock();
        if shared.state.torn_down {
            debug!("step:discarded ordinal={ordinal} id={step_id} reason=torn-down");
            return None;
        }
        match result {
            Ok(()) => {
                shared.state.mark_success(ordinal, terminal);
                self.record_locked(&mut shared, BootEventKind::StepSucceeded { ordinal, step_id });
                info!("step:success ordinal={ordinal} id={step_id}");
                Some(StepStatus::Success)
            }
            Err(message) => {
                warn!("step:error ordinal={ordinal} id={step_id} message={message}");
                shared.state.mark_error(ordinal, message.clone());
                self.record_locked(&mut shared, BootEventKind::StepFailed { ordinal, step_id, message });
                Some(StepStatus::Error)
            }
        }
    }

    /// Un paso (o su comprobación) hizo panic: se trata como un `Err` del
    /// paso activo para no dejar `busy` tomado.
    fn recover_panic(&self, message: String) -> Option<StepStatus> {
        let mut shared = self.lock();
        shared.in_flight = None;
        if shared.state.torn_down {
            shared.state.busy = false;
            return None;
        }
        let ordinal = shared.state.active_ordinal;
        warn!("step:panic ordinal={ordinal} message={message}");
        shared.state.mark_error(ordinal, message.clone());
        if let Some(step_id) = self.registry.id_at(ordinal) {
            self.record_locked(&mut shared, BootEventKind::StepFailed { ordinal, step_id, message });
        }
        shared.state.busy = false;
        Some(StepStatus::Error)
    }

    fn release(&self) {
        let mut shared = self.lock();
        shared.state.busy = false;
        shared.in_flight = None;
    }

    /// Éxito del paso terminal: publica la conexión y desmonta. `false` si
    /// un teardown llegó antes; entonces no se publica nada.
    fn finish(&self) -> bool {
        {
            // Reservar el desmontaje bajo el lock: un teardown posterior ya
            // no tiene nada que hacer y el callback sale exactamente una vez.
            let mut shared = self.lock();
            if shared.state.torn_down {
                return false;
            }
            shared.state.torn_down = true;
            shared.in_flight = None;
        }
        // El callback del llamador corre sin el lock tomado.
        let connection = self.finalizer.finalize(&self.endpoint.host, self.endpoint.port);
        info!("bootstrap:connected endpoint={}", connection.endpoint_url);
        let mut shared = self.lock();
        let endpoint_url = connection.endpoint_url.clone();
        shared.state.connection = Some(connection);
        shared.state.busy = false;
        self.record_locked(&mut shared, BootEventKind::Connected { endpoint_url });
        self.record_locked(&mut shared, BootEventKind::TornDown);
        true
    }
}

/// Espera a que el watcher publique `true`, acotado por `spec.timeout`.
async fn wait_reachable(spec: WatchSpec) -> Result<(), String> {
    let WatchSpec { mut reachable, timeout } = spec;
    let wait = async move { reachable.wait_for(|r| *r).await.is_ok() };
    match tokio::time::timeout(timeout, wait).await {
        Ok(true) => Ok(()),
        Ok(false) => Err("health watcher stopped before the service became reachable".to_string()),
        Err(_) => Err(STEP_NOT_SUCCESSFUL.to_string()),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload.downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
    format!("step panicked: {detail}")
}

/// Handle de un paso lanzado con `dispatch`. Resuelve al estado final del
/// paso (o del último paso encadenado por auto-run).
#[derive(Debug)]
pub struct StepRun {
    task: JoinHandle<Option<StepStatus>>,
}

impl Future for StepRun {
    type Output = Result<StepStatus, OrchestratorError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Ready(Ok(Some(status))) => Poll::Ready(Ok(status)),
            Poll::Ready(Ok(None) | Err(_)) => Poll::Ready(Err(OrchestratorError::TornDown)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{check_fn, FnStep, PollSpec};
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test(start_paused = true)]
    async fn step_run_stays_pending_until_the_poll_converges() {
        let registry = StepRegistry::builder().step(FnStep::new(StepId::Plugins, || async {
                                                  let spec = PollSpec::new(check_fn(|| async { true }))
                                                      .with_interval(Duration::from_millis(2000));
                                                  Ok(StepOutcome::poll(spec))
                                              }))
                                              .build()
                                              .expect("registry");
        let orch = BootstrapOrchestrator::builder(registry).build();
        orch.begin();

        let mut run = task::spawn(orch.dispatch().expect("dispatch"));
        assert_pending!(run.poll());
        assert!(orch.is_busy());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(run.is_woken());
        let status = assert_ready!(run.poll());
        assert_eq!(status, Ok(StepStatus::Success));
        assert_eq!(orch.event_variants(), vec!["I", "S", "P", "A", "F", "C", "T"]);
    }
}
