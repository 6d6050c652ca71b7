//! Sondeo acotado de intervalo fijo.
//!
//! Primitiva genérica usada por los pasos cuya finalización no se puede
//! observar de forma síncrona. Política:
//! - Primera comprobación tras `interval` (no se comprueba al arrancar).
//! - Ticks a intervalo constante; sin backoff.
//! - Las comprobaciones son estrictamente secuenciales: un tick que llega
//!   mientras la comprobación anterior sigue en curso se descarta.
//! - En cuanto una comprobación devuelve `true` el timer se suelta y no hay
//!   más invocaciones; lo mismo tras `max_attempts` respuestas `false`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::step::{PollSpec, ReadinessCheck};

/// Resultado terminal de un sondeo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

pub struct BoundedRetryPoller {
    check: Box<dyn ReadinessCheck>,
    interval: Duration,
    max_attempts: u32,
}

impl BoundedRetryPoller {
    pub fn new(check: Box<dyn ReadinessCheck>, interval: Duration, max_attempts: u32) -> Self {
        Self { check,
               interval,
               max_attempts }
    }

    /// Separa un `PollSpec` en el poller y el hook de agotamiento del paso.
    pub fn from_spec(spec: PollSpec) -> (Self, Option<Box<dyn FnOnce() + Send>>) {
        (Self::new(spec.check, spec.interval, spec.max_attempts), spec.on_exhausted)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Ejecuta el sondeo hasta un resultado terminal. `on_attempt` recibe el
    /// número de intento (desde 1) y el resultado de la comprobación.
    ///
    /// Soltar el future antes de terminar cancela el timer.
    pub async fn run<F>(&self, mut on_attempt: F) -> PollOutcome
        where F: FnMut(u32, bool)
    {
        if self.max_attempts == 0 {
            return PollOutcome::Exhausted { attempts: 0 };
        }
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut attempts = 0;
        while attempts < self.max_attempts {
            ticker.tick().await;
            attempts += 1;
            let ok = self.check.check().await;
            debug!("poll attempt={attempts}/{} ok={ok}", self.max_attempts);
            on_attempt(attempts, ok);
            if ok {
                return PollOutcome::Succeeded { attempts };
            }
        }
        PollOutcome::Exhausted { attempts }
    }

    /// Lanza el sondeo en segundo plano. Exactamente uno de los callbacks se
    /// invoca, una sola vez, salvo que antes se cancele el handle.
    pub fn start<S, X>(self, on_success: S, on_exhausted: X) -> CancelHandle
        where S: FnOnce() + Send + 'static,
              X: FnOnce() + Send + 'static
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let task = tokio::spawn(async move {
            let outcome = self.run(|_, _| {}).await;
            if flag.load(Ordering::SeqCst) {
                return;
            }
            match outcome {
                PollOutcome::Succeeded { .. } => on_success(),
                PollOutcome::Exhausted { .. } => on_exhausted(),
            }
        });
        CancelHandle { abort: Some(task.abort_handle()),
                       cancelled }
    }
}

impl std::fmt::Debug for BoundedRetryPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedRetryPoller")
         .field("interval", &self.interval)
         .field("max_attempts", &self.max_attempts)
         .finish()
    }
}

/// Handle de cancelación de una tarea en segundo plano (sondeo o paso).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    abort: Option<AbortHandle>,
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub(crate) fn from_abort(abort: AbortHandle) -> Self {
        Self { abort: Some(abort),
               cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Suelta el timer sin condiciones y suprime cualquier callback posterior.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.abort.as_ref().map(|a| a.is_finished()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::check_fn;
    use std::sync::atomic::AtomicU32;

    fn counting_check(succeed_on: Option<u32>) -> (Box<dyn ReadinessCheck>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let check = check_fn(move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            let ok = succeed_on.map(|j| n >= j).unwrap_or(false);
            async move { ok }
        });
        (Box::new(check), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn first_check_waits_one_interval() {
        let (check, calls) = counting_check(Some(1));
        let poller = BoundedRetryPoller::new(check, Duration::from_millis(500), 3);
        let started = Instant::now();
        let outcome = poller.run(|_, _| {}).await;
        assert_eq!(outcome, PollOutcome::Succeeded { attempts: 1 });
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500) && elapsed < Duration::from_millis(505));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_exhausts_without_checking() {
        let (check, calls) = counting_check(Some(1));
        let poller = BoundedRetryPoller::new(check, Duration::from_millis(500), 0);
        assert_eq!(poller.run(|_, _| {}).await, PollOutcome::Exhausted { attempts: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_check_never_overlaps() {
        let in_flight = Arc::new(AtomicBool::new(false));
        let overlapped = Arc::new(AtomicBool::new(false));
        let (f, o) = (in_flight.clone(), overlapped.clone());
        let check = check_fn(move || {
            let (f, o) = (f.clone(), o.clone());
            async move {
                if f.swap(true, Ordering::SeqCst) {
                    o.store(true, Ordering::SeqCst);
                }
                // más lento que el intervalo
                tokio::time::sleep(Duration::from_millis(250)).await;
                f.store(false, Ordering::SeqCst);
                false
            }
        });
        let poller = BoundedRetryPoller::new(Box::new(check), Duration::from_millis(100), 4);
        assert_eq!(poller.run(|_, _| {}).await, PollOutcome::Exhausted { attempts: 4 });
        assert!(!overlapped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn start_fires_exactly_one_callback() {
        let (check, _) = counting_check(Some(2));
        let poller = BoundedRetryPoller::new(check, Duration::from_millis(100), 5);
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = poller.start(move || {
                                      let _ = tx.send("success");
                                  },
                                  || panic!("must not exhaust"));
        assert_eq!(rx.await.expect("callback"), "success");
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_callbacks() {
        let (check, calls) = counting_check(None);
        let poller = BoundedRetryPoller::new(check, Duration::from_millis(100), 5);
        let fired = Arc::new(AtomicBool::new(false));
        let (a, b) = (fired.clone(), fired.clone());
        let handle = poller.start(move || a.store(true, Ordering::SeqCst),
                                  move || b.store(true, Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.is_cancelled());
        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
