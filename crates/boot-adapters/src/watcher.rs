//! Watcher de salud que sondea el servicio local en segundo plano.
//!
//! Corre de forma independiente al orquestador y publica cada cambio de
//! alcanzabilidad en un canal `watch`. Se detiene al soltarse.

use std::sync::Arc;
use std::time::Duration;

use boot_core::{ChannelHealthWatcher, HealthWatcher};
use log::info;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use crate::http::HealthProbe;

pub struct PollingHealthWatcher {
    channel: Arc<ChannelHealthWatcher>,
    task: AbortHandle,
}

impl PollingHealthWatcher {
    /// Arranca el sondeo: primera sonda inmediata y luego cada `interval`.
    /// Requiere un runtime de tokio activo.
    pub fn spawn(probe: Arc<dyn HealthProbe>, interval: Duration) -> Self {
        let channel = Arc::new(ChannelHealthWatcher::new(false));
        let publisher = channel.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let reachable = probe.probe().await;
                if reachable != publisher.is_reachable() {
                    info!("health:changed reachable={reachable}");
                }
                publisher.set_reachable(reachable);
            }
        });
        Self { channel,
               task: task.abort_handle() }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl HealthWatcher for PollingHealthWatcher {
    fn subscribe(&self) -> watch::Receiver<bool> {
        self.channel.subscribe()
    }

    fn is_reachable(&self) -> bool {
        self.channel.is_reachable()
    }
}

impl Drop for PollingHealthWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for PollingHealthWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingHealthWatcher")
         .field("reachable", &self.channel.is_reachable())
         .finish()
    }
}
