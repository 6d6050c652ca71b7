//! Servicio local: arranque confirmado por el watcher de salud y conexión
//! final.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use boot_core::{HealthWatcher, StepDefinition, StepError, StepId, StepOutcome, WatchSpec};
use log::info;

use crate::installer::InstallerClient;

const DEFAULT_START_FAILURE: &str = "failed to start the local server";
const NOT_REACHABLE: &str = "local server is not reachable";

/// Arranca el servicio y espera a que el watcher lo vea vivo. Nunca sondea
/// por su cuenta: la única fuente de verdad es el [`HealthWatcher`].
pub struct LocalServerStep {
    installer: Arc<dyn InstallerClient>,
    health: Arc<dyn HealthWatcher>,
    timeout: Duration,
}

impl LocalServerStep {
    pub fn new(installer: Arc<dyn InstallerClient>, health: Arc<dyn HealthWatcher>, timeout: Duration) -> Self {
        Self { installer,
               health,
               timeout }
    }
}

#[async_trait]
impl StepDefinition for LocalServerStep {
    fn id(&self) -> StepId {
        StepId::LocalServer
    }

    fn title(&self) -> &str {
        "Start local server"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        if self.health.is_reachable() {
            return Ok(StepOutcome::Success);
        }
        // Suscribirse antes de arrancar para no perder la transición.
        let reachable = self.health.subscribe();
        info!("local_server:starting");
        let report = self.installer.start_local_server().await?;
        if !report.is_success() {
            let message = report.message.unwrap_or_else(|| DEFAULT_START_FAILURE.to_string());
            return Err(StepError::InstallAction(message));
        }
        Ok(StepOutcome::watch(WatchSpec::new(reachable, self.timeout)))
    }
}

/// Paso terminal: sólo comprueba que el servicio sigue vivo. El orquestador
/// se encarga de finalizar la conexión al verlo en `Success`.
pub struct ConnectStep {
    health: Arc<dyn HealthWatcher>,
}

impl ConnectStep {
    pub fn new(health: Arc<dyn HealthWatcher>) -> Self {
        Self { health }
    }
}

#[async_trait]
impl StepDefinition for ConnectStep {
    fn id(&self) -> StepId {
        StepId::Connect
    }

    fn title(&self) -> &str {
        "Connect"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        if self.health.is_reachable() {
            Ok(StepOutcome::Success)
        } else {
            Ok(StepOutcome::error(NOT_REACHABLE))
        }
    }
}
