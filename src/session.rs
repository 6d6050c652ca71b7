//! Sesión de arranque: une configuración, adapters y orquestador.
//!
//! Una ejecución del binario equivale a una pulsación del usuario sobre
//! "conectar": se recorren los pasos mientras tengan éxito. Si uno falla,
//! la sesión termina con su mensaje y volver a ejecutar reintenta el mismo
//! paso desde cero.

use std::sync::{Arc, Mutex};

use boot_adapters::{standard_registry, BootstrapContext, CommandInstallerClient, HttpHealthProbe, HttpPluginClient,
                    HttpVersionSource, LatestVersion, PollingHealthWatcher, UnconfiguredVersionSource, VersionSource};
use boot_core::{BootstrapOrchestrator, Connection, HealthWatcher, LocalEndpoint, StepId, StepStatus};
use log::{error, info};
use serde::Serialize;

use crate::config::BootConfig;
use crate::errors::AppError;

/// Fila del informe final, una por paso registrado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepLine {
    pub id: StepId,
    pub title: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub endpoint: Option<String>,
    pub latest_version: Option<String>,
    pub steps: Vec<StepLine>,
}

pub struct Session {
    orchestrator: BootstrapOrchestrator,
    latest_version: LatestVersion,
    published: Arc<Mutex<Option<Connection>>>,
    // Se mantiene vivo mientras dure la sesión; al soltarse deja de sondear.
    _health: Arc<dyn HealthWatcher>,
}

impl Session {
    /// Cablea los adapters reales. Requiere un runtime de tokio activo.
    pub fn from_config(cfg: &BootConfig) -> Result<Self, AppError> {
        if cfg.commands.is_empty() {
            return Err(AppError::Config("no installer commands configured (LOCALBOOT_CMD_*)".into()));
        }
        let endpoint = cfg.endpoint();
        let base_url = endpoint.url();
        let versions: Arc<dyn VersionSource> = match &cfg.version_url {
            Some(url) => Arc::new(HttpVersionSource::new(url.clone(), cfg.http_timeout)?),
            None => Arc::new(UnconfiguredVersionSource),
        };
        let probe = Arc::new(HttpHealthProbe::new(&base_url, cfg.http_timeout)?);
        let health: Arc<dyn HealthWatcher> = Arc::new(PollingHealthWatcher::spawn(probe, cfg.health_interval));
        let ctx = BootstrapContext { installer: Arc::new(CommandInstallerClient::new(cfg.commands.clone())),
                                     versions,
                                     plugins: Arc::new(HttpPluginClient::new(base_url, cfg.http_timeout)?),
                                     health,
                                     poll: cfg.poll_settings(),
                                     platform: cfg.plugin_platform.clone(),
                                     latest_version: LatestVersion::new() };
        Self::with_context(ctx, endpoint)
    }

    /// Construye la sesión sobre colaboradores ya creados.
    pub fn with_context(ctx: BootstrapContext, endpoint: LocalEndpoint) -> Result<Self, AppError> {
        let registry = standard_registry(&ctx)?;
        let published = Arc::new(Mutex::new(None));
        let sink = published.clone();
        let orchestrator = BootstrapOrchestrator::builder(registry).endpoint(endpoint)
                                                                   .on_connected(move |c| {
                                                                       if let Ok(mut slot) = sink.lock() {
                                                                           *slot = Some(c.clone());
                                                                       }
                                                                   })
                                                                   .build();
        Ok(Self { orchestrator,
                  latest_version: ctx.latest_version,
                  published,
                  _health: ctx.health })
    }

    /// Ejecuta pasos hasta conectar o hasta que uno falle.
    pub async fn run(&self) -> Result<Connection, AppError> {
        self.orchestrator.begin();
        info!("session:start id={}", self.orchestrator.session_id());
        let status = self.orchestrator.run_until_blocked().await?;
        if let Some(connection) = self.published() {
            return Ok(connection);
        }
        let ordinal = self.orchestrator.current_ordinal();
        let step = self.orchestrator
                       .registry()
                       .id_at(ordinal)
                       .map(|id| id.to_string())
                       .unwrap_or_else(|| format!("#{ordinal}"));
        let message = self.orchestrator
                          .error_of(ordinal)
                          .unwrap_or_else(|| format!("stopped with status {status:?}"));
        error!("session:blocked step={step} message={message}");
        Err(AppError::StepFailed { step, message })
    }

    /// Conexión entregada por el callback `on_connected`, si la hubo.
    pub fn published(&self) -> Option<Connection> {
        self.published.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn orchestrator(&self) -> &BootstrapOrchestrator {
        &self.orchestrator
    }

    pub fn report(&self) -> SessionReport {
        let registry = self.orchestrator.registry();
        let steps = (0..registry.len()).filter_map(|k| {
                                           registry.get(k).map(|step| StepLine { id: step.id(),
                                                                                 title: step.title().to_string(),
                                                                                 status: self.orchestrator.status_of(k),
                                                                                 error: self.orchestrator.error_of(k) })
                                       })
                                       .collect();
        SessionReport { session_id: self.orchestrator.session_id().to_string(),
                        endpoint: self.orchestrator.connection().map(|c| c.endpoint_url),
                        latest_version: self.latest_version.get(),
                        steps }
    }
}
