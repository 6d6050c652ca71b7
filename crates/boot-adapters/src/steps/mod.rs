//! Pasos concretos del arranque local.
//!
//! Todos siguen el mismo patrón: comprobar primero la condición (si ya se
//! cumple, `Success` sin sondeo), lanzar la acción correctiva y devolver
//! `Pending` con la forma de confirmarse.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use boot_core::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_ATTEMPTS};
use boot_core::{check_fn, HealthWatcher, PollSpec, RegistryError, StepRegistry};

use crate::http::{PluginClient, VersionSource};
use crate::installer::InstallerClient;

pub mod environment;
pub mod install;
pub mod plugins;
pub mod prerequisites;
pub mod server;
pub mod version;

pub use environment::{DependenciesStep, EnvironmentStep};
pub use install::{LocalInstallStep, RuntimeManagerStep};
pub use plugins::PluginsStep;
pub use prerequisites::SystemRequirementsStep;
pub use server::{ConnectStep, LocalServerStep};
pub use version::{LatestVersion, VersionStep};

/// Par intervalo/intentos compartido por todos los pasos que sondean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self { interval, max_attempts }
    }

    /// Cota de las esperas dirigidas por eventos.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }

    pub(crate) fn spec<F, Fut>(&self, check: F) -> PollSpec
        where F: Fn() -> Fut + Send + Sync + 'static,
              Fut: Future<Output = bool> + Send + 'static
    {
        PollSpec::new(check_fn(check)).with_interval(self.interval)
                                      .with_max_attempts(self.max_attempts)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_ATTEMPTS)
    }
}

/// Colaboradores que necesitan los pasos estándar.
#[derive(Clone)]
pub struct BootstrapContext {
    pub installer: Arc<dyn InstallerClient>,
    pub versions: Arc<dyn VersionSource>,
    pub plugins: Arc<dyn PluginClient>,
    pub health: Arc<dyn HealthWatcher>,
    pub poll: PollSettings,
    /// Plataforma enviada a los endpoints de plugins.
    pub platform: String,
    pub latest_version: LatestVersion,
}

/// Registro con los nueve pasos estándar en orden.
pub fn standard_registry(ctx: &BootstrapContext) -> Result<StepRegistry, RegistryError> {
    StepRegistry::builder().step(SystemRequirementsStep::new(ctx.installer.clone()))
                           .step(LocalInstallStep::new(ctx.installer.clone(), ctx.poll))
                           .step(VersionStep::new(ctx.installer.clone(),
                                                  ctx.versions.clone(),
                                                  ctx.latest_version.clone(),
                                                  ctx.poll))
                           .step(RuntimeManagerStep::new(ctx.installer.clone(), ctx.poll))
                           .step(EnvironmentStep::new(ctx.installer.clone(), ctx.poll))
                           .step(DependenciesStep::new(ctx.installer.clone(), ctx.poll))
                           .step(LocalServerStep::new(ctx.installer.clone(), ctx.health.clone(), ctx.poll.budget()))
                           .step(PluginsStep::new(ctx.plugins.clone(), ctx.platform.clone(), ctx.poll))
                           .step(ConnectStep::new(ctx.health.clone()))
                           .build()
}
