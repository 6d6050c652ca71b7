//! Entorno aislado con nombre y sus dependencias.

use std::sync::Arc;

use async_trait::async_trait;
use boot_core::{StepDefinition, StepError, StepId, StepOutcome};
use log::{debug, info};

use super::PollSettings;
use crate::installer::{InstallerClient, StatusReport};

pub struct EnvironmentStep {
    installer: Arc<dyn InstallerClient>,
    poll: PollSettings,
}

impl EnvironmentStep {
    pub fn new(installer: Arc<dyn InstallerClient>, poll: PollSettings) -> Self {
        Self { installer, poll }
    }
}

#[async_trait]
impl StepDefinition for EnvironmentStep {
    fn id(&self) -> StepId {
        StepId::Environment
    }

    fn title(&self) -> &str {
        "Create environment"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        let report = self.installer.check_if_environment_exists().await?;
        if report.is_success() {
            return Ok(StepOutcome::Success);
        }
        debug!("environment:missing message={:?}", report.message);
        info!("environment:creating");
        self.installer.create_environment().await?;
        let installer = self.installer.clone();
        Ok(StepOutcome::poll(self.poll.spec(move || {
                                           let installer = installer.clone();
                                           async move {
                                               installer.check_if_environment_exists()
                                                        .await
                                                        .map(|r| r.is_success())
                                                        .unwrap_or(false)
                                           }
                                       })))
    }
}

pub struct DependenciesStep {
    installer: Arc<dyn InstallerClient>,
    poll: PollSettings,
}

impl DependenciesStep {
    pub fn new(installer: Arc<dyn InstallerClient>, poll: PollSettings) -> Self {
        Self { installer, poll }
    }
}

#[async_trait]
impl StepDefinition for DependenciesStep {
    fn id(&self) -> StepId {
        StepId::Dependencies
    }

    fn title(&self) -> &str {
        "Install dependencies"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        let report = self.installer.check_dependencies().await?;
        if dependencies_satisfied(&report) {
            return Ok(StepOutcome::Success);
        }
        info!("dependencies:installing pending={}", report.data.map(|d| d.to_string()).unwrap_or_default());
        self.installer.install_dependencies().await?;
        let installer = self.installer.clone();
        Ok(StepOutcome::poll(self.poll.spec(move || {
                                           let installer = installer.clone();
                                           async move {
                                               installer.check_dependencies()
                                                        .await
                                                        .map(|r| dependencies_satisfied(&r))
                                                        .unwrap_or(false)
                                           }
                                       })))
    }
}

/// Un `success` que aún lista paquetes en `data` no cuenta como resuelto.
fn dependencies_satisfied(report: &StatusReport) -> bool {
    report.is_success() && !report.has_pending_items()
}
