//! Presencia del backend local y del gestor de entornos aislados.

use std::sync::Arc;

use async_trait::async_trait;
use boot_core::{StepDefinition, StepError, StepId, StepOutcome};
use log::info;

use super::PollSettings;
use crate::installer::InstallerClient;

pub struct LocalInstallStep {
    installer: Arc<dyn InstallerClient>,
    poll: PollSettings,
}

impl LocalInstallStep {
    pub fn new(installer: Arc<dyn InstallerClient>, poll: PollSettings) -> Self {
        Self { installer, poll }
    }
}

#[async_trait]
impl StepDefinition for LocalInstallStep {
    fn id(&self) -> StepId {
        StepId::LocalInstall
    }

    fn title(&self) -> &str {
        "Install local server"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        if self.installer.check_if_installed_locally().await? {
            return Ok(StepOutcome::Success);
        }
        info!("local_install:installing");
        self.installer.install_locally().await?;
        let installer = self.installer.clone();
        Ok(StepOutcome::poll(self.poll.spec(move || {
                                           let installer = installer.clone();
                                           async move { installer.check_if_installed_locally().await.unwrap_or(false) }
                                       })))
    }
}

pub struct RuntimeManagerStep {
    installer: Arc<dyn InstallerClient>,
    poll: PollSettings,
}

impl RuntimeManagerStep {
    pub fn new(installer: Arc<dyn InstallerClient>, poll: PollSettings) -> Self {
        Self { installer, poll }
    }
}

#[async_trait]
impl StepDefinition for RuntimeManagerStep {
    fn id(&self) -> StepId {
        StepId::RuntimeManager
    }

    fn title(&self) -> &str {
        "Install environment manager"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        if self.installer.check_if_runtime_manager_exists().await? {
            return Ok(StepOutcome::Success);
        }
        info!("runtime_manager:installing");
        self.installer.install_runtime_manager().await?;
        let installer = self.installer.clone();
        Ok(StepOutcome::poll(self.poll.spec(move || {
                                           let installer = installer.clone();
                                           async move { installer.check_if_runtime_manager_exists().await.unwrap_or(false) }
                                       })))
    }
}
